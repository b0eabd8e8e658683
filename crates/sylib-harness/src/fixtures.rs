//! Fixture loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Runtime operation under test (`putfloat`, `getarray`, ...).
    pub function: String,
    /// Operation inputs.
    pub inputs: serde_json::Value,
    /// Expected rendering of the result.
    pub expected_output: String,
    /// Float text policy the case applies to: `hex`, `decimal`, or `both`.
    #[serde(default = "default_policy")]
    pub policy: String,
}

fn default_policy() -> String {
    String::from("both")
}

/// A collection of fixture cases for one operation family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Family name.
    pub family: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(HarnessError::io(path))?;
        Self::from_json(&content).map_err(|source| HarnessError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fixture files at `path`: the file itself, or every `*.json` directly in
/// the directory, sorted.
pub fn fixture_paths(path: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(path)
        .map_err(HarnessError::io(path))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults_to_both() {
        let set = FixtureSet::from_json(
            r#"{"version":"v1","family":"output/int","cases":[
                {"name":"one","function":"putint","inputs":{"values":[1]},"expected_output":"1"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(set.cases[0].policy, "both");
        let again = FixtureSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(again.cases[0].name, "one");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FixtureSet::from_file(Path::new("/nonexistent/fixture.json")).unwrap_err();
        assert!(err.to_string().starts_with("/nonexistent/fixture.json"));
    }
}
