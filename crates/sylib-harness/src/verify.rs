//! Verification results and their aggregation.

use serde::{Deserialize, Serialize};

/// Outcome of one fixture case under one float text policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Case name, suffixed with `[policy]` for cases run under both policies.
    pub case_name: String,
    /// Runtime operation exercised.
    pub function: String,
    /// Float text policy the runtime ran with.
    pub policy: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    /// Rendered diff when the case failed.
    pub diff: Option<String>,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total,
            passed,
            failed: total - passed,
            results,
        }
    }

    /// Fold another batch of results into this summary.
    pub fn extend(&mut self, results: Vec<VerificationResult>) {
        let batch = Self::from_results(results);
        self.total += batch.total;
        self.passed += batch.passed;
        self.failed += batch.failed;
        self.results.extend(batch.results);
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, passed: bool) -> VerificationResult {
        VerificationResult {
            case_name: name.to_string(),
            function: String::from("putint"),
            policy: String::from("hex"),
            passed,
            expected: String::from("1"),
            actual: String::from(if passed { "1" } else { "2" }),
            diff: None,
        }
    }

    #[test]
    fn summary_counts_and_extends() {
        let mut summary = VerificationSummary::from_results(vec![result("a", true)]);
        assert!(summary.all_passed());
        summary.extend(vec![result("b", false), result("c", true)]);
        assert_eq!((summary.total, summary.passed, summary.failed), (3, 2, 1));
        assert!(!summary.all_passed());
        let failed: Vec<_> = summary.failures().map(|r| r.case_name.as_str()).collect();
        assert_eq!(failed, ["b"]);
    }
}
