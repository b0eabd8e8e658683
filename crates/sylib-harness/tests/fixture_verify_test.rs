//! Integration test: every checked-in fixture passes under each policy it
//! applies to, and the verify log validates against the log schema.
//!
//! Run: cargo test -p sylib-harness --test fixture_verify_test

use std::path::{Path, PathBuf};

use sylib_core::FloatTextPolicy;
use sylib_harness::fixtures::{FixtureSet, fixture_paths};
use sylib_harness::report::ConformanceReport;
use sylib_harness::runner::TestRunner;
use sylib_harness::structured_log::{
    LogEmitter, LogLevel, Outcome, StreamKind, validate_log_line,
};
use sylib_harness::verify::VerificationSummary;

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn fixture_dir() -> PathBuf {
    repo_root().join("tests/fixtures")
}

fn run_all(policy: FloatTextPolicy) -> VerificationSummary {
    let mut summary = VerificationSummary::default();
    for path in fixture_paths(&fixture_dir()).unwrap() {
        let set = FixtureSet::from_file(&path)
            .unwrap_or_else(|e| panic!("failed to load {}: {e}", path.display()));
        summary.extend(TestRunner::new("fixture_verify", policy).run(&set));
    }
    summary
}

#[test]
fn fixture_directory_is_populated() {
    let paths = fixture_paths(&fixture_dir()).unwrap();
    assert!(paths.len() >= 4, "expected fixture files, got {paths:?}");
    for path in &paths {
        let set = FixtureSet::from_file(path).unwrap();
        assert_eq!(set.version, "v1", "{}", path.display());
        assert!(!set.cases.is_empty(), "{} has no cases", path.display());
    }
}

#[test]
fn all_fixtures_pass_under_hex_policy() {
    let summary = run_all(FloatTextPolicy::HexMinimal);
    let failures: Vec<String> = summary
        .failures()
        .map(|r| format!("{}: {}", r.case_name, r.diff.as_deref().unwrap_or("")))
        .collect();
    assert!(failures.is_empty(), "failures:\n{}", failures.join("\n"));
    assert!(summary.total > 20);
}

#[test]
fn all_fixtures_pass_under_decimal_policy() {
    let summary = run_all(FloatTextPolicy::Decimal);
    let failures: Vec<String> = summary
        .failures()
        .map(|r| format!("{}: {}", r.case_name, r.diff.as_deref().unwrap_or("")))
        .collect();
    assert!(failures.is_empty(), "failures:\n{}", failures.join("\n"));
}

#[test]
fn report_and_log_cover_every_case() {
    let summary = run_all(FloatTextPolicy::HexMinimal);
    let mut emitter = LogEmitter::new(Vec::new(), "fixture_verify", "run-test");
    for r in &summary.results {
        let entry = emitter
            .entry(LogLevel::Info, "case_result")
            .with_stream(StreamKind::Conformance)
            .with_policy("hex")
            .with_case(&r.case_name, &r.function)
            .with_outcome(if r.passed { Outcome::Pass } else { Outcome::Fail });
        emitter.emit_entry(&entry).unwrap();
    }
    let log = String::from_utf8(emitter.into_inner()).unwrap();
    let mut lines = 0;
    for (i, line) in log.lines().enumerate() {
        validate_log_line(line, i + 1).unwrap_or_else(|errs| panic!("{errs:?}"));
        lines += 1;
    }
    assert_eq!(lines, summary.total);

    let report = ConformanceReport {
        title: String::from("fixture verify"),
        policy: String::from("hex"),
        timestamp: String::from("fixed"),
        summary,
    };
    let md = report.to_markdown();
    assert!(md.contains("| putf_integers [hex] | putf | hex | PASS |"));
    assert!(md.contains("| putfloat_hex_minimal | putfloat | hex | PASS |"));
    assert!(!md.contains("putfloat_decimal"));
}
