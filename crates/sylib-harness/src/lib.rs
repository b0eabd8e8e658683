//! Conformance tooling for the sylib runtime.
//!
//! This crate provides:
//! - Fixture verify: run JSON fixture cases through `sylib-core` and compare
//!   the produced console text
//! - Judge: run prebuilt test programs against `.in`/`.out` case files and
//!   report per-case verdicts
//! - Report generation: markdown + JSON conformance reports
//! - Structured JSONL logging with a SHA-256 artifact index

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod fixtures;
pub mod judge;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet};
pub use judge::{JudgeConfig, JudgeSummary, Verdict};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::VerificationResult;
