//! CLI entrypoint for the sylib conformance harness.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sylib_core::FloatTextPolicy;
use sylib_harness::fixtures::{FixtureSet, fixture_paths};
use sylib_harness::judge::{self, JudgeConfig};
use sylib_harness::report::ConformanceReport;
use sylib_harness::runner::TestRunner;
use sylib_harness::structured_log::{
    LogEmitter, LogLevel, Outcome, StreamKind, now_utc, validate_log_file,
};
use sylib_harness::verify::VerificationSummary;

/// Conformance tooling for the sylib console runtime.
#[derive(Debug, Parser)]
#[command(name = "sylib-harness")]
#[command(about = "Fixture verification and program judge for sylib")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run JSON fixture cases through the runtime.
    Verify {
        /// Fixture file, or directory of fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown); a `.json` twin is written beside it.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Float text policy to verify (`hex` or `decimal`); both when omitted.
        #[arg(long, value_parser = ["hex", "decimal"])]
        policy: Option<String>,
        /// Optional fixed timestamp string for deterministic reports.
        #[arg(long)]
        timestamp: Option<String>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Run prebuilt test programs against `.in`/`.out` cases.
    Judge {
        /// Case directory.
        #[arg(long)]
        cases: PathBuf,
        /// Directory of prebuilt programs, laid out like `--cases`.
        #[arg(long)]
        bin_dir: PathBuf,
        /// Wrong-answer dump directory.
        #[arg(long, default_value = "wa")]
        wa_dir: PathBuf,
        /// Per-program wall-clock limit in seconds.
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
        /// Worker threads (default: available parallelism).
        #[arg(long)]
        jobs: Option<usize>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Validate a structured JSONL log.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let run_id = format!("run-{}", std::process::id());

    match cli.command {
        Command::Verify {
            fixture,
            report,
            policy,
            timestamp,
            log,
        } => {
            let policies = match policy.as_deref() {
                None => vec![FloatTextPolicy::HexMinimal, FloatTextPolicy::Decimal],
                Some(text) => vec![FloatTextPolicy::from_str_loose(text)],
            };
            let mut emitter = log
                .as_deref()
                .map(|path| LogEmitter::to_file(path, "verify", &run_id))
                .transpose()?;

            let mut summary = VerificationSummary::default();
            for path in fixture_paths(&fixture)? {
                let set = FixtureSet::from_file(&path)?;
                for &p in &policies {
                    let results = TestRunner::new("verify", p).run(&set);
                    if let Some(emitter) = emitter.as_mut() {
                        for r in &results {
                            let outcome = if r.passed { Outcome::Pass } else { Outcome::Fail };
                            let level = if r.passed { LogLevel::Info } else { LogLevel::Warn };
                            let entry = emitter
                                .entry(level, "case_result")
                                .with_stream(StreamKind::Conformance)
                                .with_policy(p.as_str())
                                .with_case(&r.case_name, &r.function)
                                .with_outcome(outcome);
                            emitter.emit_entry(&entry)?;
                        }
                    }
                    summary.extend(results);
                }
            }
            if let Some(emitter) = emitter.as_mut() {
                emitter.flush()?;
            }

            let policy_label = policies
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join("+");
            let conformance = ConformanceReport {
                title: String::from("sylib conformance report"),
                policy: policy_label,
                timestamp: timestamp.unwrap_or_else(now_utc),
                summary,
            };
            if let Some(path) = report {
                std::fs::write(&path, conformance.to_markdown())?;
                std::fs::write(path.with_extension("json"), conformance.to_json())?;
            }
            for r in conformance.summary.failures() {
                eprintln!("FAIL: {} ({})", r.case_name, r.function);
                if let Some(diff) = &r.diff {
                    eprint!("{diff}");
                }
            }
            println!(
                "verify: {}/{} passed",
                conformance.summary.passed, conformance.summary.total
            );
            if !conformance.summary.all_passed() {
                std::process::exit(1);
            }
        }
        Command::Judge {
            cases,
            bin_dir,
            wa_dir,
            timeout_secs,
            jobs,
            log,
        } => {
            let mut config = JudgeConfig::new(cases, bin_dir);
            config.wa_dir = wa_dir;
            config.timeout = Duration::from_secs(timeout_secs);
            if let Some(jobs) = jobs {
                config.jobs = jobs.max(1);
            }
            println!("Running on {} threads", config.jobs);

            let summary = judge::run_judge(&config, &run_id, |report, total| {
                println!("{}", report.status_line(total));
            })?;
            println!("\n{}", summary.summary_line());

            if let Some(path) = log {
                let mut emitter = LogEmitter::to_file(&path, "judge", &run_id)?;
                for case in &summary.cases {
                    let level = if case.verdict == judge::Verdict::Accepted {
                        LogLevel::Info
                    } else {
                        LogLevel::Warn
                    };
                    let mut entry = emitter
                        .entry(level, "case_result")
                        .with_stream(StreamKind::Judge)
                        .with_case(&case.name, &case.name)
                        .with_outcome(case.verdict.outcome())
                        .with_duration_ms(case.duration_ms)
                        .with_details(serde_json::json!({ "verdict": case.verdict.to_string() }));
                    if let Some(code) = case.exit_code {
                        entry = entry.with_exit_code(code);
                    }
                    if let Some(artifact) = &case.artifact {
                        entry = entry.with_artifacts(vec![artifact.path.clone()]);
                    }
                    emitter.emit_entry(&entry)?;
                }
                emitter.flush()?;
                std::fs::write(path.with_extension("artifacts.json"), summary.artifacts.to_json()?)?;
            }
            if !summary.all_passed() {
                std::process::exit(1);
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            println!("validate-log: {lines} lines, {} errors", errors.len());
            if !errors.is_empty() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
