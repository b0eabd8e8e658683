//! Program judge: runs prebuilt test programs against `.in`/`.out` cases.
//!
//! A case `dir/name` is any group of files `<cases>/dir/name.*`. The program
//! `<bin-dir>/dir/name` reads `name.in` (if present) on stdin; its
//! right-trimmed stdout lines plus its exit code must equal the right-trimmed
//! lines of `name.out`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::structured_log::{ArtifactEntry, ArtifactIndex, Outcome, sha256_hex};

/// Default per-program wall-clock limit.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Minimum wait for a finished program's stdout to reach end of file.
const OUTPUT_GRACE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Root of the case tree.
    pub cases: PathBuf,
    /// Root of the prebuilt program tree, mirroring `cases`.
    pub bin_dir: PathBuf,
    /// Wrong-answer dumps go to `<wa_dir>/wa_out/`.
    pub wa_dir: PathBuf,
    pub timeout: Duration,
    /// Worker thread count.
    pub jobs: usize,
}

impl JudgeConfig {
    #[must_use]
    pub fn new(cases: impl Into<PathBuf>, bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            cases: cases.into(),
            bin_dir: bin_dir.into(),
            wa_dir: PathBuf::from("wa"),
            timeout: DEFAULT_TIMEOUT,
            jobs: thread::available_parallelism().map_or(1, usize::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    RuntimeError,
}

impl Verdict {
    #[must_use]
    pub fn outcome(self) -> Outcome {
        match self {
            Self::Accepted => Outcome::Pass,
            Self::WrongAnswer => Outcome::Fail,
            Self::TimeLimitExceeded => Outcome::Timeout,
            Self::RuntimeError => Outcome::Error,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accepted => "Accepted",
            Self::WrongAnswer => "Wrong Answer",
            Self::TimeLimitExceeded => "Time Limit Exceeded",
            Self::RuntimeError => "Runtime Error",
        })
    }
}

/// Result of judging one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    /// 1-based position in the sorted case list.
    pub idx: usize,
    pub name: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    /// Why the case did not run to a comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Wrong-answer dump, when one was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactEntry>,
}

impl CaseReport {
    /// `(idx/total) name: verdict`
    #[must_use]
    pub fn status_line(&self, total: usize) -> String {
        let mut line = format!("({}/{}) {}: {}", self.idx, total, self.name, self.verdict);
        if let Some(detail) = &self.detail {
            line.push_str(&format!(" ({detail})"));
        }
        line
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Per-case reports in case order.
    pub cases: Vec<CaseReport>,
    pub artifacts: ArtifactIndex,
}

impl JudgeSummary {
    fn from_reports(mut cases: Vec<CaseReport>, run_id: &str) -> Self {
        cases.sort_by_key(|c| c.idx);
        let total = cases.len();
        let passed = cases
            .iter()
            .filter(|c| c.verdict == Verdict::Accepted)
            .count();
        let mut artifacts = ArtifactIndex::new(run_id);
        artifacts
            .artifacts
            .extend(cases.iter().filter_map(|c| c.artifact.clone()));
        Self {
            total,
            passed,
            failed: total - passed,
            cases,
            artifacts,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// `Accepted: (p/t) Failed: (f/t)`
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Accepted: ({}/{}) Failed: ({}/{})",
            self.passed, self.total, self.failed, self.total
        )
    }
}

/// Case names under `root`: each file's path relative to `root`, cut at the
/// first `.` of its file name, `/`-separated, de-duplicated and sorted.
pub fn discover_cases(root: &Path) -> Result<Vec<String>, HarnessError> {
    let mut names = BTreeSet::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir).map_err(HarnessError::io(&dir))? {
            let path = entry.map_err(HarnessError::io(&dir))?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let stem = file_name.split('.').next().unwrap_or(file_name);
            let relative = path
                .parent()
                .and_then(|parent| parent.strip_prefix(root).ok())
                .unwrap_or(Path::new(""));
            let mut parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            parts.push(stem.to_string());
            names.insert(parts.join("/"));
        }
    }
    Ok(names.into_iter().collect())
}

/// Lines a program produced: whole output right-trimmed, each line
/// right-trimmed, exit code appended.
#[must_use]
pub fn answer_lines(stdout: &str, exit_code: i32) -> Vec<String> {
    let mut lines = expected_lines(stdout);
    lines.push(exit_code.to_string());
    lines
}

/// Right-trimmed lines of an expected-output file.
#[must_use]
pub fn expected_lines(text: &str) -> Vec<String> {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.lines().map(|l| l.trim_end().to_string()).collect()
}

/// How a program run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Exited { stdout: Vec<u8>, exit_code: i32 },
    TimedOut,
}

/// Run `program` with `stdin_path` (or nothing) on stdin, capturing stdout,
/// killing it after `timeout`.
pub fn run_program(
    program: &Path,
    stdin_path: Option<&Path>,
    timeout: Duration,
) -> Result<RunOutcome, HarnessError> {
    let stdin = match stdin_path {
        Some(path) => Stdio::from(File::open(path).map_err(HarnessError::io(path))?),
        None => Stdio::null(),
    };
    let mut child = Command::new(program)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| HarnessError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    // Never join the reader: a descendant may keep stdout open.
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = child.stdout.take() {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
    }

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait().map_err(HarnessError::io(program))? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(RunOutcome::TimedOut);
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    let remaining = deadline.saturating_duration_since(Instant::now());
    let stdout = match rx.recv_timeout(remaining.max(OUTPUT_GRACE)) {
        Ok(stdout) => stdout,
        Err(mpsc::RecvTimeoutError::Disconnected) => Vec::new(),
        // Exited, but a descendant still holds stdout open.
        Err(mpsc::RecvTimeoutError::Timeout) => return Ok(RunOutcome::TimedOut),
    };
    Ok(RunOutcome::Exited {
        stdout,
        exit_code: exit_code(status),
    })
}

/// Exit code, or the negated signal number for a signalled process.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

fn program_path(config: &JudgeConfig, name: &str) -> PathBuf {
    let plain = config.bin_dir.join(name);
    if plain.is_file() {
        return plain;
    }
    let exe = config.bin_dir.join(format!("{name}.exe"));
    if exe.is_file() { exe } else { plain }
}

/// Judge one case.
pub fn judge_case(config: &JudgeConfig, idx: usize, name: &str) -> CaseReport {
    let started = Instant::now();
    let mut report = CaseReport {
        idx,
        name: name.to_string(),
        verdict: Verdict::RuntimeError,
        exit_code: None,
        duration_ms: 0,
        detail: None,
        artifact: None,
    };

    let input = config.cases.join(format!("{name}.in"));
    let expected = config.cases.join(format!("{name}.out"));
    let program = program_path(config, name);

    let outcome = run_program(&program, input.is_file().then_some(input.as_path()), config.timeout);
    report.duration_ms = started.elapsed().as_millis() as u64;
    let (stdout, code) = match outcome {
        Ok(RunOutcome::Exited { stdout, exit_code }) => (stdout, exit_code),
        Ok(RunOutcome::TimedOut) => {
            report.verdict = Verdict::TimeLimitExceeded;
            return report;
        }
        Err(err) => {
            report.detail = Some(err.to_string());
            return report;
        }
    };
    report.exit_code = Some(code);

    let expected_text = match std::fs::read_to_string(&expected) {
        Ok(text) => text,
        Err(err) => {
            report.detail = Some(format!("{}: {err}", expected.display()));
            return report;
        }
    };

    let answer = answer_lines(&String::from_utf8_lossy(&stdout), code);
    if answer == expected_lines(&expected_text) {
        report.verdict = Verdict::Accepted;
        return report;
    }

    report.verdict = Verdict::WrongAnswer;
    match write_wrong_answer(config, idx, name, &answer) {
        Ok(entry) => report.artifact = Some(entry),
        Err(err) => report.detail = Some(err.to_string()),
    }
    report
}

fn write_wrong_answer(
    config: &JudgeConfig,
    idx: usize,
    name: &str,
    answer: &[String],
) -> Result<ArtifactEntry, HarnessError> {
    let dir = config.wa_dir.join("wa_out");
    std::fs::create_dir_all(&dir).map_err(HarnessError::io(&dir))?;
    let path = dir.join(format!("{idx}_WA_{}.out", name.replace('/', "_")));
    let mut body = answer.join("\n");
    body.push('\n');
    std::fs::write(&path, &body).map_err(HarnessError::io(&path))?;
    Ok(ArtifactEntry {
        path: path.display().to_string(),
        kind: String::from("wrong_answer"),
        sha256: sha256_hex(body.as_bytes()),
        size_bytes: Some(body.len() as u64),
    })
}

/// Judge every case under `config.cases` on `config.jobs` threads.
///
/// `on_case` sees each report as it completes, with the total case count.
pub fn run_judge(
    config: &JudgeConfig,
    run_id: &str,
    on_case: impl FnMut(&CaseReport, usize),
) -> Result<JudgeSummary, HarnessError> {
    let names = discover_cases(&config.cases)?;
    let reports = judge_all(config, &names, on_case);
    Ok(JudgeSummary::from_reports(reports, run_id))
}

fn judge_all(
    config: &JudgeConfig,
    names: &[String],
    mut on_case: impl FnMut(&CaseReport, usize),
) -> Vec<CaseReport> {
    let total = names.len();
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..config.jobs.clamp(1, total.max(1)) {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                loop {
                    let i = next.fetch_add(1, Ordering::Relaxed);
                    let Some(name) = names.get(i) else { break };
                    if tx.send(judge_case(config, i + 1, name)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        rx.iter()
            .inspect(|report| on_case(report, total))
            .collect()
    })
}
