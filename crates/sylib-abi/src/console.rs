//! Process-wide console state.
//!
//! One [`Runtime`] over fd 0 / fd 1, created on first use. Its scanner holds
//! lookahead bytes already read from fd 0, so every export must go through the
//! same instance.

use parking_lot::Mutex;
use sylib_core::Runtime;
#[cfg(debug_assertions)]
use {libc::c_int, sylib_core::FloatTextPolicy};

use crate::fd::{FdReader, FdWriter};

pub type Console = Runtime<FdReader, FdWriter>;

static CONSOLE: Mutex<Option<Console>> = Mutex::new(None);

/// Run `f` against the process console, creating it on first use.
pub fn with_console<T>(f: impl FnOnce(&mut Console) -> T) -> T {
    let mut guard = CONSOLE.lock();
    let console = guard.get_or_insert_with(|| Runtime::new(FdReader::stdin(), FdWriter::stdout()));
    f(console)
}

/// Point the console at other descriptors with an explicit policy, dropping
/// any buffered lookahead.
#[cfg(debug_assertions)]
pub fn bind_console_for_tests(input: c_int, output: c_int, policy: FloatTextPolicy) {
    *CONSOLE.lock() = Some(Runtime::with_policy(
        FdReader::new(input),
        FdWriter::new(output),
        policy,
    ));
}

