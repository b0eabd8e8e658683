//! Timing hooks.
//!
//! Generated programs bracket measured regions with `starttime`/`stoptime`,
//! optionally tagged with a source line. The runtime accepts the calls and
//! neither measures nor prints anything.

/// Mark the start of a timed region.
#[inline]
pub fn start_timer(_line: Option<i32>) {}

/// Mark the end of a timed region.
#[inline]
pub fn stop_timer(_line: Option<i32>) {}
