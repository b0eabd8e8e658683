//! Argument pulling for the variadic `putf` export.
//!
//! The printf engine asks for arguments by class through
//! [`sylib_core::stdio::printf::ArgSource`]. [`PullSource`] adapts a single
//! `FnMut(ArgClass) -> RawArg` pull function to that trait, which lets the
//! export wrap its `va_list` in a closure without naming the unstable type.

use sylib_core::stdio::printf::ArgSource;

/// C argument class requested by a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgClass {
    /// Integer, character, or pointer (read as a 64-bit register value).
    Int,
    /// `double` (C promotes `float`).
    Float,
    /// `char *`.
    Str,
}

/// One argument as pulled from the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawArg<'a> {
    Int(u64),
    Float(f64),
    /// NUL-terminated bytes without the terminator; `None` for a null pointer.
    Str(Option<&'a [u8]>),
    /// No argument left.
    Missing,
}

/// [`ArgSource`] over a pull function.
pub struct PullSource<F>(pub F);

impl<'a, F> ArgSource<'a> for PullSource<F>
where
    F: FnMut(ArgClass) -> RawArg<'a>,
{
    fn next_int(&mut self) -> Option<u64> {
        match (self.0)(ArgClass::Int) {
            RawArg::Int(v) => Some(v),
            _ => None,
        }
    }

    fn next_float(&mut self) -> Option<f64> {
        match (self.0)(ArgClass::Float) {
            RawArg::Float(v) => Some(v),
            _ => None,
        }
    }

    fn next_str(&mut self) -> Option<Option<&'a [u8]>> {
        match (self.0)(ArgClass::Str) {
            RawArg::Str(s) => Some(s),
            _ => None,
        }
    }
}
