//! The console runtime: every read/write operation generated programs call.
//!
//! Reads never fail loudly. A malformed or missing token yields `0` (or
//! `0.0`), leaving the offending input unread. Writes swallow I/O errors the
//! way C `printf` does; [`Runtime::emit`] and [`Runtime::flush`] expose them
//! for callers that care.

use std::io::{self, Read, Write};

use crate::config::{FloatTextPolicy, float_text_policy};
use crate::float_text::format_float_text;
use crate::stdio::array::{render_float_array, render_int_array};
use crate::stdio::printf::{FormatArg, render_format};
use crate::stdio::scanf::{ScanError, Scanner};
use crate::timer;

/// Console runtime over an input source and an output sink.
#[derive(Debug)]
pub struct Runtime<R, W> {
    scanner: Scanner<R>,
    out: W,
    policy: FloatTextPolicy,
}

impl<R: Read, W: Write> Runtime<R, W> {
    /// Runtime using the process-wide float text policy.
    pub fn new(input: R, output: W) -> Self {
        Self::with_policy(input, output, float_text_policy())
    }

    pub fn with_policy(input: R, output: W, policy: FloatTextPolicy) -> Self {
        Self {
            scanner: Scanner::new(input),
            out: output,
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> FloatTextPolicy {
        self.policy
    }

    #[must_use]
    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Write `bytes` in full.
    pub fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// `getint`: next decimal integer, or `0`.
    pub fn read_int(&mut self) -> i32 {
        self.scanner.scan_int().unwrap_or(0)
    }

    /// `getch`: next raw byte as a C `char` value, or `0` at end of input.
    pub fn read_char(&mut self) -> i32 {
        self.scanner
            .scan_char()
            .map_or(0, |byte| i32::from(byte as i8))
    }

    /// `getfloat`: next float token under the active policy, or `0.0`.
    pub fn read_float(&mut self) -> f32 {
        self.scanner.scan_float(self.policy).unwrap_or(0.0)
    }

    /// `getarray`: a count `n`, then `n` integers into `buffer`.
    ///
    /// Returns `n` (`0` if the count is unreadable). Elements past
    /// `buffer.len()` are consumed and dropped; reading stops at the first
    /// element that fails, leaving that slot and the rest untouched.
    pub fn read_int_array(&mut self, buffer: &mut [i32]) -> i32 {
        self.read_int_array_with(|index, value| {
            if let Some(slot) = buffer.get_mut(index) {
                *slot = value;
            }
        })
    }

    /// `getfarray`: [`Runtime::read_int_array`] for floats.
    pub fn read_float_array(&mut self, buffer: &mut [f32]) -> i32 {
        self.read_float_array_with(|index, value| {
            if let Some(slot) = buffer.get_mut(index) {
                *slot = value;
            }
        })
    }

    /// Array read handing each `(index, value)` to `store`, for callers that
    /// own raw storage.
    pub fn read_int_array_with(&mut self, store: impl FnMut(usize, i32)) -> i32 {
        self.read_array(|scanner, _| scanner.scan_int(), store)
    }

    pub fn read_float_array_with(&mut self, store: impl FnMut(usize, f32)) -> i32 {
        self.read_array(|scanner, policy| scanner.scan_float(policy), store)
    }

    fn read_array<T>(
        &mut self,
        mut scan: impl FnMut(&mut Scanner<R>, FloatTextPolicy) -> Result<T, ScanError>,
        mut store: impl FnMut(usize, T),
    ) -> i32 {
        let Ok(n) = self.scanner.scan_int() else {
            return 0;
        };
        for index in 0..usize::try_from(n).unwrap_or(0) {
            let Ok(value) = scan(&mut self.scanner, self.policy) else {
                break;
            };
            store(index, value);
        }
        n
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// `putint`
    pub fn write_int(&mut self, value: i32) {
        let _ = self.emit(value.to_string().as_bytes());
    }

    /// `putch`: the low byte of `value`.
    pub fn write_char(&mut self, value: i32) {
        let _ = self.emit(&[value as u8]);
    }

    /// `putfloat`
    pub fn write_float(&mut self, value: f32) {
        let text = format_float_text(value, self.policy);
        let _ = self.emit(text.as_bytes());
    }

    /// `putarray`: prints `n`, then up to `values.len()` elements.
    pub fn write_int_array(&mut self, n: i32, values: &[i32]) {
        let line = render_int_array(n, values);
        let _ = self.emit(&line);
    }

    /// `putfarray`
    pub fn write_float_array(&mut self, n: i32, values: &[f32]) {
        let line = render_float_array(n, values, self.policy);
        let _ = self.emit(&line);
    }

    /// `putf`: render `template` with `args` and write it.
    ///
    /// Returns the number of bytes written (0 if the write failed).
    pub fn write_formatted(&mut self, template: &[u8], args: &[FormatArg<'_>]) -> usize {
        let rendered = render_format(template, args);
        match self.emit(&rendered) {
            Ok(()) => rendered.len(),
            Err(_) => 0,
        }
    }

    // -----------------------------------------------------------------------
    // Timing
    // -----------------------------------------------------------------------

    /// `starttime`
    pub fn start_timer(&mut self, line: Option<i32>) {
        timer::start_timer(line);
    }

    /// `stoptime`
    pub fn stop_timer(&mut self, line: Option<i32>) {
        timer::stop_timer(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime(input: &str, policy: FloatTextPolicy) -> Runtime<&[u8], Vec<u8>> {
        Runtime::with_policy(input.as_bytes(), Vec::new(), policy)
    }

    fn output(rt: Runtime<&[u8], Vec<u8>>) -> String {
        String::from_utf8(rt.into_output()).unwrap()
    }

    #[test]
    fn scalar_reads_default_to_zero() {
        let mut rt = runtime("12 abc", FloatTextPolicy::HexMinimal);
        assert_eq!(rt.read_int(), 12);
        assert_eq!(rt.read_char(), i32::from(b' '));
        assert_eq!(rt.read_int(), 0);
        assert_eq!(rt.read_float(), 0.0);
        assert_eq!(rt.read_char(), i32::from(b'a'));
    }

    #[test]
    fn read_char_at_end_is_zero_and_sign_extends() {
        let mut rt = Runtime::with_policy(&[0xffu8][..], Vec::new(), FloatTextPolicy::Decimal);
        assert_eq!(rt.read_char(), -1);
        assert_eq!(rt.read_char(), 0);
    }

    #[test]
    fn int_array_reads_into_buffer() {
        let mut rt = runtime("3\n4 5 6\n", FloatTextPolicy::Decimal);
        let mut buf = [0; 4];
        assert_eq!(rt.read_int_array(&mut buf), 3);
        assert_eq!(buf, [4, 5, 6, 0]);
    }

    #[test]
    fn int_array_overflowing_buffer_is_consumed() {
        let mut rt = runtime("4 1 2 3 4 99", FloatTextPolicy::Decimal);
        let mut buf = [0; 2];
        assert_eq!(rt.read_int_array(&mut buf), 4);
        assert_eq!(buf, [1, 2]);
        assert_eq!(rt.read_int(), 99);
    }

    #[test]
    fn int_array_stops_at_bad_element() {
        let mut rt = runtime("3 7 x 9", FloatTextPolicy::Decimal);
        let mut buf = [-1; 3];
        assert_eq!(rt.read_int_array(&mut buf), 3);
        assert_eq!(buf, [7, -1, -1]);

        let mut rt = runtime("oops", FloatTextPolicy::Decimal);
        assert_eq!(rt.read_int_array(&mut buf), 0);
    }

    #[test]
    fn float_array_under_each_policy() {
        let mut rt = runtime("2 0x1.8p+0 2.5", FloatTextPolicy::HexMinimal);
        let mut buf = [0.0; 2];
        assert_eq!(rt.read_float_array(&mut buf), 2);
        assert_eq!(buf, [1.5, 2.5]);

        let mut rt = runtime("2 1.25 -3", FloatTextPolicy::Decimal);
        assert_eq!(rt.read_float_array(&mut buf), 2);
        assert_eq!(buf, [1.25, -3.0]);
    }

    #[test]
    fn scalar_writes() {
        let mut rt = runtime("", FloatTextPolicy::HexMinimal);
        rt.write_int(-42);
        rt.write_char(i32::from(b'\n'));
        rt.write_float(1.5);
        rt.write_char(0x120);
        assert_eq!(output(rt), "-42\n0x1.8p+0 ");
    }

    #[test]
    fn decimal_policy_writes_fixed_notation() {
        let mut rt = runtime("", FloatTextPolicy::Decimal);
        rt.write_float(0.1);
        assert_eq!(output(rt), "0.100000");
    }

    #[test]
    fn array_writes() {
        let mut rt = runtime("", FloatTextPolicy::HexMinimal);
        rt.write_int_array(0, &[]);
        rt.write_int_array(3, &[1, 2, 3]);
        rt.write_float_array(2, &[2.0, 0.0]);
        assert_eq!(output(rt), "0:\n3: 1 2 3\n2: 0x1p+1 0x0p+0\n");
    }

    #[test]
    fn formatted_write_reports_length() {
        let mut rt = runtime("", FloatTextPolicy::HexMinimal);
        let n = rt.write_formatted(
            b"%d items, %s: %.2f\n",
            &[
                FormatArg::SignedInt(3),
                FormatArg::Str(b"avg"),
                FormatArg::Float(1.0 / 3.0),
            ],
        );
        assert_eq!(n, 19);
        assert_eq!(output(rt), "3 items, avg: 0.33\n");
    }

    #[test]
    fn timers_are_silent() {
        let mut rt = runtime("5", FloatTextPolicy::HexMinimal);
        rt.start_timer(None);
        rt.stop_timer(Some(12));
        assert_eq!(rt.read_int(), 5);
        assert_eq!(output(rt), "");
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_swallowed_but_visible_through_emit() {
        let mut rt = Runtime::with_policy(&b""[..], Closed, FloatTextPolicy::Decimal);
        rt.write_int(1);
        assert_eq!(rt.write_formatted(b"x", &[]), 0);
        assert!(rt.emit(b"y").is_err());
    }
}
