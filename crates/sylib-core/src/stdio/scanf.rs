//! Token scanner for console input.
//!
//! Implements the `%d`, `%c` and float (`%f` / `%a`) conversions the runtime
//! needs over any [`Read`] source. Input is pulled in chunks into a lookahead
//! queue, so a rejected token leaves its bytes in place for the next read.

use std::collections::VecDeque;
use std::io::{self, Read};

use thiserror::Error;

use crate::config::FloatTextPolicy;
use crate::float_text::parse_hex_float;

const CHUNK: usize = 4096;

/// Why a scan produced no value.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Input ended before a token started.
    #[error("end of input")]
    Eof,
    /// The next byte cannot start a token of the requested kind. It stays unread.
    #[error("unexpected byte {found:#04x} in input")]
    NoMatch { found: u8 },
    /// The underlying reader failed.
    #[error("input read failed: {0}")]
    Io(#[from] io::Error),
}

/// Whitespace as classified by C `isspace` in the "C" locale.
#[inline]
#[must_use]
pub const fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Buffered scanner over a byte source.
#[derive(Debug)]
pub struct Scanner<R> {
    reader: R,
    lookahead: VecDeque<u8>,
    eof: bool,
    consumed: u64,
}

impl<R: Read> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lookahead: VecDeque::with_capacity(CHUNK),
            eof: false,
            consumed: 0,
        }
    }

    /// Total bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.consumed
    }

    /// Make at least `n` bytes available unless input ends first.
    fn fill(&mut self, n: usize) -> io::Result<()> {
        let mut chunk = [0u8; CHUNK];
        while self.lookahead.len() < n && !self.eof {
            match self.reader.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(read) => self.lookahead.extend(&chunk[..read]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn peek_at(&mut self, index: usize) -> io::Result<Option<u8>> {
        self.fill(index + 1)?;
        Ok(self.lookahead.get(index).copied())
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.lookahead.pop_front()?;
        self.consumed += 1;
        Some(byte)
    }

    fn take(&mut self, len: usize) -> Vec<u8> {
        self.consumed += len as u64;
        self.lookahead.drain(..len).collect()
    }

    /// Discard leading whitespace. Errors with `Eof` if nothing else remains.
    fn skip_space(&mut self) -> Result<u8, ScanError> {
        loop {
            match self.peek_at(0)? {
                None => return Err(ScanError::Eof),
                Some(c) if is_space(c) => {
                    self.bump();
                }
                Some(c) => return Ok(c),
            }
        }
    }

    fn matches_ignore_case(&mut self, at: usize, word: &[u8]) -> io::Result<bool> {
        for (i, &expected) in word.iter().enumerate() {
            match self.peek_at(at + i)? {
                Some(c) if c.eq_ignore_ascii_case(&expected) => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    fn count_while(&mut self, mut at: usize, pred: impl Fn(u8) -> bool) -> io::Result<usize> {
        let start = at;
        while let Some(c) = self.peek_at(at)? {
            if !pred(c) {
                break;
            }
            at += 1;
        }
        Ok(at - start)
    }

    /// Read one raw byte without skipping whitespace.
    pub fn scan_char(&mut self) -> Result<u8, ScanError> {
        self.peek_at(0)?;
        self.bump().ok_or(ScanError::Eof)
    }

    /// Scan a `%d` token: optional sign, then decimal digits.
    ///
    /// Magnitudes beyond `i64` saturate (C `strtol` on LP64), and the result
    /// keeps the low 32 bits.
    pub fn scan_int(&mut self) -> Result<i32, ScanError> {
        let first = self.skip_space()?;
        let sign_len = usize::from(first == b'+' || first == b'-');
        match self.peek_at(sign_len)? {
            Some(c) if c.is_ascii_digit() => {}
            _ => return Err(ScanError::NoMatch { found: first }),
        }
        let negative = first == b'-';
        if sign_len == 1 {
            self.bump();
        }

        let abs_max = if negative {
            i64::MIN.unsigned_abs()
        } else {
            i64::MAX as u64
        };
        let mut acc = 0u64;
        let mut overflow = false;
        while let Some(c) = self.peek_at(0)? {
            if !c.is_ascii_digit() {
                break;
            }
            self.bump();
            let digit = u64::from(c - b'0');
            match acc.checked_mul(10).and_then(|v| v.checked_add(digit)) {
                Some(v) if v <= abs_max && !overflow => acc = v,
                _ => overflow = true,
            }
        }

        let value = match (overflow, negative) {
            (true, true) => i64::MIN,
            (true, false) => i64::MAX,
            (false, true) => (acc as i64).wrapping_neg(),
            (false, false) => acc as i64,
        };
        Ok(value as i32)
    }

    /// Scan a float token under `policy`, longest valid prefix.
    ///
    /// Accepts decimal tokens, `inf`/`infinity`/`nan` (any case, `nan` with an
    /// optional `(chars)` suffix), and hexadecimal tokens when the policy
    /// allows them.
    pub fn scan_float(&mut self, policy: FloatTextPolicy) -> Result<f32, ScanError> {
        let first = self.skip_space()?;
        let sign_len = usize::from(first == b'+' || first == b'-');
        let negative = first == b'-';
        let signed = |v: f32| if negative { -v } else { v };

        if self.matches_ignore_case(sign_len, b"inf")? {
            let mut len = sign_len + 3;
            if self.matches_ignore_case(len, b"inity")? {
                len += 5;
            }
            self.take(len);
            return Ok(signed(f32::INFINITY));
        }
        if self.matches_ignore_case(sign_len, b"nan")? {
            let mut len = sign_len + 3;
            if self.peek_at(len)? == Some(b'(') {
                let inner =
                    self.count_while(len + 1, |c| c.is_ascii_alphanumeric() || c == b'_')?;
                if self.peek_at(len + 1 + inner)? == Some(b')') {
                    len += inner + 2;
                }
            }
            self.take(len);
            return Ok(signed(f32::NAN));
        }

        if policy.accepts_hex_input() {
            if let Some(len) = self.hex_token_len(sign_len)? {
                let token = self.take(len);
                return parse_hex_float(&token).ok_or(ScanError::NoMatch { found: first });
            }
        }

        let len = self.decimal_token_len(sign_len)?;
        if len == 0 {
            return Err(ScanError::NoMatch { found: first });
        }
        let token = self.take(len);
        std::str::from_utf8(&token)
            .ok()
            .and_then(|text| text.parse::<f32>().ok())
            .ok_or(ScanError::NoMatch { found: first })
    }

    /// Length of a hexadecimal-float token starting at `at`, sign included.
    fn hex_token_len(&mut self, at: usize) -> io::Result<Option<usize>> {
        let prefixed = self.peek_at(at)? == Some(b'0')
            && matches!(self.peek_at(at + 1)?, Some(b'x' | b'X'));
        if !prefixed {
            return Ok(None);
        }
        let mut pos = at + 2;
        let int_digits = self.count_while(pos, |c| c.is_ascii_hexdigit())?;
        pos += int_digits;
        let mut frac_digits = 0;
        if self.peek_at(pos)? == Some(b'.') {
            frac_digits = self.count_while(pos + 1, |c| c.is_ascii_hexdigit())?;
            if int_digits + frac_digits > 0 {
                pos += 1 + frac_digits;
            }
        }
        if int_digits + frac_digits == 0 {
            return Ok(None);
        }
        pos += self.exponent_len(pos, b'p')?;
        Ok(Some(pos))
    }

    /// Length of a decimal float token starting at `at`, sign included, or 0.
    fn decimal_token_len(&mut self, at: usize) -> io::Result<usize> {
        let mut pos = at;
        let int_digits = self.count_while(pos, |c| c.is_ascii_digit())?;
        pos += int_digits;
        let mut frac_digits = 0;
        if self.peek_at(pos)? == Some(b'.') {
            frac_digits = self.count_while(pos + 1, |c| c.is_ascii_digit())?;
            if int_digits + frac_digits > 0 {
                pos += 1 + frac_digits;
            }
        }
        if int_digits + frac_digits == 0 {
            return Ok(0);
        }
        pos += self.exponent_len(pos, b'e')?;
        Ok(pos)
    }

    /// Length of an exponent suffix (`marker [sign] digits`) at `at`, or 0 if
    /// no digits follow the marker.
    fn exponent_len(&mut self, at: usize, marker: u8) -> io::Result<usize> {
        match self.peek_at(at)? {
            Some(c) if c.eq_ignore_ascii_case(&marker) => {}
            _ => return Ok(0),
        }
        let sign_len = usize::from(matches!(self.peek_at(at + 1)?, Some(b'+' | b'-')));
        let digits = self.count_while(at + 1 + sign_len, |c| c.is_ascii_digit())?;
        Ok(if digits == 0 { 0 } else { 1 + sign_len + digits })
    }

    /// Remaining unread input, for diagnostics and tests.
    pub fn drain_remaining(&mut self) -> Result<Vec<u8>, ScanError> {
        self.fill(usize::MAX)?;
        let len = self.lookahead.len();
        Ok(self.take(len))
    }
}
