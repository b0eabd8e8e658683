//! printf formatting engine.
//!
//! Interprets printf-style templates and renders typed arguments to byte
//! buffers with width/precision/flag support. This backs `putf` (the
//! formatted write-through) and the scalar renderers used by `putint` and
//! `putfloat`.
//!
//! Reference: POSIX.1-2024 fprintf, ISO C11 7.21.6.1
//!
//! Design invariant: all formatting is bounded. Maximum expansion per
//! specifier is `width + precision + 64` bytes (sign + prefix + digits),
//! with width and precision padding each capped at 4096 bytes.

// ---------------------------------------------------------------------------
// Format spec types
// ---------------------------------------------------------------------------

/// Flags parsed from a printf format directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Width specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
    FromArg, // '*'
}

/// Precision specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    Fixed(usize),
    FromArg, // '.*'
}

/// Length modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMod {
    None,
    Hh,   // 'hh'
    H,    // 'h'
    L,    // 'l'
    Ll,   // 'll'
    Z,    // 'z'
    T,    // 't'
    J,    // 'j'
    BigL, // 'L'
}

/// A parsed printf format specifier.
#[derive(Debug, Clone)]
pub struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    pub length: LengthMod,
    pub conversion: u8,
}

impl FormatSpec {
    /// A bare `%<conversion>` directive: no flags, width, precision or length.
    #[must_use]
    pub const fn plain(conversion: u8) -> Self {
        Self {
            flags: FormatFlags {
                left_justify: false,
                force_sign: false,
                space_sign: false,
                alt_form: false,
                zero_pad: false,
            },
            width: Width::None,
            precision: Precision::None,
            length: LengthMod::None,
            conversion,
        }
    }

    /// Whether this directive consumes a floating-point argument.
    #[must_use]
    pub const fn is_float_conversion(&self) -> bool {
        matches!(
            self.conversion,
            b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A'
        )
    }
}

// ---------------------------------------------------------------------------
// Format argument types (for safe rendering)
// ---------------------------------------------------------------------------

/// Typed argument value for the write-through formatter.
///
/// Integer arguments carry their full 64-bit register value; the directive's
/// length modifier decides how many low bits are significant, exactly as a
/// variadic callee would.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg<'a> {
    SignedInt(i64),
    UnsignedInt(u64),
    Float(f64),
    Char(u8),
    Str(&'a [u8]),
    Pointer(usize),
}

impl FormatArg<'_> {
    fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::SignedInt(v) => Some(v),
            Self::UnsignedInt(v) => Some(v as i64),
            Self::Float(v) => Some(v as i64),
            Self::Char(c) => Some(i64::from(c)),
            Self::Pointer(p) => Some(p as i64),
            Self::Str(_) => None,
        }
    }

    fn as_u64(&self) -> Option<u64> {
        self.as_i64().map(|v| v as u64)
    }

    fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            Self::SignedInt(v) => Some(v as f64),
            Self::UnsignedInt(v) => Some(v as f64),
            Self::Char(c) => Some(f64::from(c)),
            Self::Pointer(_) | Self::Str(_) => None,
        }
    }
}

/// Source of raw variadic arguments, pulled in directive order.
///
/// `sylib-abi` implements this over a C `va_list`; tests implement it over a
/// slice. Each method returns `None` once the source is exhausted.
pub trait ArgSource<'a> {
    /// Next integer-class argument as its full register value.
    fn next_int(&mut self) -> Option<u64>;
    /// Next floating-point argument (C promotes `float` to `double`).
    fn next_float(&mut self) -> Option<f64>;
    /// Next `%s` argument; `Some(None)` for a null pointer.
    fn next_str(&mut self) -> Option<Option<&'a [u8]>>;
}

/// Maximum arguments pulled from an [`ArgSource`] per template.
pub const MAX_FORMAT_ARGS: usize = 32;

/// Pull one argument per directive (plus `*` width/precision) from `source`.
///
/// Stops at [`MAX_FORMAT_ARGS`] or when the source runs dry; directives
/// without a matching argument render nothing.
pub fn collect_args<'a, S: ArgSource<'a>>(
    segments: &[FormatSegment<'_>],
    source: &mut S,
) -> Vec<FormatArg<'a>> {
    let mut args = Vec::new();
    let pulls = segments.iter().flat_map(|seg| {
        let FormatSegment::Spec(spec) = seg else {
            return [None, None, None];
        };
        [
            matches!(spec.width, Width::FromArg).then_some(b'*'),
            matches!(spec.precision, Precision::FromArg).then_some(b'*'),
            (spec.conversion != b'%').then_some(spec.conversion),
        ]
    });
    for conversion in pulls.flatten() {
        if args.len() >= MAX_FORMAT_ARGS {
            break;
        }
        let Some(arg) = pull_arg(conversion, source) else {
            break;
        };
        args.push(arg);
    }
    args
}

fn pull_arg<'a, S: ArgSource<'a>>(conversion: u8, source: &mut S) -> Option<FormatArg<'a>> {
    match conversion {
        b'*' | b'd' | b'i' | b'n' => source.next_int().map(|v| FormatArg::SignedInt(v as i64)),
        b'u' | b'x' | b'X' | b'o' => source.next_int().map(FormatArg::UnsignedInt),
        b'c' => source.next_int().map(|v| FormatArg::Char(v as u8)),
        b'p' => source.next_int().map(|v| FormatArg::Pointer(v as usize)),
        b's' => source.next_str().map(|s| match s {
            Some(bytes) => FormatArg::Str(bytes),
            None => FormatArg::Pointer(0),
        }),
        _ => source.next_float().map(FormatArg::Float),
    }
}

// ---------------------------------------------------------------------------
// Segment: parsed pieces of a format string
// ---------------------------------------------------------------------------

/// A segment of a parsed format string.
#[derive(Debug, Clone)]
pub enum FormatSegment<'a> {
    /// Literal bytes to emit verbatim.
    Literal(&'a [u8]),
    /// A `%%` escape (emit a single '%').
    Percent,
    /// A conversion specifier requiring an argument.
    Spec(FormatSpec),
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a single format specifier starting after the '%' character.
///
/// `fmt` points to the first byte AFTER '%'. Returns `(spec, bytes_consumed)`
/// where `bytes_consumed` counts from `fmt[0]`. Returns `None` if malformed.
pub fn parse_format_spec(fmt: &[u8]) -> Option<(FormatSpec, usize)> {
    let mut pos = 0;
    let len = fmt.len();

    // --- flags ---
    let mut flags = FormatFlags::default();
    while pos < len {
        match fmt[pos] {
            b'-' => flags.left_justify = true,
            b'+' => flags.force_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            _ => break,
        }
        pos += 1;
    }
    // POSIX: '+' overrides ' '; '-' overrides '0'.
    if flags.force_sign {
        flags.space_sign = false;
    }
    if flags.left_justify {
        flags.zero_pad = false;
    }

    // --- width ---
    let width = if pos < len && fmt[pos] == b'*' {
        pos += 1;
        Width::FromArg
    } else {
        let start = pos;
        while pos < len && fmt[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos > start {
            Width::Fixed(parse_decimal(&fmt[start..pos]))
        } else {
            Width::None
        }
    };

    // --- precision ---
    let precision = if pos < len && fmt[pos] == b'.' {
        pos += 1;
        if pos < len && fmt[pos] == b'*' {
            pos += 1;
            Precision::FromArg
        } else {
            let start = pos;
            while pos < len && fmt[pos].is_ascii_digit() {
                pos += 1;
            }
            Precision::Fixed(if pos > start {
                parse_decimal(&fmt[start..pos])
            } else {
                0
            })
        }
    } else {
        Precision::None
    };

    // --- length modifier ---
    let length = match fmt.get(pos) {
        Some(b'h') if fmt.get(pos + 1) == Some(&b'h') => {
            pos += 2;
            LengthMod::Hh
        }
        Some(b'h') => {
            pos += 1;
            LengthMod::H
        }
        Some(b'l') if fmt.get(pos + 1) == Some(&b'l') => {
            pos += 2;
            LengthMod::Ll
        }
        Some(b'l') => {
            pos += 1;
            LengthMod::L
        }
        Some(b'z') => {
            pos += 1;
            LengthMod::Z
        }
        Some(b't') => {
            pos += 1;
            LengthMod::T
        }
        Some(b'j') => {
            pos += 1;
            LengthMod::J
        }
        Some(b'L') => {
            pos += 1;
            LengthMod::BigL
        }
        _ => LengthMod::None,
    };

    // --- conversion specifier ---
    let conversion = *fmt.get(pos)?;
    pos += 1;

    match conversion {
        b'd' | b'i' | b'u' | b'x' | b'X' | b'o' | b's' | b'c' | b'p' | b'n' | b'%' | b'f'
        | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => {}
        _ => return None,
    }

    Some((
        FormatSpec {
            flags,
            width,
            precision,
            length,
            conversion,
        },
        pos,
    ))
}

/// Split a printf format string into segments.
///
/// Yields `FormatSegment::Literal` for literal runs and `FormatSegment::Spec`
/// for each `%`-directive. `%%` yields `FormatSegment::Percent`.
pub fn parse_format_string(fmt: &[u8]) -> Vec<FormatSegment<'_>> {
    let mut segments = Vec::new();
    let mut pos = 0;
    let len = fmt.len();

    while pos < len {
        let start = pos;
        while pos < len && fmt[pos] != b'%' {
            pos += 1;
        }
        if pos > start {
            segments.push(FormatSegment::Literal(&fmt[start..pos]));
        }
        if pos >= len {
            break;
        }
        pos += 1;
        if pos >= len {
            // Trailing '%' with nothing after: literal.
            segments.push(FormatSegment::Literal(&fmt[pos - 1..pos]));
            break;
        }
        if fmt[pos] == b'%' {
            segments.push(FormatSegment::Percent);
            pos += 1;
            continue;
        }
        if let Some((spec, consumed)) = parse_format_spec(&fmt[pos..]) {
            pos += consumed;
            segments.push(FormatSegment::Spec(spec));
        } else {
            // Malformed spec: emit the '%' as literal and continue.
            segments.push(FormatSegment::Literal(&fmt[pos - 1..pos]));
        }
    }
    segments
}

// ---------------------------------------------------------------------------
// Template rendering
// ---------------------------------------------------------------------------

/// Render `fmt` with `args` consumed in directive order.
///
/// `*` width/precision consume an integer argument first. Arguments of the
/// wrong kind are coerced numerically; a directive with no argument left (or
/// an uncoercible one) renders nothing. `%n` consumes its argument and writes
/// nothing back.
pub fn render_format(fmt: &[u8], args: &[FormatArg<'_>]) -> Vec<u8> {
    let segments = parse_format_string(fmt);
    render_segments(&segments, args)
}

/// Render pre-parsed segments. See [`render_format`].
pub fn render_segments(segments: &[FormatSegment<'_>], args: &[FormatArg<'_>]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    let mut next = args.iter();

    for seg in segments {
        match seg {
            FormatSegment::Literal(lit) => buf.extend_from_slice(lit),
            FormatSegment::Percent => buf.push(b'%'),
            FormatSegment::Spec(spec) => {
                let mut resolved = spec.clone();
                if matches!(spec.width, Width::FromArg) {
                    resolved.width = Width::None;
                    if let Some(w) = next.next().and_then(FormatArg::as_i64) {
                        let w = w as i32;
                        if w < 0 {
                            resolved.flags.left_justify = true;
                            resolved.flags.zero_pad = false;
                        }
                        resolved.width = Width::Fixed(w.unsigned_abs() as usize);
                    }
                }
                if matches!(spec.precision, Precision::FromArg) {
                    resolved.precision = match next.next().and_then(FormatArg::as_i64) {
                        Some(p) if (p as i32) >= 0 => Precision::Fixed(p as i32 as usize),
                        _ => Precision::None,
                    };
                }
                let Some(arg) = next.next() else {
                    continue;
                };
                render_one(&resolved, arg, &mut buf);
            }
        }
    }
    buf
}

fn render_one(spec: &FormatSpec, arg: &FormatArg<'_>, buf: &mut Vec<u8>) {
    match spec.conversion {
        b'd' | b'i' => {
            if let Some(raw) = arg.as_i64() {
                let val = match spec.length {
                    LengthMod::Hh => i64::from(raw as i8),
                    LengthMod::H => i64::from(raw as i16),
                    LengthMod::L | LengthMod::Ll | LengthMod::J | LengthMod::Z | LengthMod::T => {
                        raw
                    }
                    _ => i64::from(raw as i32),
                };
                format_signed(val, spec, buf);
            }
        }
        b'u' | b'x' | b'X' | b'o' => {
            if let Some(raw) = arg.as_u64() {
                let val = match spec.length {
                    LengthMod::Hh => u64::from(raw as u8),
                    LengthMod::H => u64::from(raw as u16),
                    LengthMod::L | LengthMod::Ll | LengthMod::J | LengthMod::Z | LengthMod::T => {
                        raw
                    }
                    _ => u64::from(raw as u32),
                };
                format_unsigned(val, spec, buf);
            }
        }
        b'c' => {
            if let Some(raw) = arg.as_i64() {
                format_char(raw as u8, spec, buf);
            }
        }
        b's' => match *arg {
            FormatArg::Str(s) => format_str(s, spec, buf),
            FormatArg::Pointer(0) => format_str(b"(null)", spec, buf),
            _ => {}
        },
        b'p' => {
            if let Some(raw) = arg.as_u64() {
                format_pointer(raw as usize, spec, buf);
            }
        }
        b'n' => {}
        _ if spec.is_float_conversion() => {
            if let Some(v) = arg.as_f64() {
                format_float(v, spec, buf);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Render a signed integer to `buf` according to `spec`.
pub fn format_signed(value: i64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let negative = value < 0;
    let abs = value.unsigned_abs();

    let (base, uppercase) = int_base(spec.conversion);
    let mut digits = [0u8; 64];
    let digit_count = render_digits(abs, base, uppercase, &mut digits);
    let digit_slice = &digits[64 - digit_count..];

    let sign = if negative {
        Some(b'-')
    } else if spec.flags.force_sign {
        Some(b'+')
    } else if spec.flags.space_sign {
        Some(b' ')
    } else {
        None
    };

    // Precision: minimum digits (pad with zeros).
    let precision = match spec.precision {
        Precision::Fixed(p) => p,
        _ => 1,
    };
    let zero_prefix_count = precision.saturating_sub(digit_count);
    let prefix = alt_prefix(spec);

    // Explicit precision 0 with value 0: no digits emitted.
    let suppress_zero = value == 0 && matches!(spec.precision, Precision::Fixed(0));
    let effective_content = if suppress_zero {
        sign.is_some() as usize + prefix.len()
    } else {
        sign.is_some() as usize + prefix.len() + zero_prefix_count + digit_count
    };

    // POSIX: '0' is ignored when a precision is given for integer conversions.
    let zero_pad = spec.flags.zero_pad && matches!(spec.precision, Precision::None);
    let pad_total = resolve_width(spec).saturating_sub(effective_content);

    if !spec.flags.left_justify && !zero_pad {
        pad(buf, b' ', pad_total);
    }
    if let Some(s) = sign {
        buf.push(s);
    }
    buf.extend_from_slice(prefix);
    if !spec.flags.left_justify && zero_pad {
        pad(buf, b'0', pad_total);
    }
    if !suppress_zero {
        pad(buf, b'0', zero_prefix_count);
        buf.extend_from_slice(digit_slice);
    }
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render an unsigned integer to `buf` according to `spec`.
pub fn format_unsigned(value: u64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let (base, uppercase) = int_base(spec.conversion);
    let mut digits = [0u8; 64];
    let digit_count = render_digits(value, base, uppercase, &mut digits);
    let digit_slice = &digits[64 - digit_count..];

    let precision = match spec.precision {
        Precision::Fixed(p) => p,
        _ => 1,
    };
    let zero_prefix_count = precision.saturating_sub(digit_count);

    let prefix = if value != 0 {
        alt_prefix(spec)
    } else {
        b"" as &[u8]
    };

    let suppress_zero = value == 0 && matches!(spec.precision, Precision::Fixed(0));
    let effective_content = if suppress_zero {
        prefix.len()
    } else {
        prefix.len() + zero_prefix_count + digit_count
    };

    let zero_pad = spec.flags.zero_pad && matches!(spec.precision, Precision::None);
    let pad_total = resolve_width(spec).saturating_sub(effective_content);

    if !spec.flags.left_justify && !zero_pad {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(prefix);
    if !spec.flags.left_justify && zero_pad {
        pad(buf, b'0', pad_total);
    }
    if !suppress_zero {
        pad(buf, b'0', zero_prefix_count);
        buf.extend_from_slice(digit_slice);
    }
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render a floating-point value to `buf` according to `spec`.
///
/// Supports `%f`/`%F`, `%e`/`%E`, `%g`/`%G` and `%a`/`%A`. Decimal digit
/// generation uses Rust's exactly-rounded float formatting; `%a` is rendered
/// from the IEEE-754 bit pattern.
pub fn format_float(value: f64, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let uppercase = spec.conversion.is_ascii_uppercase();

    if value.is_nan() {
        let s: &[u8] = if uppercase { b"NAN" } else { b"nan" };
        return format_float_special(s, spec, buf);
    }
    if value.is_infinite() {
        let s: &[u8] = match (uppercase, value > 0.0) {
            (true, true) => b"INF",
            (true, false) => b"-INF",
            (false, true) => b"inf",
            (false, false) => b"-inf",
        };
        return format_float_special(s, spec, buf);
    }

    let negative = value.is_sign_negative();
    let abs = value.abs();
    let fixed_precision = match spec.precision {
        Precision::Fixed(p) => Some(p.min(4096)),
        _ => None,
    };
    let precision = fixed_precision.unwrap_or(6);
    let alt = spec.flags.alt_form;

    let body = match spec.conversion | 0x20 {
        b'e' => format_e(abs, precision, uppercase, alt),
        b'g' => format_g(abs, precision, uppercase, alt),
        b'a' => format_a(abs, fixed_precision, uppercase, alt),
        _ => format_f(abs, precision, alt),
    };

    let sign = if negative {
        Some(b'-')
    } else if spec.flags.force_sign {
        Some(b'+')
    } else if spec.flags.space_sign {
        Some(b' ')
    } else {
        None
    };

    // Hex floats zero-pad after the "0x" prefix.
    let (prefix, digits) = if spec.conversion | 0x20 == b'a' {
        body.split_at(2)
    } else {
        ("", body.as_str())
    };

    let content_len = sign.is_some() as usize + body.len();
    let pad_total = resolve_width(spec).saturating_sub(content_len);

    if !spec.flags.left_justify && !spec.flags.zero_pad {
        pad(buf, b' ', pad_total);
    }
    if let Some(s) = sign {
        buf.push(s);
    }
    buf.extend_from_slice(prefix.as_bytes());
    if !spec.flags.left_justify && spec.flags.zero_pad {
        pad(buf, b'0', pad_total);
    }
    buf.extend_from_slice(digits.as_bytes());
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render a string argument to `buf` according to `spec`.
///
/// Precision truncates the string if set.
pub fn format_str(s: &[u8], spec: &FormatSpec, buf: &mut Vec<u8>) {
    let max_len = match spec.precision {
        Precision::Fixed(p) => p,
        _ => s.len(),
    };
    let effective = &s[..s.len().min(max_len)];
    let pad_total = resolve_width(spec).saturating_sub(effective.len());

    if !spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(effective);
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render a character to `buf` according to `spec`.
pub fn format_char(c: u8, spec: &FormatSpec, buf: &mut Vec<u8>) {
    let pad_total = resolve_width(spec).saturating_sub(1);

    if !spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
    buf.push(c);
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// Render a pointer to `buf` as `0x...` hex, or `(nil)` for null.
pub fn format_pointer(addr: usize, spec: &FormatSpec, buf: &mut Vec<u8>) {
    if addr == 0 {
        return format_str(b"(nil)", &FormatSpec { precision: Precision::None, ..spec.clone() }, buf);
    }

    let mut digits = [0u8; 64];
    let count = render_digits(addr as u64, 16, false, &mut digits);
    let digit_slice = &digits[64 - count..];
    let pad_total = resolve_width(spec).saturating_sub(2 + count);

    if !spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(b"0x");
    buf.extend_from_slice(digit_slice);
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_decimal(digits: &[u8]) -> usize {
    digits.iter().fold(0_usize, |acc, &d| {
        acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
    })
}

fn resolve_width(spec: &FormatSpec) -> usize {
    match spec.width {
        Width::Fixed(w) => w,
        _ => 0,
    }
}

fn int_base(conversion: u8) -> (u64, bool) {
    match conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    }
}

/// Render `value` in the given `base` into the END of `buf`.
/// Returns the number of digits written. Digits are placed right-aligned.
fn render_digits(mut value: u64, base: u64, uppercase: bool, buf: &mut [u8; 64]) -> usize {
    if value == 0 {
        buf[63] = b'0';
        return 1;
    }
    let alpha = if uppercase { b'A' } else { b'a' };
    let mut pos = 64;
    while value > 0 && pos > 0 {
        pos -= 1;
        let digit = (value % base) as u8;
        buf[pos] = if digit < 10 {
            b'0' + digit
        } else {
            alpha + (digit - 10)
        };
        value /= base;
    }
    64 - pos
}

fn alt_prefix(spec: &FormatSpec) -> &'static [u8] {
    if !spec.flags.alt_form {
        return b"";
    }
    match spec.conversion {
        b'o' => b"0",
        b'x' => b"0x",
        b'X' => b"0X",
        _ => b"",
    }
}

fn pad(buf: &mut Vec<u8>, byte: u8, count: usize) {
    buf.resize(buf.len() + count.min(4096), byte);
}

/// Format a special float value (nan/inf) with width/flags. Never zero-padded.
fn format_float_special(s: &[u8], spec: &FormatSpec, buf: &mut Vec<u8>) {
    let pad_total = resolve_width(spec).saturating_sub(s.len());
    if !spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
    buf.extend_from_slice(s);
    if spec.flags.left_justify {
        pad(buf, b' ', pad_total);
    }
}

/// `%f` / `%F` formatting: fixed-point decimal.
fn format_f(value: f64, precision: usize, alt_form: bool) -> String {
    let mut s = format!("{value:.precision$}");
    if precision == 0 && alt_form {
        s.push('.');
    }
    s
}

/// Split Rust's `{:e}` rendering into mantissa text and decimal exponent.
fn sci_parts(value: f64, precision: usize) -> (String, i32) {
    let s = format!("{value:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_string(), exp.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

/// `%e` / `%E` formatting: scientific notation with at least two exponent digits.
fn format_e(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let (mut mantissa, exp) = sci_parts(value, precision);
    if precision == 0 && alt_form {
        mantissa.push('.');
    }
    let e_char = if uppercase { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{e_char}{sign}{:02}", exp.unsigned_abs())
}

/// `%g` / `%G` formatting: `%e` when the exponent is < -4 or >= precision,
/// `%f` otherwise; trailing zeros removed unless `#`.
fn format_g(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let p = precision.max(1);
    let (_, exp) = sci_parts(value, p - 1);

    if exp >= -4 && (exp as i64) < p as i64 {
        let frac_digits = (p as i64 - 1 - exp as i64).max(0) as usize;
        let mut s = format_f(value, frac_digits, alt_form);
        if !alt_form {
            strip_trailing_zeros(&mut s);
        } else if !s.contains('.') {
            s.push('.');
        }
        s
    } else {
        let s = format_e(value, p - 1, uppercase, alt_form);
        if alt_form {
            return s;
        }
        match s.bytes().position(|b| b == b'e' || b == b'E') {
            Some(e_pos) => {
                let mut mantissa = s[..e_pos].to_string();
                strip_trailing_zeros(&mut mantissa);
                format!("{mantissa}{}", &s[e_pos..])
            }
            None => s,
        }
    }
}

/// `%a` / `%A` formatting: hexadecimal significand, binary exponent.
///
/// Without a precision the fraction is the shortest exact one (trailing zero
/// nibbles dropped, no `.` for an integral significand). With a precision the
/// fraction is rounded half-to-even to that many hex digits. Subnormals print
/// with a `0.` significand and exponent `-1022`.
fn format_a(value: f64, precision: Option<usize>, uppercase: bool, alt_form: bool) -> String {
    const FRAC_BITS: u32 = 52;
    const FRAC_NIBBLES: usize = 13;

    let bits = value.to_bits();
    let biased = ((bits >> FRAC_BITS) & 0x7ff) as i32;
    let mut frac = bits & ((1u64 << FRAC_BITS) - 1);
    let (mut lead, exp) = match (biased, frac) {
        (0, 0) => (0u64, 0),
        (0, _) => (0u64, -1022),
        _ => (1u64, biased - 1023),
    };

    let digits = match precision {
        None => {
            let mut n = FRAC_NIBBLES;
            while n > 0 && (frac >> ((FRAC_NIBBLES - n) * 4)) & 0xf == 0 {
                n -= 1;
            }
            frac >>= (FRAC_NIBBLES - n) * 4;
            n
        }
        Some(p) if p < FRAC_NIBBLES => {
            let shift = (FRAC_NIBBLES - p) * 4;
            let rem = frac & ((1u64 << shift) - 1);
            let half = 1u64 << (shift - 1);
            frac >>= shift;
            if rem > half || (rem == half && frac & 1 == 1) {
                frac += 1;
                if frac >> (p * 4) != 0 {
                    frac = 0;
                    lead += 1;
                }
            }
            p
        }
        Some(p) => p,
    };

    let mut s = String::with_capacity(24 + digits);
    s.push_str(if uppercase { "0X" } else { "0x" });
    s.push(char::from(b'0' + lead as u8));
    if digits > 0 || alt_form {
        s.push('.');
    }
    let shown = digits.min(FRAC_NIBBLES);
    for i in (0..shown).rev() {
        let nibble = ((frac >> (i * 4)) & 0xf) as u32;
        let c = char::from_digit(nibble, 16).unwrap_or('0');
        s.push(if uppercase { c.to_ascii_uppercase() } else { c });
    }
    for _ in shown..digits {
        s.push('0');
    }
    s.push(if uppercase { 'P' } else { 'p' });
    s.push(if exp < 0 { '-' } else { '+' });
    s.push_str(&exp.unsigned_abs().to_string());
    s
}

/// Remove trailing zeros after the decimal point.
fn strip_trailing_zeros(s: &mut String) {
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(conversion: u8) -> FormatSpec {
        FormatSpec::plain(conversion)
    }

    fn render_float(value: f64, spec: &FormatSpec) -> String {
        let mut buf = Vec::new();
        format_float(value, spec, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    fn render(fmt: &str, args: &[FormatArg<'_>]) -> String {
        String::from_utf8(render_format(fmt.as_bytes(), args)).unwrap()
    }

    #[test]
    fn test_parse_simple_int() {
        let (spec, consumed) = parse_format_spec(b"d").unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(spec.conversion, b'd');
        assert_eq!(spec.width, Width::None);
        assert_eq!(spec.precision, Precision::None);
    }

    #[test]
    fn test_parse_width_precision() {
        let (spec, consumed) = parse_format_spec(b"10.5f").unwrap();
        assert_eq!(consumed, 5);
        assert_eq!(spec.width, Width::Fixed(10));
        assert_eq!(spec.precision, Precision::Fixed(5));
    }

    #[test]
    fn test_parse_flags() {
        let (spec, _) = parse_format_spec(b"-+#010d").unwrap();
        assert!(spec.flags.left_justify);
        assert!(spec.flags.force_sign);
        assert!(spec.flags.alt_form);
        assert!(!spec.flags.zero_pad); // overridden by '-'
    }

    #[test]
    fn test_parse_length_modifiers() {
        assert_eq!(parse_format_spec(b"hhd").unwrap().0.length, LengthMod::Hh);
        assert_eq!(parse_format_spec(b"hd").unwrap().0.length, LengthMod::H);
        assert_eq!(parse_format_spec(b"llu").unwrap().0.length, LengthMod::Ll);
        assert_eq!(parse_format_spec(b"ld").unwrap().0.length, LengthMod::L);
        assert_eq!(parse_format_spec(b"La").unwrap().0.length, LengthMod::BigL);
    }

    #[test]
    fn test_parse_star_width_and_precision() {
        let (spec, _) = parse_format_spec(b"*.*f").unwrap();
        assert_eq!(spec.width, Width::FromArg);
        assert_eq!(spec.precision, Precision::FromArg);
    }

    #[test]
    fn test_parse_rejects_unknown_conversion() {
        assert!(parse_format_spec(b"q").is_none());
        assert!(parse_format_spec(b"5").is_none());
    }

    #[test]
    fn test_parse_format_string_segments() {
        let segments = parse_format_string(b"hello %d world %s!");
        assert_eq!(segments.len(), 5);
        assert!(matches!(segments[0], FormatSegment::Literal(b"hello ")));
        assert!(matches!(&segments[1], FormatSegment::Spec(s) if s.conversion == b'd'));
        assert!(matches!(segments[2], FormatSegment::Literal(b" world ")));
        assert!(matches!(&segments[3], FormatSegment::Spec(s) if s.conversion == b's'));
        assert!(matches!(segments[4], FormatSegment::Literal(b"!")));
    }

    #[test]
    fn test_parse_percent_escape_and_trailing_percent() {
        let segments = parse_format_string(b"100%%");
        assert!(matches!(segments[1], FormatSegment::Percent));
        let segments = parse_format_string(b"50%");
        assert!(matches!(segments.last(), Some(FormatSegment::Literal(b"%"))));
    }

    #[test]
    fn test_format_signed_variants() {
        let mut buf = Vec::new();
        format_signed(-123, &spec(b'd'), &mut buf);
        assert_eq!(&buf, b"-123");

        let padded = FormatSpec {
            width: Width::Fixed(8),
            ..spec(b'd')
        };
        buf.clear();
        format_signed(42, &padded, &mut buf);
        assert_eq!(&buf, b"      42");

        let zeroed = FormatSpec {
            flags: FormatFlags {
                zero_pad: true,
                ..Default::default()
            },
            width: Width::Fixed(8),
            ..spec(b'd')
        };
        buf.clear();
        format_signed(-42, &zeroed, &mut buf);
        assert_eq!(&buf, b"-0000042");

        buf.clear();
        format_signed(i64::MIN, &spec(b'd'), &mut buf);
        assert_eq!(&buf, b"-9223372036854775808");
    }

    #[test]
    fn test_precision_zero_int() {
        let zero_prec = FormatSpec {
            precision: Precision::Fixed(0),
            ..spec(b'd')
        };
        let mut buf = Vec::new();
        format_signed(0, &zero_prec, &mut buf);
        assert_eq!(&buf, b"");
    }

    #[test]
    fn test_format_unsigned_alt_forms() {
        let alt = FormatFlags {
            alt_form: true,
            ..Default::default()
        };
        let mut buf = Vec::new();
        format_unsigned(255, &FormatSpec { flags: alt, ..spec(b'x') }, &mut buf);
        assert_eq!(&buf, b"0xff");
        buf.clear();
        format_unsigned(8, &FormatSpec { flags: alt, ..spec(b'o') }, &mut buf);
        assert_eq!(&buf, b"010");
    }

    #[test]
    fn test_format_str_and_char() {
        let mut buf = Vec::new();
        let truncated = FormatSpec {
            precision: Precision::Fixed(3),
            ..spec(b's')
        };
        format_str(b"hello", &truncated, &mut buf);
        assert_eq!(&buf, b"hel");

        buf.clear();
        let wide = FormatSpec {
            width: Width::Fixed(5),
            ..spec(b'c')
        };
        format_char(b'A', &wide, &mut buf);
        assert_eq!(&buf, b"    A");
    }

    #[test]
    fn test_format_pointer() {
        let mut buf = Vec::new();
        format_pointer(0, &spec(b'p'), &mut buf);
        assert_eq!(&buf, b"(nil)");
        buf.clear();
        format_pointer(0xDEAD, &spec(b'p'), &mut buf);
        assert_eq!(&buf, b"0xdead");
    }

    #[test]
    fn test_format_float_fixed() {
        assert_eq!(render_float(1.5, &spec(b'f')), "1.500000");
        assert_eq!(render_float(-0.0, &spec(b'f')), "-0.000000");
        let prec0 = FormatSpec {
            precision: Precision::Fixed(0),
            ..spec(b'f')
        };
        assert_eq!(render_float(2.7, &prec0), "3");
        assert_eq!(render_float(f64::NAN, &spec(b'f')), "nan");
        assert_eq!(render_float(f64::NEG_INFINITY, &spec(b'F')), "-INF");
    }

    #[test]
    fn test_format_float_scientific() {
        assert_eq!(render_float(12345.678, &spec(b'e')), "1.234568e+04");
        assert_eq!(render_float(0.0, &spec(b'e')), "0.000000e+00");
        assert_eq!(render_float(1e-300, &spec(b'E')), "1.000000E-300");
        let two = FormatSpec {
            precision: Precision::Fixed(2),
            ..spec(b'e')
        };
        assert_eq!(render_float(9.999, &two), "1.00e+01");
    }

    #[test]
    fn test_format_float_general() {
        assert_eq!(render_float(100000.0, &spec(b'g')), "100000");
        assert_eq!(render_float(1000000.0, &spec(b'g')), "1e+06");
        assert_eq!(render_float(0.0001, &spec(b'g')), "0.0001");
        assert_eq!(render_float(0.00001, &spec(b'g')), "1e-05");
        assert_eq!(render_float(0.0, &spec(b'g')), "0");
    }

    #[test]
    fn test_format_hex_float_shortest() {
        assert_eq!(render_float(1.5, &spec(b'a')), "0x1.8p+0");
        assert_eq!(render_float(2.0, &spec(b'a')), "0x1p+1");
        assert_eq!(render_float(0.0, &spec(b'a')), "0x0p+0");
        assert_eq!(render_float(-3.0, &spec(b'a')), "-0x1.8p+1");
        assert_eq!(render_float(f64::from(0.1f32), &spec(b'a')), "0x1.99999ap-4");
        assert_eq!(render_float(f64::from_bits(1), &spec(b'a')), "0x0.0000000000001p-1022");
        assert_eq!(render_float(1.5, &spec(b'A')), "0X1.8P+0");
    }

    #[test]
    fn test_format_hex_float_precision_rounds_half_even() {
        let p1 = FormatSpec {
            precision: Precision::Fixed(1),
            ..spec(b'a')
        };
        // 1.03125 = 0x1.08p+0: tie rounds down to the even digit.
        assert_eq!(render_float(1.03125, &p1), "0x1.0p+0");
        // 1.09375 = 0x1.18p+0: tie rounds up to the even digit.
        assert_eq!(render_float(1.09375, &p1), "0x1.2p+0");
        let p0 = FormatSpec {
            precision: Precision::Fixed(0),
            ..spec(b'a')
        };
        assert_eq!(render_float(1.9375, &p0), "0x2p+0");
        let p3 = FormatSpec {
            precision: Precision::Fixed(3),
            ..spec(b'a')
        };
        assert_eq!(render_float(1.5, &p3), "0x1.800p+0");
    }

    #[test]
    fn test_hex_float_zero_pad_follows_prefix() {
        let zero = FormatSpec {
            flags: FormatFlags {
                zero_pad: true,
                ..Default::default()
            },
            width: Width::Fixed(12),
            ..spec(b'a')
        };
        assert_eq!(render_float(1.5, &zero), "0x00001.8p+0");
    }

    #[test]
    fn test_render_format_mixed_arguments() {
        let out = render(
            "%d-%s-%c-%5.2f|%-4d|%x",
            &[
                FormatArg::SignedInt(-7),
                FormatArg::Str(b"abc"),
                FormatArg::Char(b'Z'),
                FormatArg::Float(3.14159),
                FormatArg::SignedInt(9),
                FormatArg::UnsignedInt(255),
            ],
        );
        assert_eq!(out, "-7-abc-Z- 3.14|9   |ff");
    }

    #[test]
    fn test_render_format_star_width() {
        let out = render(
            "[%*d][%.*f]",
            &[
                FormatArg::SignedInt(-4),
                FormatArg::SignedInt(5),
                FormatArg::SignedInt(1),
                FormatArg::Float(2.26),
            ],
        );
        assert_eq!(out, "[5   ][2.3]");
    }

    #[test]
    fn test_render_format_length_truncation() {
        let out = render(
            "%d %hhd %ld",
            &[
                FormatArg::SignedInt(1 << 32 | 5),
                FormatArg::SignedInt(300),
                FormatArg::SignedInt(1 << 40),
            ],
        );
        assert_eq!(out, "5 44 1099511627776");
    }

    #[test]
    fn test_render_format_missing_and_coerced_arguments() {
        assert_eq!(render("a%db%dc", &[FormatArg::SignedInt(1)]), "a1bc");
        assert_eq!(render("%d", &[FormatArg::Float(2.9)]), "2");
        assert_eq!(render("%.1f", &[FormatArg::SignedInt(3)]), "3.0");
        assert_eq!(render("%s", &[FormatArg::Pointer(0)]), "(null)");
        assert_eq!(render("100%%", &[]), "100%");
    }

    struct SliceSource<'a> {
        ints: std::slice::Iter<'a, u64>,
        floats: std::slice::Iter<'a, f64>,
        strs: std::slice::Iter<'a, Option<&'a [u8]>>,
    }

    impl<'a> ArgSource<'a> for SliceSource<'a> {
        fn next_int(&mut self) -> Option<u64> {
            self.ints.next().copied()
        }
        fn next_float(&mut self) -> Option<f64> {
            self.floats.next().copied()
        }
        fn next_str(&mut self) -> Option<Option<&'a [u8]>> {
            self.strs.next().copied()
        }
    }

    #[test]
    fn test_collect_args_follows_directives() {
        let ints = [3u64, u64::from(b'q'), (-1i64) as u64];
        let floats = [0.5f64];
        let strs: [Option<&[u8]>; 2] = [Some(b"hi"), None];
        let mut source = SliceSource {
            ints: ints.iter(),
            floats: floats.iter(),
            strs: strs.iter(),
        };
        let segments = parse_format_string(b"%*s %c %a %s %u %%");
        let args = collect_args(&segments, &mut source);
        assert_eq!(
            args,
            vec![
                FormatArg::SignedInt(3),
                FormatArg::Str(b"hi"),
                FormatArg::Char(b'q'),
                FormatArg::Float(0.5),
                FormatArg::Pointer(0),
                FormatArg::UnsignedInt(u64::MAX),
            ]
        );
        let out = render_segments(&segments, &args);
        assert_eq!(out, b" hi q 0x1p-1 (null) 4294967295 %");
    }

    #[test]
    fn test_collect_args_stops_when_source_runs_dry() {
        let ints = [1u64];
        let floats: [f64; 0] = [];
        let strs: [Option<&[u8]>; 0] = [];
        let mut source = SliceSource {
            ints: ints.iter(),
            floats: floats.iter(),
            strs: strs.iter(),
        };
        let segments = parse_format_string(b"%d %f %d");
        let args = collect_args(&segments, &mut source);
        assert_eq!(args, vec![FormatArg::SignedInt(1)]);
    }
}
