//! Float text codec.
//!
//! Renders `f32` values as console text under a [`FloatTextPolicy`] and
//! decodes hexadecimal-float tokens back to `f32` with correct rounding.

use std::borrow::Cow;

use crate::config::FloatTextPolicy;
use crate::stdio::printf::{FormatSpec, format_float};

/// Render `value` as console text.
///
/// `Decimal` is `%f`. `HexMinimal` is `%a` of the value promoted to `f64`,
/// passed through [`minimize_hex_float`].
#[must_use]
pub fn format_float_text(value: f32, policy: FloatTextPolicy) -> String {
    let conversion = match policy {
        FloatTextPolicy::Decimal => b'f',
        FloatTextPolicy::HexMinimal => b'a',
    };
    let mut buf = Vec::with_capacity(24);
    format_float(f64::from(value), &FormatSpec::plain(conversion), &mut buf);
    let text = String::from_utf8_lossy(&buf).into_owned();
    match policy {
        FloatTextPolicy::Decimal => text,
        FloatTextPolicy::HexMinimal => minimize_hex_float(&text).into_owned(),
    }
}

/// Strip trailing zero digits (and a then-trailing `.`) from the significand
/// of a hexadecimal-float string, keeping the exponent suffix.
///
/// Text without a `p` exponent marker, or not ending in a decimal digit
/// (`nan`, `inf`), is returned unchanged. Zeros are only stripped from a
/// fractional part, so `0x10p+0` stays intact.
#[must_use]
pub fn minimize_hex_float(text: &str) -> Cow<'_, str> {
    if !text.ends_with(|c: char| c.is_ascii_digit()) {
        return Cow::Borrowed(text);
    }
    let Some(p_pos) = text.rfind(['p', 'P']) else {
        return Cow::Borrowed(text);
    };
    let (significand, exponent) = text.split_at(p_pos);
    if !significand.contains('.') {
        return Cow::Borrowed(text);
    }
    let trimmed = significand.trim_end_matches('0').trim_end_matches('.');
    if trimmed.len() == significand.len() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(format!("{trimmed}{exponent}"))
}

const MANTISSA_LIMIT: u64 = 1 << 60;
const EXPONENT_CAP: i64 = 100_000;

/// Decode a hexadecimal-float token (`[sign] 0x hex [. hex] [p [sign] dec]`)
/// to the nearest `f32`, ties to even.
///
/// Returns `None` if `token` is not a complete hexadecimal-float token.
#[must_use]
pub fn parse_hex_float(token: &[u8]) -> Option<f32> {
    let (negative, rest) = match token.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, token),
    };
    let rest = match rest {
        [b'0', b'x' | b'X', rest @ ..] => rest,
        _ => return None,
    };

    let mut mantissa = 0u64;
    let mut exp2 = 0i64;
    let mut sticky = false;
    let mut any_digit = false;
    let mut in_fraction = false;
    let mut pos = 0;

    while let Some(&c) = rest.get(pos) {
        if c == b'.' && !in_fraction {
            in_fraction = true;
            pos += 1;
            continue;
        }
        let Some(digit) = char::from(c).to_digit(16) else {
            break;
        };
        any_digit = true;
        if mantissa < MANTISSA_LIMIT {
            mantissa = mantissa << 4 | u64::from(digit);
            if in_fraction {
                exp2 -= 4;
            }
        } else {
            sticky |= digit != 0;
            if !in_fraction {
                exp2 += 4;
            }
        }
        pos += 1;
    }
    if !any_digit {
        return None;
    }

    if let Some(&(b'p' | b'P')) = rest.get(pos) {
        pos += 1;
        let exp_negative = match rest.get(pos) {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };
        let start = pos;
        let mut value = 0i64;
        while let Some(&d @ b'0'..=b'9') = rest.get(pos) {
            value = (value * 10 + i64::from(d - b'0')).min(EXPONENT_CAP);
            pos += 1;
        }
        if pos == start {
            return None;
        }
        exp2 += if exp_negative { -value } else { value };
    }
    if pos != rest.len() {
        return None;
    }

    Some(compose_f32(negative, mantissa, exp2, sticky))
}

/// Round `mantissa * 2^exp2` (plus a sticky bit for discarded nonzero digits)
/// to the nearest `f32`, ties to even, with gradual underflow.
fn compose_f32(negative: bool, mantissa: u64, exp2: i64, sticky: bool) -> f32 {
    let sign = if negative { 0x8000_0000u32 } else { 0 };
    if mantissa == 0 {
        return f32::from_bits(sign);
    }
    let infinity = f32::from_bits(sign | 0x7f80_0000);

    let lz = mantissa.leading_zeros();
    let m = mantissa << lz;
    let mut e = exp2 + 63 - i64::from(lz);
    if e > 127 {
        return infinity;
    }

    let precision = if e >= -126 { 24 } else { e + 150 };
    if precision < 0 {
        return f32::from_bits(sign);
    }

    let shift = (64 - precision) as u32;
    let (mut kept, rem, half) = if shift >= 64 {
        (0u64, m, 1u64 << 63)
    } else {
        (m >> shift, m & ((1u64 << shift) - 1), 1u64 << (shift - 1))
    };
    if rem > half || (rem == half && (sticky || kept & 1 == 1)) {
        kept += 1;
    }

    if precision < 24 {
        // Subnormal; a carry into bit 23 lands on the smallest normal.
        return f32::from_bits(sign | kept as u32);
    }
    if kept == 1 << 24 {
        kept >>= 1;
        e += 1;
        if e > 127 {
            return infinity;
        }
    }
    let bits = ((e + 127) as u32) << 23 | (kept as u32 & 0x007f_ffff);
    f32::from_bits(sign | bits)
}
