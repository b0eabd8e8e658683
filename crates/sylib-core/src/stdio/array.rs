//! Array line rendering: `"<n>:"`, then `" <elem>"` per element, then `"\n"`.

use crate::config::FloatTextPolicy;
use crate::float_text::format_float_text;

/// Number of elements emitted for a declared count of `n` over `available`.
#[inline]
fn emitted(n: i32, available: usize) -> usize {
    usize::try_from(n).map_or(0, |n| n.min(available))
}

fn render_with<T: Copy>(n: i32, values: &[T], mut elem: impl FnMut(T, &mut Vec<u8>)) -> Vec<u8> {
    let count = emitted(n, values.len());
    let mut out = Vec::with_capacity(12 + count * 12);
    out.extend_from_slice(n.to_string().as_bytes());
    out.push(b':');
    for &value in &values[..count] {
        out.push(b' ');
        elem(value, &mut out);
    }
    out.push(b'\n');
    out
}

/// Render an integer array line. The printed count is `n`; at most
/// `values.len()` elements follow it.
#[must_use]
pub fn render_int_array(n: i32, values: &[i32]) -> Vec<u8> {
    render_with(n, values, |v, out| out.extend_from_slice(v.to_string().as_bytes()))
}

/// Render a float array line with each element in `policy` text.
#[must_use]
pub fn render_float_array(n: i32, values: &[f32], policy: FloatTextPolicy) -> Vec<u8> {
    render_with(n, values, |v, out| {
        out.extend_from_slice(format_float_text(v, policy).as_bytes());
    })
}
