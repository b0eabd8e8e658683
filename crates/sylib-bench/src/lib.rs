//! Benchmark inputs shared by the `sylib-bench` benches.

/// `count` whitespace-separated integers, preceded by the count.
#[must_use]
pub fn int_array_text(count: usize) -> String {
    let mut text = count.to_string();
    for i in 0..count {
        text.push(' ');
        text.push_str(&(i as i64 * 7919 - 40_000).to_string());
    }
    text.push('\n');
    text
}

/// Deterministic spread of finite `f32` values across the exponent range.
#[must_use]
pub fn float_samples(count: usize) -> Vec<f32> {
    (0..count as u32)
        .map(|i| f32::from_bits(i.wrapping_mul(0x9E37_79B9) & 0x7f7f_ffff))
        .collect()
}
