#![no_main]
use libfuzzer_sys::fuzz_target;
use sylib_core::FloatTextPolicy;
use sylib_core::float_text::{format_float_text, parse_hex_float};

// Every f32 bit pattern formats to hex text that parses back bit-identically.
fuzz_target!(|data: [u8; 4]| {
    let value = f32::from_le_bytes(data);
    let text = format_float_text(value, FloatTextPolicy::HexMinimal);
    if value.is_nan() {
        assert!(text.ends_with("nan"));
        return;
    }
    let parsed = text
        .strip_suffix("inf")
        .map(|sign| if sign == "-" { f32::NEG_INFINITY } else { f32::INFINITY })
        .or_else(|| parse_hex_float(text.as_bytes()));
    assert_eq!(parsed.map(f32::to_bits), Some(value.to_bits()), "{text}");
});
