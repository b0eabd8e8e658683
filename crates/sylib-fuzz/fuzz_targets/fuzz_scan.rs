#![no_main]
use libfuzzer_sys::fuzz_target;
use sylib_core::{FloatTextPolicy, Runtime};

// Arbitrary console input must never panic, and array reads must never
// write past the caller's buffer.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, input)) = data.split_first() else {
        return;
    };
    let policy = if selector & 1 == 0 {
        FloatTextPolicy::HexMinimal
    } else {
        FloatTextPolicy::Decimal
    };
    let mut rt = Runtime::with_policy(input, Vec::new(), policy);
    let mut ints = [0i32; 8];
    let mut floats = [0f32; 8];
    for step in 0..16u8 {
        match (selector >> 1).wrapping_add(step) % 5 {
            0 => {
                rt.read_int();
            }
            1 => {
                rt.read_char();
            }
            2 => {
                rt.read_float();
            }
            3 => {
                rt.read_int_array(&mut ints);
            }
            _ => {
                rt.read_float_array(&mut floats);
            }
        }
    }
});
