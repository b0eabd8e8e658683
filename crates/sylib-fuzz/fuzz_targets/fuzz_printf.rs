#![no_main]
use libfuzzer_sys::fuzz_target;
use sylib_core::FormatArg;
use sylib_core::stdio::printf::{MAX_FORMAT_ARGS, render_format};

// Arbitrary templates against a fixed argument mix: rendering must not panic
// whatever conversions, widths and precisions the template asks for.
fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    let pool = [
        FormatArg::SignedInt(-7),
        FormatArg::UnsignedInt(u64::MAX),
        FormatArg::Float(f64::from_bits(0x7ff8_0000_0000_0001)),
        FormatArg::Float(-1.0e-310),
        FormatArg::Char(b'z'),
        FormatArg::Str(b"fuzz"),
        FormatArg::Pointer(0),
        FormatArg::Float(1.0e300),
    ];
    let args: Vec<FormatArg<'_>> = pool.iter().cycle().take(MAX_FORMAT_ARGS).copied().collect();
    let _ = render_format(data, &args);
});
