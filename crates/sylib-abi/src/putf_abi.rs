//! Variadic formatted write-through (`putf`).

use std::ffi::{CStr, c_char};

use sylib_core::stdio::printf::{collect_args, parse_format_string};

use crate::console::with_console;
use crate::va::{ArgClass, PullSource, RawArg};

/// `printf`-style write to the console.
///
/// Arguments are pulled one per directive (plus `*` width/precision) in the
/// classes C default promotions produce.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn putf(fmt: *const c_char, mut args: ...) {
    if fmt.is_null() {
        return;
    }
    // SAFETY: caller passes a NUL-terminated template.
    let template = unsafe { CStr::from_ptr(fmt) }.to_bytes();
    let segments = parse_format_string(template);

    let mut source = PullSource(|class| match class {
        // SAFETY: the template promises an argument of this class here.
        ArgClass::Int => RawArg::Int(unsafe { args.arg::<u64>() }),
        ArgClass::Float => RawArg::Float(unsafe { args.arg::<f64>() }),
        ArgClass::Str => {
            let ptr = unsafe { args.arg::<*const c_char>() };
            RawArg::Str((!ptr.is_null()).then(|| unsafe { CStr::from_ptr(ptr) }.to_bytes()))
        }
    });
    let collected = collect_args(&segments, &mut source);
    with_console(|rt| rt.write_formatted(template, &collected));
}
