//! Console exports: scalar and array reads/writes plus the timer hooks.
//!
//! The timer hooks never touch the console.
//!
//! Array exports trust the caller: `getarray` stores through `a` for every
//! element the input supplies, and `putarray` reads `n` elements from `a`. A
//! null array pointer is treated as empty (input is still consumed).

use std::slice;

use libc::c_int;

use sylib_core::timer;

use crate::console::with_console;

abi_fn! {
    /// Read one decimal integer; `0` on malformed or missing input.
    fn getint() -> c_int {
        with_console(|rt| rt.read_int())
    }
}

abi_fn! {
    /// Read one raw byte; `0` at end of input.
    fn getch() -> c_int {
        with_console(|rt| rt.read_char())
    }
}

abi_fn! {
    /// Read one float token under the active text policy.
    fn getfloat() -> f32 {
        with_console(|rt| rt.read_float())
    }
}

abi_fn! {
    /// Read a count `n` then `n` integers into `a`; returns `n`.
    unsafe fn getarray(a: *mut c_int) -> c_int {
        with_console(|rt| {
            rt.read_int_array_with(|index, value| {
                if !a.is_null() {
                    // SAFETY: caller guarantees room for every supplied element.
                    *a.add(index) = value;
                }
            })
        })
    }
}

abi_fn! {
    /// Read a count `n` then `n` floats into `a`; returns `n`.
    unsafe fn getfarray(a: *mut f32) -> c_int {
        with_console(|rt| {
            rt.read_float_array_with(|index, value| {
                if !a.is_null() {
                    // SAFETY: caller guarantees room for every supplied element.
                    *a.add(index) = value;
                }
            })
        })
    }
}

abi_fn! {
    fn putint(a: c_int) {
        with_console(|rt| rt.write_int(a));
    }
}

abi_fn! {
    fn putch(a: c_int) {
        with_console(|rt| rt.write_char(a));
    }
}

abi_fn! {
    fn putfloat(a: f32) {
        with_console(|rt| rt.write_float(a));
    }
}

/// View `n` caller elements at `a`, or nothing for a null pointer or `n <= 0`.
///
/// # Safety
///
/// A non-null `a` must be valid for reads of `n` elements.
unsafe fn caller_slice<'a, T>(n: c_int, a: *const T) -> &'a [T] {
    match usize::try_from(n) {
        Ok(len) if len > 0 && !a.is_null() => unsafe { slice::from_raw_parts(a, len) },
        _ => &[],
    }
}

abi_fn! {
    /// Write `"n: a0 a1 ...\n"`.
    unsafe fn putarray(n: c_int, a: *const c_int) {
        let values = caller_slice(n, a);
        with_console(|rt| rt.write_int_array(n, values));
    }
}

abi_fn! {
    /// Write `"n: f0 f1 ...\n"` in the active float text policy.
    unsafe fn putfarray(n: c_int, a: *const f32) {
        let values = caller_slice(n, a);
        with_console(|rt| rt.write_float_array(n, values));
    }
}

abi_fn! {
    fn starttime() {
        timer::start_timer(None);
    }
}

abi_fn! {
    fn stoptime() {
        timer::stop_timer(None);
    }
}

abi_fn! {
    fn _sysy_starttime(lineno: c_int) {
        timer::start_timer(Some(lineno));
    }
}

abi_fn! {
    fn _sysy_stoptime(lineno: c_int) {
        timer::stop_timer(Some(lineno));
    }
}
