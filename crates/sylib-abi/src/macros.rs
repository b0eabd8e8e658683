//! Helper macros for export generation.
//!
//! `abi_fn!` expands to `#[unsafe(no_mangle)] pub extern "C" fn` items so every
//! export is declared the same way. Prefix the signature with `unsafe` for
//! exports that dereference caller pointers.

/// Generate an exported `extern "C"` function.
///
/// ```ignore
/// abi_fn! {
///     /// Doc comment.
///     fn name(arg: c_int) -> c_int { body }
/// }
/// abi_fn! {
///     unsafe fn name(ptr: *mut c_int) -> c_int { body }
/// }
/// ```
macro_rules! abi_fn {
    (
        $(#[$meta:meta])*
        unsafe fn $name:ident( $($arg:ident : $argty:ty),* $(,)? ) $(-> $ret:ty)?
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name( $($arg : $argty),* ) $(-> $ret)? {
            unsafe { $body }
        }
    };

    (
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? ) $(-> $ret:ty)?
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        pub extern "C" fn $name( $($arg : $argty),* ) $(-> $ret)? $body
    };
}
