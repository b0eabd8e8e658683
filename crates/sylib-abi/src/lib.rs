#![cfg_attr(feature = "c-variadic", feature(c_variadic))]
// Exports take raw pointers straight from generated C code; the pointer
// contract is the one documented in `include/sylib.h`.
#![allow(clippy::missing_safety_doc)]
//! # sylib-abi
//!
//! `extern "C"` boundary for the sylib console runtime.
//!
//! Produces `libsylib.so` / `libsylib.a` exporting the names generated
//! programs link against (`getint`, `putarray`, `putf`, ...). Every export
//! forwards into one process-wide [`sylib_core::Runtime`] reading fd 0 and
//! writing fd 1.
//!
//! ```text
//! generated code -> export (this crate) -> console lock -> Runtime -> fd 0 / fd 1
//! ```
//!
//! `putf` is C-variadic and only exported with the `c-variadic` feature,
//! which needs a nightly toolchain.

#[macro_use]
mod macros;

pub mod console;
pub mod fd;
pub mod io_abi;
#[cfg(feature = "c-variadic")]
pub mod putf_abi;
pub mod va;
