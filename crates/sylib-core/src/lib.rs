//! # sylib-core
//!
//! Safe Rust implementation of the sylib console I/O runtime: the helper
//! functions generated programs call to read and write integers, characters,
//! floats, and arrays.
//!
//! No `unsafe` code is permitted at the crate level. The raw-pointer C boundary
//! lives in `sylib-abi`, which forwards into [`runtime::Runtime`].

#![deny(unsafe_code)]

pub mod config;
pub mod float_text;
pub mod runtime;
pub mod stdio;
pub mod timer;

pub use config::{FloatTextPolicy, float_text_policy};
pub use runtime::Runtime;
pub use stdio::printf::FormatArg;
pub use stdio::scanf::{ScanError, Scanner};
