//! Console I/O conversions.
//!
//! Formatted output (`printf`), token input (`scanf`), and the `n: a0 a1`
//! array line layout shared by the array writers.

pub mod array;
pub mod printf;
pub mod scanf;

pub use array::{render_float_array, render_int_array};
pub use printf::{FormatArg, render_format};
pub use scanf::{ScanError, Scanner};
