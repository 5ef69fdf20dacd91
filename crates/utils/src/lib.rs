//! Common utility for extended `std` types
//!
//! These are left public for convenience.
//!
//! For example, shape bookkeeping and prettier formatting for scientific
//! numbers are useful in every gridkit crate.

// Alias for the format! macro
pub use std::format as f;

// Modules
mod shape_ext;
mod string_ext;
mod value_ext;

// Flatten
pub use shape_ext::ShapeExt;
pub use string_ext::StringExt;
pub use value_ext::ValueExt;
