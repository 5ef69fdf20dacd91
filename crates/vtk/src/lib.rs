//! Range quantisation and VTK structured points export
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod quantize;

pub mod export;

// inline important modules for a nice public API
#[doc(inline)]
pub use quantize::{Quantizer, StoreBytes};

#[doc(inline)]
pub use export::{array_to_vtk, write_vtk, ArrayToVtk, ArrayToVtkBuilder, VtkFormat};

#[doc(inline)]
pub use error::{Error, Result};
