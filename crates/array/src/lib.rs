//! N-dimensional arrays, slicing and array containers
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod array;
mod error;
mod range;
mod slice;
mod text;

pub mod container;

// inline important modules for a nice public API
#[doc(inline)]
pub use array::{Array, Samples};

#[doc(inline)]
pub use slice::{select, Hyperslab, SliceAxis, SliceDirective, SliceDirectives};

#[doc(inline)]
pub use container::{
    extract, read, read_rank, read_shape, write, ContainerRead, ContainerWrite, MemoryContainer,
    NpzFile,
};

#[doc(inline)]
pub use range::{global_range, AutoRange, RangeAccumulator, ValueRange};

#[doc(inline)]
pub use text::{read_text, read_text_file, write_text, write_text_file};

#[doc(inline)]
pub use error::{Error, Result};
