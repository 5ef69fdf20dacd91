//! Affine raster resampling and colormap compositing
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod colormap;
mod compositor;
mod error;
mod mapper;
mod raster;

pub mod render;

// inline important modules for a nice public API
#[doc(inline)]
pub use colormap::{Colormap, Rgba};

#[doc(inline)]
pub use compositor::{Compositor, MaskTracker, OverlayLayer, MASK_INDEX};

#[doc(inline)]
pub use mapper::{AffineMapper, ColumnSample, RowSample};

#[doc(inline)]
pub use raster::{encode_png, write_png, Pixels, Raster};

#[doc(inline)]
pub use render::{array_to_png, ArrayToRaster, ArrayToRasterBuilder};

#[doc(inline)]
pub use error::{Error, Result};
