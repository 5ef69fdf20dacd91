//! Rendering arrays into rasters
//!
//! [ArrayToRaster] holds the rendering options and does the work, with
//! [ArrayToRasterBuilder] for chained configuration.

mod builder;
mod convert;

#[doc(inline)]
pub use builder::ArrayToRasterBuilder;

#[doc(inline)]
pub use convert::ArrayToRaster;

// standard library
use std::path::Path;

// crate modules
use crate::error::Result;
use crate::raster::write_png;

// gridkit modules
use gridkit_array::Array;

/// Render an array with default options and write it to a PNG file
///
/// ```rust, no_run
/// # use gridkit_raster::array_to_png;
/// # use gridkit_array::Array;
/// let data = Array::from_vec(vec![2, 2], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
/// array_to_png(&data, "data.png").unwrap();
/// ```
pub fn array_to_png<P: AsRef<Path>>(array: &Array, path: P) -> Result<()> {
    let raster = ArrayToRaster::default().render(array)?;
    write_png(&raster, path)
}
