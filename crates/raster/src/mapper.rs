//! Affine mapping from output pixels back to source samples
//!
//! The output grid size comes from the source extents and the scale, skew
//! and transpose settings. Every output pixel is then mapped back onto a
//! fractional source coordinate and sampled bilinearly from the 2x2 block of
//! source values around it.

// crate modules
use crate::error::{Error, Result};

// gridkit modules
use gridkit_array::Array;
use gridkit_utils::{f, ValueExt};

// external crates
use log::debug;

/// Source rows feeding one output row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSample {
    /// Nearest source row
    pub n: usize,
    /// Neighbouring source row on the side of the fractional offset
    pub n2: usize,
    /// Weight of row `n`, row `n2` gets the remainder
    pub weight: f64,
    /// Horizontal shift of this row from the skew
    pub offset: f64,
}

/// Source columns feeding one output pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSample {
    /// Nearest source column
    pub m: usize,
    /// Neighbouring source column on the side of the fractional offset
    pub m2: usize,
    /// Weight of column `m`, column `m2` gets the remainder
    pub weight: f64,
}

/// Maps an output pixel grid onto a 2D source array
///
/// The source is `nx` by `ny` in row-major order. Without transposition the
/// first axis runs down the output rows. With it the second axis does.
///
/// Output extents are
///
/// ```text
/// height = max(1, source_height * scale_x * cos(skew))
/// width  = max(1, source_width  * scale_y * (1 + |sin(skew)|))
/// ```
///
/// and the scale factors actually used are recomputed as the ratio of source
/// to output extents, so that truncation of the output size never leaves the
/// forward and inverse maps out of step.
///
/// ```rust
/// # use gridkit_raster::AffineMapper;
/// let mapper = AffineMapper::new(10, 20, false, 0.0, 2.0, 1.0).unwrap();
/// assert_eq!((mapper.height(), mapper.width()), (20, 20));
///
/// let transposed = AffineMapper::new(10, 20, true, 0.0, 2.0, 1.0).unwrap();
/// assert_eq!((transposed.height(), transposed.width()), (40, 10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AffineMapper {
    nx: usize,
    ny: usize,
    transpose: bool,
    source_height: usize,
    source_width: usize,
    height: usize,
    width: usize,
    scale_x: f64,
    scale_y: f64,
    skew_sin: f64,
}

impl AffineMapper {
    /// Derive the output size from the scale factors and skew in radians
    pub fn new(
        nx: usize,
        ny: usize,
        transpose: bool,
        skew: f64,
        scale_x: f64,
        scale_y: f64,
    ) -> Result<Self> {
        if !(scale_x > 0.0 && scale_y > 0.0) {
            return Err(Error::InvalidOptions(
                "scale factors must be positive".to_string(),
            ));
        }

        let (source_height, source_width) = if transpose { (ny, nx) } else { (nx, ny) };
        let shear = 1.0 + skew.sin().abs();

        let height = output_extent(source_height as f64 * scale_x * skew.cos())?;
        let width = output_extent(source_width as f64 * scale_y * shear)?;

        Self::with_output(nx, ny, transpose, skew, height, width)
    }

    /// Map a source onto an already known output size
    ///
    /// Used for layers that must line up with another raster, e.g. overlays
    /// with different source extents.
    pub fn with_output(
        nx: usize,
        ny: usize,
        transpose: bool,
        skew: f64,
        height: usize,
        width: usize,
    ) -> Result<Self> {
        if nx == 0 || ny == 0 || height == 0 || width == 0 {
            return Err(Error::InvalidOptions(
                "raster extents must be non-zero".to_string(),
            ));
        }

        // every pixel must fit an rgb buffer
        height
            .checked_mul(width)
            .and_then(|count| count.checked_mul(3))
            .ok_or(gridkit_array::Error::OutOfMemory)?;

        let (source_height, source_width) = if transpose { (ny, nx) } else { (nx, ny) };
        let skew_sin = skew.sin();

        let mapper = Self {
            nx,
            ny,
            transpose,
            source_height,
            source_width,
            height,
            width,
            scale_x: source_height as f64 / height as f64,
            scale_y: (1.0 + skew_sin.abs()) * source_width as f64 / width as f64,
            skew_sin,
        };

        debug!(
            "Mapping {}x{} source onto {}x{} pixels (scales {}, {})",
            source_height,
            source_width,
            height,
            width,
            mapper.scale_x.sci(3),
            mapper.scale_y.sci(3)
        );

        Ok(mapper)
    }

    /// Source extents `(nx, ny)` for an array of rank 0 to 2
    ///
    /// A rank 1 array is a single column and a scalar is a single pixel.
    pub fn source_extents(array: &Array) -> Result<(usize, usize)> {
        match array.dims() {
            [] => Ok((1, 1)),
            [nx] => Ok((*nx, 1)),
            [nx, ny] => Ok((*nx, *ny)),
            dims => Err(Error::InvalidRasterRank(dims.len())),
        }
    }

    /// Number of output rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of output columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Effective source rows per output row
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    /// Effective source columns per output column, including shear
    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Source rows, weight and skew offset for an output row
    pub fn row(&self, row: usize) -> RowSample {
        let x = row as f64 * self.scale_x;
        let (n, n2, weight) = neighbours(x, self.source_height);

        let offset = if self.skew_sin < 0.0 {
            x * self.skew_sin
        } else {
            (x - (self.height - 1) as f64 * self.scale_x) * self.skew_sin
        };

        RowSample {
            n,
            n2,
            weight,
            offset,
        }
    }

    /// Source columns and weight for an output column within a row
    pub fn column(&self, row: &RowSample, column: usize) -> ColumnSample {
        let y = column as f64 * self.scale_y + row.offset;
        let (m, m2, weight) = neighbours(y, self.source_width);
        ColumnSample { m, m2, weight }
    }

    /// Bilinear sample of `data` at an output pixel
    ///
    /// `data` must hold the `nx * ny` source values in row-major order.
    pub fn sample(&self, data: &[f64], row: &RowSample, column: &ColumnSample) -> f64 {
        let at = |n: usize, m: usize| self.value(data, n, m);
        let w = column.weight;

        let near = at(row.n, column.m) * w + at(row.n, column.m2) * (1.0 - w);
        let far = at(row.n2, column.m) * w + at(row.n2, column.m2) * (1.0 - w);
        near * row.weight + far * (1.0 - row.weight)
    }

    /// Source value at output orientation row `n`, column `m`
    fn value(&self, data: &[f64], n: usize, m: usize) -> f64 {
        let index = if self.transpose {
            m * self.ny + n
        } else {
            n * self.ny + m
        };
        data[index]
    }

    /// Check a buffer has the source extents this mapper was built for
    pub fn check_source(&self, data: &[f64]) -> Result<()> {
        if data.len() == self.nx * self.ny {
            Ok(())
        } else {
            Err(Error::Array(gridkit_array::Error::NotConformant {
                expected: vec![self.nx, self.ny],
                found: vec![data.len()],
            }))
        }
    }
}

/// Output extent from its floating point size, truncated towards zero
fn output_extent(size: f64) -> Result<usize> {
    let size = size.max(1.0);
    if !size.is_finite() || size >= usize::MAX as f64 {
        return Err(Error::InvalidOptions(f!(
            "output size of {} pixels is too large",
            size.sci(3)
        )));
    }
    Ok(size as usize)
}

/// Nearest index, neighbour index and nearest weight along one axis
///
/// The nearest index is `floor(coord + 0.5)` clamped to the axis, and the
/// neighbour is one step towards the coordinate, also clamped.
fn neighbours(coord: f64, extent: usize) -> (usize, usize, f64) {
    let last = extent.saturating_sub(1);
    let n = (coord + 0.5).floor().clamp_between(0.0, last as f64) as usize;
    let delta = coord - n as f64;

    let n2 = if delta > 0.0 {
        (n + 1).min(last)
    } else if delta < 0.0 {
        n.saturating_sub(1)
    } else {
        n
    };

    (n, n2, 1.0 - delta.abs())
}
