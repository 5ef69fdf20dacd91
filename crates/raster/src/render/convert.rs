// crate modules
use crate::colormap::Colormap;
use crate::compositor::{Compositor, MaskTracker, OverlayLayer, MASK_INDEX};
use crate::error::Result;
use crate::mapper::AffineMapper;
use crate::raster::{Pixels, Raster};
use crate::render::ArrayToRasterBuilder;

// gridkit modules
use gridkit_array::{Array, ValueRange};
use gridkit_utils::{ShapeExt, ValueExt};

// external crates
use log::{debug, warn};

/// Render arrays of rank 2 or less into rasters
///
/// All of the logic for resampling a slice onto the output grid, looking up
/// colours, blending overlays and masking contours lives here.
///
/// The fields remain public for direct use, but for convenience and style
/// preference a builder pattern is also implemented and recommended.
///
/// # General properties
///
/// ## Geometry
///
/// The output size follows from the source extents and the scale factors,
/// with an optional skew that shears rows sideways. Transposing swaps the
/// roles of the two source axes.
///
/// ```rust
/// # use gridkit_raster::ArrayToRaster;
/// // Twice as tall, 30 degree skew, first axis across the image
/// let renderer = ArrayToRaster::builder()
///     .scale_x(2.0)
///     .skew_degrees(30.0)
///     .transpose(true)
///     .build();
/// ```
///
/// ## Value window
///
/// **By default the colour scale spans the full data range.**
///
/// Either bound can be fixed explicitly, and the window made symmetric about
/// zero for signed data. Asking for a minimum above the maximum inverts the
/// scale, as does the `invert` option.
///
/// ```rust
/// # use gridkit_raster::{ArrayToRaster, Colormap};
/// let renderer = ArrayToRaster::builder()
///     .min(-1.0)
///     .max(1.0)
///     .zero_center(true)
///     .colormap(Colormap::bluered())
///     .build();
/// ```
///
/// ## Masks and overlays
///
/// A mask array of the same shape as the data draws contours where it crosses
/// a threshold, which defaults to the middle of the mask range. An overlay
/// array is blended over the base colours through its own colormap and range.
///
/// Overlays need a continuous colour space, so they always give 24-bit
/// output even if `eight_bit` is set.
///
/// ```rust
/// # use gridkit_raster::ArrayToRaster;
/// # use gridkit_array::Array;
/// let data = Array::from_vec(vec![2, 2], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
/// let mask = Array::from_vec(vec![2, 2], vec![0.0, 0.0, 1.0, 1.0]).unwrap();
///
/// let renderer = ArrayToRaster::builder()
///     .eight_bit(true)
///     .mask_threshold(0.5)
///     .build();
///
/// let raster = renderer.render_layers(&data, Some(&mask), None).unwrap();
/// assert_eq!((raster.width, raster.height), (2, 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayToRaster {
    /// Swap the source axes
    pub transpose: bool,
    /// Skew angle in radians
    pub skew: f64,
    /// Output rows per source row
    pub scale_x: f64,
    /// Output columns per source column
    pub scale_y: f64,
    /// Value mapped to the start of the colormap
    pub min: Option<f64>,
    /// Value mapped to the end of the colormap
    pub max: Option<f64>,
    /// Make the value window symmetric about zero
    pub zero_center: bool,
    /// Run the colormap backwards
    pub invert: bool,
    /// Palette output rather than RGB
    pub eight_bit: bool,
    /// Colours of the data values
    pub colormap: Colormap,
    /// Contour level of the mask, defaults to the middle of the mask range
    pub mask_threshold: Option<f64>,
    /// Colours of the overlay values
    pub overlay_colormap: Colormap,
    /// Scale applied to the overlay alpha
    pub overlay_opacity: f64,
}

// Public API
impl ArrayToRaster {
    /// Start with the default configuration
    pub fn new() -> ArrayToRaster {
        Default::default()
    }

    /// Get an instance of the [ArrayToRasterBuilder]
    pub fn builder() -> ArrayToRasterBuilder {
        ArrayToRasterBuilder::default()
    }

    /// Render a single array with its own value window
    pub fn render(&self, data: &Array) -> Result<Raster> {
        self.render_layers(data, None, None)
    }

    /// Render an array with an optional contour mask and overlay
    pub fn render_layers(
        &self,
        data: &Array,
        mask: Option<&Array>,
        overlay: Option<&Array>,
    ) -> Result<Raster> {
        let range = self.resolve_range(data)?;
        self.render_with_range(data, &range, mask, overlay)
    }

    /// Value window for an array from the configured bounds and the data
    pub fn resolve_range(&self, data: &Array) -> Result<ValueRange> {
        Ok(ValueRange::resolve(
            data.range()?,
            self.min,
            self.max,
            self.zero_center,
            self.invert,
        ))
    }

    /// Render against a fixed value window
    ///
    /// Used when several arrays must share one colour scale, e.g. frames
    /// rendered after a [RangeAccumulator](gridkit_array::RangeAccumulator)
    /// pass.
    pub fn render_with_range(
        &self,
        data: &Array,
        range: &ValueRange,
        mask: Option<&Array>,
        overlay: Option<&Array>,
    ) -> Result<Raster> {
        let (nx, ny) = AffineMapper::source_extents(data)?;
        let mapper = AffineMapper::new(
            nx,
            ny,
            self.transpose,
            self.skew,
            self.scale_x,
            self.scale_y,
        )?;

        debug!(
            "Rendering {} array as {}x{} raster",
            data.dims().shape_string(),
            mapper.width(),
            mapper.height()
        );

        let eight_bit = self.eight_bit && overlay.is_none();
        if self.eight_bit && !eight_bit {
            warn!("Warning: Overlays need 24-bit colour, ignoring 8-bit output");
        }

        let count = mapper
            .width()
            .checked_mul(mapper.height())
            .ok_or(gridkit_array::Error::OutOfMemory)?;
        let mut pixels = RasterPixels::new(eight_bit, count)?;

        let mut tracker = match mask {
            Some(mask) => Some(self.mask_tracker(data, mask, mapper.width())?),
            None => None,
        };

        let mut compositor = Compositor::new(self.colormap.clone(), *range);
        let overlay = match overlay {
            Some(array) => {
                let layer = self.overlay_layer(array)?;
                compositor = compositor.with_overlay(layer);
                let (ox, oy) = AffineMapper::source_extents(array)?;
                let overlay_mapper = AffineMapper::with_output(
                    ox,
                    oy,
                    self.transpose,
                    self.skew,
                    mapper.height(),
                    mapper.width(),
                )?;
                Some((array, overlay_mapper))
            }
            None => None,
        };

        for r in 0..mapper.height() {
            let row = mapper.row(r);
            let overlay_row = overlay.as_ref().map(|(_, m)| m.row(r));

            for c in 0..mapper.width() {
                let column = mapper.column(&row, c);

                if let (Some(tracker), Some(mask)) = (tracker.as_mut(), mask) {
                    let level = mapper.sample(mask.data(), &row, &column);
                    if tracker.crossed(c, level) {
                        pixels.push_mask(&compositor);
                        continue;
                    }
                }

                let value = range.clamp(mapper.sample(data.data(), &row, &column));

                let overlay_value = match (&overlay, &overlay_row) {
                    (Some((array, overlay_mapper)), Some(overlay_row)) => {
                        let column = overlay_mapper.column(overlay_row, c);
                        Some(overlay_mapper.sample(array.data(), overlay_row, &column))
                    }
                    _ => None,
                };

                pixels.push(&compositor, value, overlay_value);
            }
        }

        Raster::new(mapper.width(), mapper.height(), pixels.finish(&compositor))
    }
}

impl Default for ArrayToRaster {
    fn default() -> Self {
        ArrayToRasterBuilder::default().build()
    }
}

/// Layer set up
impl ArrayToRaster {
    /// Mask tracker for a mask conformant with the data
    fn mask_tracker(&self, data: &Array, mask: &Array, width: usize) -> Result<MaskTracker> {
        data.check_conformant(mask)?;

        let threshold = match self.mask_threshold {
            Some(threshold) => threshold,
            None => {
                let (min, max) = mask.range()?;
                (min + max) * 0.5
            }
        };

        debug!("Masking contours at {}", threshold.sci(3));
        Ok(MaskTracker::new(width, threshold))
    }

    /// Overlay colours over the full overlay data range
    fn overlay_layer(&self, overlay: &Array) -> Result<OverlayLayer> {
        let (min, max) = overlay.range()?;
        Ok(OverlayLayer {
            colormap: self.overlay_colormap.clone(),
            range: ValueRange::new(min, max),
            opacity: self.overlay_opacity.clamp_between(0.0, 1.0),
        })
    }
}

/// Pixel buffer in either output mode
enum RasterPixels {
    Indexed(Vec<u8>),
    Rgb(Vec<u8>),
}

impl RasterPixels {
    fn new(eight_bit: bool, count: usize) -> Result<Self> {
        let channels = match eight_bit {
            true => Some(count),
            false => count.checked_mul(3),
        }
        .ok_or(gridkit_array::Error::OutOfMemory)?;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(channels)
            .map_err(|_| gridkit_array::Error::OutOfMemory)?;

        Ok(match eight_bit {
            true => Self::Indexed(buffer),
            false => Self::Rgb(buffer),
        })
    }

    fn push(&mut self, compositor: &Compositor, value: f64, overlay: Option<f64>) {
        match self {
            Self::Indexed(indices) => indices.push(compositor.index(value)),
            Self::Rgb(channels) => {
                channels.extend(compositor.color(value, overlay).to_rgb8());
            }
        }
    }

    fn push_mask(&mut self, compositor: &Compositor) {
        match self {
            Self::Indexed(indices) => indices.push(MASK_INDEX),
            Self::Rgb(channels) => channels.extend(compositor.mask_color().to_rgb8()),
        }
    }

    fn finish(self, compositor: &Compositor) -> Pixels {
        match self {
            Self::Indexed(indices) => Pixels::Indexed {
                palette: compositor.palette(),
                indices,
            },
            Self::Rgb(channels) => Pixels::Rgb(channels),
        }
    }
}
