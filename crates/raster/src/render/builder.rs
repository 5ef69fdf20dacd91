// crate modules
use crate::colormap::Colormap;
use crate::render::ArrayToRaster;

// external crates
use log::warn;

/// Builder implementation for ArrayToRaster configuration
///
/// The fields of [ArrayToRaster] are left public for direct use but the module
/// also implements a builder.
///
/// The builder allows for chained setter calls, and any number of parameters
/// can be set this way (including none).
///
/// To get the final [ArrayToRaster] from the builder, call
/// [build()](ArrayToRasterBuilder::build).
///
/// ```rust, no_run
/// # use gridkit_raster::{write_png, ArrayToRaster, Colormap};
/// # use gridkit_array::{read, SliceDirectives};
/// let plane = read("fields.npz", Some("ez"), &SliceDirectives::new().z(0)).unwrap();
///
/// // Make a new builder, change some values
/// let renderer = ArrayToRaster::builder()
///     .scale(4.0)
///     .zero_center(true)
///     .colormap(Colormap::bluered())
///     .build();
///
/// // Render the plane and write it out
/// let raster = renderer.render(&plane).unwrap();
/// write_png(&raster, "ez.png").unwrap();
/// ```
pub struct ArrayToRasterBuilder {
    transpose: bool,
    skew: f64,
    scale_x: f64,
    scale_y: f64,
    min: Option<f64>,
    max: Option<f64>,
    zero_center: bool,
    invert: bool,
    eight_bit: bool,
    colormap: Colormap,
    mask_threshold: Option<f64>,
    overlay_colormap: Colormap,
    overlay_opacity: f64,
}

impl ArrayToRasterBuilder {
    /// Create a new instance of the builder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [ArrayToRaster] type
    pub fn build(self) -> ArrayToRaster {
        ArrayToRaster {
            transpose: self.transpose,
            skew: self.skew,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            min: self.min,
            max: self.max,
            zero_center: self.zero_center,
            invert: self.invert,
            eight_bit: self.eight_bit,
            colormap: self.colormap,
            mask_threshold: self.mask_threshold,
            overlay_colormap: self.overlay_colormap,
            overlay_opacity: self.overlay_opacity,
        }
    }

    /// Swap the source axes so the second axis runs down the image
    pub fn transpose(mut self, transpose: bool) -> Self {
        self.transpose = transpose;
        self
    }

    /// Skew angle in radians
    ///
    /// Positive and negative angles shear the rows in opposite directions.
    pub fn skew(mut self, radians: f64) -> Self {
        self.skew = radians;
        self
    }

    /// Skew angle in degrees, see [skew()](ArrayToRasterBuilder::skew)
    pub fn skew_degrees(mut self, degrees: f64) -> Self {
        self.skew = degrees.to_radians();
        self
    }

    /// Output rows per source row
    pub fn scale_x(mut self, scale: f64) -> Self {
        self.scale_x = scale;
        self
    }

    /// Output columns per source column
    pub fn scale_y(mut self, scale: f64) -> Self {
        self.scale_y = scale;
        self
    }

    /// Same scale factor for both axes
    pub fn scale(self, scale: f64) -> Self {
        self.scale_x(scale).scale_y(scale)
    }

    /// Value mapped to the start of the colormap
    ///
    /// Defaults to the data minimum.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Value mapped to the end of the colormap
    ///
    /// Defaults to the data maximum.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Make the value window symmetric about zero
    pub fn zero_center(mut self, zero_center: bool) -> Self {
        self.zero_center = zero_center;
        self
    }

    /// Run the colormap backwards
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Palette output with 255 colormap entries and one mask colour
    ///
    /// Ignored when rendering with an overlay.
    pub fn eight_bit(mut self, eight_bit: bool) -> Self {
        self.eight_bit = eight_bit;
        self
    }

    /// Colours of the data values, white to black by default
    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    /// Contour level of the mask
    ///
    /// Defaults to the middle of the mask data range.
    pub fn mask_threshold(mut self, threshold: f64) -> Self {
        self.mask_threshold = Some(threshold);
        self
    }

    /// Colours of the overlay values, transparent white to yellow by default
    pub fn overlay_colormap(mut self, colormap: Colormap) -> Self {
        self.overlay_colormap = colormap;
        self
    }

    /// Scale applied to the overlay alpha, clamped to `[0, 1]`
    pub fn overlay_opacity(mut self, opacity: f64) -> Self {
        if !(0.0..=1.0).contains(&opacity) {
            warn!("Warning: Overlay opacity {opacity} clamped to [0, 1]");
        }
        self.overlay_opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

impl Default for ArrayToRasterBuilder {
    fn default() -> Self {
        Self {
            transpose: false,
            skew: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            min: None,
            max: None,
            zero_center: false,
            invert: false,
            eight_bit: false,
            colormap: Colormap::gray(),
            mask_threshold: None,
            overlay_colormap: Colormap::yellow(),
            overlay_opacity: 1.0,
        }
    }
}
