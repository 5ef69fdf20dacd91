//! Turning resampled values into pixel colours
//!
//! A [Compositor] holds everything needed to colour a pixel: the base
//! colormap and value window, an optional overlay layer, and the colour used
//! for masked pixels. Contour masking is tracked separately by a
//! [MaskTracker] since it carries state from one output row to the next.

// crate modules
use crate::colormap::{Colormap, Rgba};

// gridkit modules
use gridkit_array::ValueRange;

/// Palette index reserved for masked pixels
pub const MASK_INDEX: u8 = 255;

/// Highest palette index available to the colormap
const PALETTE_TOP: f64 = 254.0;

/// Second layer blended over the base colours
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    /// Colours of the overlay values, alpha gives the coverage
    pub colormap: Colormap,
    /// Value window of the overlay data
    pub range: ValueRange,
    /// Scale applied to the colormap alpha, within `[0, 1]`
    pub opacity: f64,
}

/// Colours individual pixels
///
/// The base colour of a value is looked up in the colormap over the value
/// window, ignoring the colormap alpha. An overlay colour is then composited
/// on top with coverage `alpha * opacity`.
///
/// ```rust
/// # use gridkit_raster::{Colormap, Compositor, OverlayLayer, Rgba};
/// # use gridkit_array::ValueRange;
/// let overlay = OverlayLayer {
///     colormap: Colormap::yellow(),
///     range: ValueRange::new(0.0, 1.0),
///     opacity: 0.5,
/// };
///
/// let compositor = Compositor::new(Colormap::gray(), ValueRange::new(0.0, 1.0))
///     .with_overlay(overlay);
///
/// // white base, half covered by opaque yellow
/// let color = compositor.color(0.0, Some(1.0));
/// assert_eq!(color.to_rgb8(), [255, 255, 128]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Compositor {
    colormap: Colormap,
    range: ValueRange,
    overlay: Option<OverlayLayer>,
    mask_color: Rgba,
}

impl Compositor {
    /// Compositor for a single layer, with the mask colour picked to suit the
    /// colormap
    pub fn new(colormap: Colormap, range: ValueRange) -> Self {
        let mask_color = colormap.mask_color();
        Self {
            colormap,
            range,
            overlay: None,
            mask_color,
        }
    }

    /// Add an overlay layer
    pub fn with_overlay(mut self, overlay: OverlayLayer) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Colour used for masked pixels
    pub fn mask_color(&self) -> Rgba {
        self.mask_color
    }

    /// Value window of the base layer
    pub fn range(&self) -> &ValueRange {
        &self.range
    }

    /// Overlay layer, if any
    pub fn overlay(&self) -> Option<&OverlayLayer> {
        self.overlay.as_ref()
    }

    /// Opaque colour of a base value
    pub fn base_color(&self, value: f64) -> Rgba {
        let color = self.colormap.lookup(value, &self.range);
        Rgba { a: 1.0, ..color }
    }

    /// Final colour of a pixel given the base value and optional overlay
    /// value at the same pixel
    pub fn color(&self, value: f64, overlay_value: Option<f64>) -> Rgba {
        let base = self.base_color(value);
        match (&self.overlay, overlay_value) {
            (Some(layer), Some(v)) => {
                let color = layer.colormap.lookup(v, &layer.range);
                color.over(&base, color.a * layer.opacity)
            }
            _ => base,
        }
    }

    /// Palette index of a base value, `0..=254`
    ///
    /// Inverted windows count down from the top of the palette, so the index
    /// is `254 - trunc(t * 254)` rather than `trunc((1 - t) * 254)`.
    pub fn index(&self, value: f64) -> u8 {
        let forward = ValueRange {
            invert: false,
            ..self.range
        };
        // truncation, not rounding
        let level = (forward.normalize(value) * PALETTE_TOP) as u8;
        match self.range.invert {
            true => PALETTE_TOP as u8 - level,
            false => level,
        }
    }

    /// 256 entry palette, the colormap resampled at 255 evenly spaced points
    /// with the last entry reserved for the mask colour
    pub fn palette(&self) -> Vec<[u8; 3]> {
        let mut palette = (0..=PALETTE_TOP as usize)
            .map(|i| self.colormap.sample(i as f64 / PALETTE_TOP).to_rgb8())
            .collect::<Vec<[u8; 3]>>();
        palette.push(self.mask_color.to_rgb8());
        palette
    }
}

/// Contour crossing test over the interpolation stencil
///
/// Each interpolated mask value is compared with the value to its left and
/// the value directly above it in the previous output row. A pixel is masked
/// when the threshold lies within the span of those three values.
///
/// Only crossings visible to this stencil are found, so a crossing that runs
/// diagonally between pixels can be missed.
///
/// ```rust
/// # use gridkit_raster::MaskTracker;
/// let mut tracker = MaskTracker::new(3, 0.5);
/// let crossed = [0.0, 0.2, 0.9]
///     .iter()
///     .enumerate()
///     .map(|(column, v)| tracker.crossed(column, *v))
///     .collect::<Vec<bool>>();
/// assert_eq!(crossed, vec![false, false, true]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MaskTracker {
    previous: Vec<f64>,
    threshold: f64,
}

impl MaskTracker {
    /// Tracker for rows of `width` pixels
    pub fn new(width: usize, threshold: f64) -> Self {
        Self {
            previous: vec![f64::NAN; width],
            threshold,
        }
    }

    /// Threshold the mask values are tested against
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Record the mask value at a column and test for a crossing
    ///
    /// Columns must be visited left to right within each row. Nothing is
    /// recorded above the first row, so only the left neighbour counts there.
    pub fn crossed(&mut self, column: usize, value: f64) -> bool {
        let left = match column {
            0 => value,
            c => self.previous[c - 1],
        };
        let above = self.previous[column];
        self.previous[column] = value;

        // f64::min and f64::max skip the NaN entries of the first row
        let min = value.min(left).min(above);
        let max = value.max(left).max(above);
        min <= self.threshold && max >= self.threshold
    }
}
