//! Value ranges shared by the raster and mesh paths
//!
//! Every output format maps data values onto a fixed window, whether that is
//! a colormap or an integer quantisation. The window is either taken from
//! the data, overridden explicitly, derived heuristically with [AutoRange], or
//! accumulated over many inputs with a [RangeAccumulator].

// crate modules
use crate::error::{Error, Result};
use crate::Array;

// gridkit modules
use gridkit_utils::ValueExt;

// external crates
use log::{debug, warn};

/// Data values below this fraction of the current range are ignored by the
/// [AutoRange] heuristic, i.e. anything that would render as pure white
const WHITE_EPSILON: f64 = 1.0 / 255.0;

/// Resolved value window mapped onto an output scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    /// Value mapped to the bottom of the scale
    pub min: f64,
    /// Value mapped to the top of the scale
    pub max: f64,
    /// Flip the scale so `min` maps to the top
    pub invert: bool,
}

impl ValueRange {
    /// Plain window with no inversion
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            invert: false,
        }
    }

    /// Window of `[-r, r]`
    pub fn symmetric(r: f64) -> Self {
        Self::new(-r.abs(), r.abs())
    }

    /// Resolve the final window from the data range and user choices
    ///
    /// Explicit bounds override the data range. If the result is reversed
    /// the bounds are swapped and the inversion toggled, so asking for
    /// `min > max` is another way of asking for an inverted scale. With
    /// `zero_center` the window becomes symmetric about zero using the larger
    /// magnitude bound.
    ///
    /// ```rust
    /// # use gridkit_array::ValueRange;
    /// let range = ValueRange::resolve((0.0, 1.0), Some(3.0), None, false, false);
    /// assert_eq!((range.min, range.max, range.invert), (1.0, 3.0, true));
    ///
    /// let range = ValueRange::resolve((-1.0, 4.0), None, None, true, false);
    /// assert_eq!((range.min, range.max), (-4.0, 4.0));
    /// ```
    pub fn resolve(
        data: (f64, f64),
        min: Option<f64>,
        max: Option<f64>,
        zero_center: bool,
        invert: bool,
    ) -> Self {
        let mut range = Self {
            min: min.unwrap_or(data.0),
            max: max.unwrap_or(data.1),
            invert,
        };

        if range.min > range.max {
            std::mem::swap(&mut range.min, &mut range.max);
            range.invert = !range.invert;
        }

        if zero_center {
            let r = range.max.abs().max(range.min.abs());
            range.min = -r;
            range.max = r;
        }

        if range.width() == 0.0 {
            warn!(
                "Warning: Degenerate value range at {}, all values map to the bottom of the scale",
                range.min.sci(3)
            );
        }

        debug!("Value range {} to {}", range.min.sci(3), range.max.sci(3));
        range
    }

    /// Distance between the bounds
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Clamp a value into the window
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp_between(self.min, self.max)
    }

    /// Fractional position of a value in the window, clamped to `[0, 1]`
    ///
    /// Inversion is applied, and a degenerate window maps everything to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let width = self.width();
        let t = if width > 0.0 {
            ((value - self.min) / width).clamp_between(0.0, 1.0)
        } else {
            0.0
        };

        if self.invert {
            1.0 - t
        } else {
            t
        }
    }
}

/// Heuristic symmetric range that only ever grows
///
/// For each dataset a candidate `r' = min(max|x|, 5·rms)` is computed, where
/// the RMS only includes values with `|x| >= r/255` for the current range
/// `r`. The range becomes `max(r, r')`, so a sequence of frames rendered with
/// the same accumulator never shrinks its colour scale.
///
/// The state is an explicit value owned by the caller.
///
/// ```rust
/// # use gridkit_array::AutoRange;
/// let mut auto = AutoRange::new();
/// let range = auto.update(&[1.0, -2.0, 0.5]);
/// assert_eq!((range.min, range.max), (-2.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AutoRange {
    range: f64,
}

impl AutoRange {
    /// Fresh accumulator with a zero range
    pub fn new() -> Self {
        Self::default()
    }

    /// Current half-width of the symmetric range
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Fold in a dataset and return the updated window `[-r, r]`
    pub fn update(&mut self, data: &[f64]) -> ValueRange {
        let mut sum = 0.0;
        let mut count = 0_usize;
        let mut max = -1.0_f64;

        for value in data.iter().map(|v| v.abs()) {
            if value >= WHITE_EPSILON * self.range {
                sum += value * value;
                count += 1;
            }
            max = max.max(value);
        }

        if count > 0 {
            let candidate = (5.0 * (sum / count as f64).sqrt()).min(max);
            if candidate > self.range {
                self.range = candidate;
            }
        }

        ValueRange::symmetric(self.range)
    }
}

/// Running minimum and maximum over any number of arrays
///
/// Used for the two pass mode where several inputs must share one scale:
/// every input is read once to accumulate the range, then read again to
/// render with it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeAccumulator {
    bounds: Option<(f64, f64)>,
}

impl RangeAccumulator {
    /// Accumulator that has seen nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the bounds to cover an array
    ///
    /// Empty arrays are an error, just as for [Array::range()].
    pub fn include(&mut self, array: &Array) -> Result<()> {
        self.include_range(array.range()?);
        Ok(())
    }

    /// Widen the bounds to cover an already known range
    pub fn include_range(&mut self, (min, max): (f64, f64)) {
        self.bounds = Some(match self.bounds {
            Some((lo, hi)) => (lo.min(min), hi.max(max)),
            None => (min, max),
        });
    }

    /// Bounds so far, if anything has been included
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }

    /// Final bounds, or [Error::EmptyArray] if nothing was included
    pub fn finish(self) -> Result<(f64, f64)> {
        self.bounds.ok_or(Error::EmptyArray)
    }
}

/// First pass of the two pass mode
///
/// Loads every source with `load` and returns the range over all of them.
/// The first failure is returned as is. Nothing guards against a source
/// changing between this pass and the caller's rendering pass.
///
/// ```rust
/// # use gridkit_array::{global_range, Array};
/// let frames = vec![vec![0.0, 2.0], vec![-1.0, 1.0]];
/// let range = global_range(frames, |data| Array::from_vec(vec![2], data)).unwrap();
/// assert_eq!(range, (-1.0, 2.0));
/// ```
pub fn global_range<I, F>(sources: I, mut load: F) -> Result<(f64, f64)>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Result<Array>,
{
    let mut accumulator = RangeAccumulator::new();
    for source in sources {
        accumulator.include(&load(source)?)?;
    }
    accumulator.finish()
}

#[cfg(test)]
mod range_tests {
    use super::*;

    #[test]
    fn resolve_from_data() {
        let range = ValueRange::resolve((-1.0, 2.0), None, None, false, false);
        assert_eq!(range, ValueRange::new(-1.0, 2.0));
    }

    #[test]
    fn resolve_reversed_toggles_invert() {
        let range = ValueRange::resolve((0.0, 1.0), Some(5.0), Some(1.0), false, true);
        assert_eq!((range.min, range.max), (1.0, 5.0));
        assert!(!range.invert);
    }

    #[test]
    fn normalize_clamps_and_inverts() {
        let mut range = ValueRange::new(0.0, 4.0);
        assert_eq!(range.normalize(1.0), 0.25);
        assert_eq!(range.normalize(-3.0), 0.0);
        assert_eq!(range.normalize(9.0), 1.0);

        range.invert = true;
        assert_eq!(range.normalize(1.0), 0.75);
        assert_eq!(ValueRange::new(2.0, 2.0).normalize(7.0), 0.0);
    }

    #[test]
    fn auto_range_grows_only() {
        let mut auto = AutoRange::new();
        // rms of [3, 4] is sqrt(12.5), five times that exceeds max |x|
        assert_eq!(auto.update(&[3.0, -4.0]).max, 4.0);
        // a quieter frame cannot shrink the range
        assert_eq!(auto.update(&[0.1, 0.2]).max, 4.0);
        assert_eq!(auto.range(), 4.0);
    }

    #[test]
    fn auto_range_uses_rms() {
        let mut auto = AutoRange::new();
        let mut data = vec![1.0; 99];
        data.push(100.0);
        // rms is ~10.05, so the outlier is not allowed to set the scale
        let range = auto.update(&data);
        let rms = ((99.0 + 10000.0) / 100.0_f64).sqrt();
        assert!((range.max - 5.0 * rms).abs() < 1e-12);
    }

    #[test]
    fn accumulator_bounds() {
        let mut accumulator = RangeAccumulator::new();
        assert!(accumulator.finish().is_err());

        accumulator.include_range((0.0, 1.0));
        accumulator
            .include(&Array::from_vec(vec![2], vec![-3.0, 0.5]).unwrap())
            .unwrap();
        assert_eq!(accumulator.bounds(), Some((-3.0, 1.0)));
        assert!(accumulator
            .include(&Array::zeros(&[0]).unwrap())
            .is_err());
    }
}
