//! Linear quantisation of values into fixed width integers

// crate modules
use crate::error::{Error, Result};

// gridkit modules
use gridkit_array::ValueRange;
use gridkit_utils::{f, ValueExt};

/// Storage used for each exported value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBytes {
    /// Decimal text, no quantisation
    Ascii,
    /// Unsigned 8-bit levels
    One,
    /// Unsigned 16-bit levels
    Two,
    /// Unsigned 32-bit levels
    Four,
}

impl StoreBytes {
    /// Storage for a byte count, where 0 means ASCII
    pub fn from_count(count: usize) -> Result<Self> {
        match count {
            0 => Ok(Self::Ascii),
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            _ => Err(Error::InvalidOptions(f!(
                "values are stored in 0, 1, 2 or 4 bytes, not {count}"
            ))),
        }
    }

    /// Bytes per value, 0 for ASCII
    pub fn count(&self) -> usize {
        match self {
            Self::Ascii => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }

    /// Highest integer level, `2^(8n) - 1`
    pub fn max_level(&self) -> u32 {
        match self {
            Self::Ascii => 0,
            Self::One => u8::MAX as u32,
            Self::Two => u16::MAX as u32,
            Self::Four => u32::MAX,
        }
    }
}

impl std::fmt::Display for StoreBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascii => write!(f, "ascii"),
            n => write!(f, "{}-byte", n.count()),
        }
    }
}

/// Rescales values onto the integer levels of a [StoreBytes] width
///
/// With inversion a value `v` is first replaced by `max - (v - min)`. The
/// result is then mapped linearly so that `min` is level 0 and `max` is the
/// top level, rounded to the nearest level and clamped.
///
/// ```rust
/// # use gridkit_vtk::{Quantizer, StoreBytes};
/// # use gridkit_array::ValueRange;
/// let quantizer = Quantizer::new(ValueRange::new(0.0, 10.0), StoreBytes::One);
/// assert_eq!(quantizer.quantize(0.0), vec![0]);
/// assert_eq!(quantizer.quantize(10.0), vec![255]);
///
/// let quantizer = Quantizer::new(ValueRange::new(0.0, 1.0), StoreBytes::Two);
/// assert_eq!(quantizer.quantize(1.0), vec![0xff, 0xff]);
/// ```
///
/// Multi-byte levels are big-endian unless byte order fixing is turned off,
/// in which case the host order is used. ASCII storage writes the value
/// itself as decimal text without rescaling or clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    /// Value window and inversion
    pub range: ValueRange,
    /// Width of each stored value
    pub store: StoreBytes,
    /// Big-endian levels regardless of host byte order
    pub fix_byte_order: bool,
}

impl Quantizer {
    /// Quantizer with big-endian output
    pub fn new(range: ValueRange, store: StoreBytes) -> Self {
        Self {
            range,
            store,
            fix_byte_order: true,
        }
    }

    /// Choose between big-endian and host byte order
    pub fn fix_byte_order(mut self, fix: bool) -> Self {
        self.fix_byte_order = fix;
        self
    }

    /// Value after any inversion
    pub fn oriented(&self, value: f64) -> f64 {
        match self.range.invert {
            true => self.range.max - (value - self.range.min),
            false => value,
        }
    }

    /// Integer level of a value, 0 for ASCII storage
    pub fn level(&self, value: f64) -> u32 {
        let top = self.store.max_level() as f64;
        let width = self.range.width();
        if top == 0.0 || width <= 0.0 {
            return 0;
        }

        let scaled = (self.oriented(value) - self.range.min) * top / width;
        (scaled + 0.5).floor().clamp_between(0.0, top) as u32
    }

    /// Encoded bytes of a single value
    pub fn quantize(&self, value: f64) -> Vec<u8> {
        let level = self.level(value);
        match (self.store, self.fix_byte_order) {
            (StoreBytes::Ascii, _) => self.oriented(value).general().into_bytes(),
            (StoreBytes::One, _) => vec![level as u8],
            (StoreBytes::Two, true) => (level as u16).to_be_bytes().to_vec(),
            (StoreBytes::Two, false) => (level as u16).to_ne_bytes().to_vec(),
            (StoreBytes::Four, true) => level.to_be_bytes().to_vec(),
            (StoreBytes::Four, false) => level.to_ne_bytes().to_vec(),
        }
    }

    /// Integer levels of many values
    pub fn levels(&self, values: &[f64]) -> Vec<u32> {
        values.iter().map(|v| self.level(*v)).collect()
    }
}
