// standard library
use std::path::Path;

// crate modules
use crate::error::{Error, Result};

// gridkit modules
use gridkit_array::ValueRange;
use gridkit_utils::{f, ValueExt};

// external crates
use nom::character::complete::{char, multispace0, not_line_ending};
use nom::combinator::all_consuming;
use nom::multi::many0;
use nom::number::complete::double;
use nom::sequence::{preceded, terminated};
use nom::IResult;

/// Colour with red, green, blue and alpha components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// Opaque black
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    /// Opaque white
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Linear interpolation of every component, `t = 0` gives `self`
    pub fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Composite `self` over a base colour with coverage `alpha`
    ///
    /// Every colour channel becomes `base * (1 - alpha) + self * alpha`. The
    /// result keeps the alpha of the base.
    pub fn over(&self, base: &Rgba, alpha: f64) -> Rgba {
        let mix = |b: f64, o: f64| b * (1.0 - alpha) + o * alpha;
        Rgba::new(
            mix(base.r, self.r),
            mix(base.g, self.g),
            mix(base.b, self.b),
            base.a,
        )
    }

    /// 8-bit RGB channels, `round(c * 255)` with clamping
    pub fn to_rgb8(&self) -> [u8; 3] {
        let channel = |c: f64| (c.clamp_between(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    fn is_normalised(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

/// Piecewise linear colour ramp
///
/// The stops are spread evenly over `[0, 1]` in order, so `n` stops sit at
/// `0, 1/(n-1), ..., 1`. A single stop is a constant colour.
///
/// ```rust
/// # use gridkit_raster::{Colormap, Rgba};
/// let gray = Colormap::gray();
/// assert_eq!(gray.sample(0.0), Rgba::WHITE);
/// assert_eq!(gray.sample(1.0), Rgba::BLACK);
/// assert_eq!(gray.sample(0.5).to_rgb8(), [128, 128, 128]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    stops: Vec<Rgba>,
}

impl Colormap {
    /// Colormap from explicit stops
    ///
    /// There must be at least one stop, and every component must be within
    /// `[0, 1]`.
    pub fn new(stops: Vec<Rgba>) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::InvalidColormap("no colour stops".to_string()));
        }

        if let Some(i) = stops.iter().position(|s| !s.is_normalised()) {
            return Err(Error::InvalidColormap(f!(
                "stop {i} has components outside [0, 1]"
            )));
        }

        Ok(Self { stops })
    }

    /// Opaque white to black, the default for data
    pub fn gray() -> Self {
        Self {
            stops: vec![Rgba::WHITE, Rgba::BLACK],
        }
    }

    /// Transparent white to opaque yellow, the default for overlays
    pub fn yellow() -> Self {
        Self {
            stops: vec![
                Rgba::new(1.0, 1.0, 1.0, 0.0),
                Rgba::new(1.0, 1.0, 0.0, 1.0),
            ],
        }
    }

    /// Blue through white to red, useful for signed data
    pub fn bluered() -> Self {
        Self {
            stops: vec![
                Rgba::new(0.0, 0.0, 1.0, 1.0),
                Rgba::WHITE,
                Rgba::new(1.0, 0.0, 0.0, 1.0),
            ],
        }
    }

    /// Parse the colormap text format
    ///
    /// Any number of `#` comment lines come first, then whitespace separated
    /// `r g b a` quadruples with each component in `[0, 1]`.
    ///
    /// ```rust
    /// # use gridkit_raster::Colormap;
    /// let text = "# red to green\n1 0 0 1\n0 1 0 1\n";
    /// let colormap = Colormap::parse(text).unwrap();
    /// assert_eq!(colormap.len(), 2);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let (_, values) = all_consuming(colormap_values)(text)
            .map_err(|_| Error::InvalidColormap("unreadable colormap text".to_string()))?;

        if values.len() % 4 != 0 {
            return Err(Error::InvalidColormap(f!(
                "{} values do not form rgba quadruples",
                values.len()
            )));
        }

        let stops = values
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect();

        Self::new(stops)
    }

    /// Read and parse a colormap file, see [parse()](Colormap::parse)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Colour stops in order
    pub fn stops(&self) -> &[Rgba] {
        &self.stops
    }

    /// Number of colour stops
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always false, a colormap has at least one stop
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Same stops in the opposite order
    pub fn reversed(&self) -> Self {
        Self {
            stops: self.stops.iter().rev().copied().collect(),
        }
    }

    /// Colour at a parameter `t`, clamped to `[0, 1]`
    pub fn sample(&self, t: f64) -> Rgba {
        let last = self.stops.len() - 1;
        if last == 0 {
            return self.stops[0];
        }

        let x = t.clamp_between(0.0, 1.0) * last as f64;
        let i = (x.floor() as usize).min(last - 1);
        self.stops[i].lerp(&self.stops[i + 1], x - i as f64)
    }

    /// Colour of a data value within a value range
    ///
    /// Values outside the range take the end colours rather than
    /// extrapolating.
    pub fn lookup(&self, value: f64, range: &ValueRange) -> Rgba {
        self.sample(range.normalize(value))
    }

    /// Colour that stands out against this colormap
    ///
    /// Black if the middle of the ramp is light, white otherwise.
    pub fn mask_color(&self) -> Rgba {
        let [r, g, b] = self.sample(0.5).to_rgb8();
        let brightness = (r as f64 + g as f64 + b as f64) / 3.0;
        if brightness > 127.0 {
            Rgba::BLACK
        } else {
            Rgba::WHITE
        }
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::gray()
    }
}

fn comment(i: &str) -> IResult<&str, &str> {
    preceded(multispace0, preceded(char('#'), not_line_ending))(i)
}

fn colormap_values(i: &str) -> IResult<&str, Vec<f64>> {
    let (i, _) = many0(comment)(i)?;
    terminated(many0(preceded(multispace0, double)), multispace0)(i)
}

#[cfg(test)]
mod colormap_tests {
    use super::*;

    fn assert_close(a: Rgba, b: Rgba) {
        for (x, y) in [(a.r, b.r), (a.g, b.g), (a.b, b.b), (a.a, b.a)] {
            assert!((x - y).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn endpoints_and_clamping() {
        let colormap = Colormap::bluered();
        let range = ValueRange::new(-2.0, 2.0);
        assert_eq!(colormap.lookup(-2.0, &range), colormap.stops()[0]);
        assert_eq!(colormap.lookup(2.0, &range), colormap.stops()[2]);
        assert_eq!(colormap.lookup(-10.0, &range), colormap.stops()[0]);
        assert_eq!(colormap.lookup(10.0, &range), colormap.stops()[2]);
        assert_eq!(colormap.lookup(0.0, &range), Rgba::WHITE);
    }

    #[test]
    fn midpoint_gray() {
        let range = ValueRange::new(0.0, 10.0);
        let color = Colormap::gray().lookup(5.0, &range);
        assert_close(color, Rgba::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn interpolation_between_stops() {
        let colormap = Colormap::bluered();
        assert_close(colormap.sample(0.25), Rgba::new(0.5, 0.5, 1.0, 1.0));
        assert_close(colormap.sample(0.75), Rgba::new(1.0, 0.5, 0.5, 1.0));
    }

    #[test]
    fn single_stop_is_constant() {
        let colormap = Colormap::new(vec![Rgba::new(0.2, 0.4, 0.6, 0.8)]).unwrap();
        assert_eq!(colormap.sample(0.0), colormap.sample(1.0));
    }

    #[test]
    fn invalid_stops() {
        assert!(Colormap::new(vec![]).is_err());
        assert!(Colormap::new(vec![Rgba::new(1.5, 0.0, 0.0, 1.0)]).is_err());
    }

    #[test]
    fn parse_text() {
        let text = "# header\n# another comment\n  0 0 0 0\n1 1 1 1 \n\n0.5 0.25 0 1";
        let colormap = Colormap::parse(text).unwrap();
        assert_eq!(colormap.len(), 3);
        assert_eq!(colormap.stops()[2], Rgba::new(0.5, 0.25, 0.0, 1.0));

        assert!(Colormap::parse("# header\n1 1 1").is_err());
        assert!(Colormap::parse("1 1 1 x").is_err());
        assert!(Colormap::parse("# empty").is_err());
    }

    #[test]
    fn reversed_stops() {
        let reversed = Colormap::gray().reversed();
        assert_eq!(reversed.sample(0.0), Rgba::BLACK);
        assert_eq!(reversed.sample(1.0), Rgba::WHITE);
    }

    #[test]
    fn mask_colors() {
        assert_eq!(Colormap::gray().mask_color(), Rgba::BLACK);
        assert_eq!(Colormap::bluered().mask_color(), Rgba::BLACK);
        let dark = Colormap::new(vec![Rgba::BLACK, Rgba::new(0.2, 0.2, 0.2, 1.0)]).unwrap();
        assert_eq!(dark.mask_color(), Rgba::WHITE);
    }

    #[test]
    fn compositing_law() {
        let base = Rgba::new(0.2, 0.4, 0.6, 1.0);
        let overlay = Rgba::new(1.0, 1.0, 0.0, 1.0);
        let blended = overlay.over(&base, 0.25);
        assert_eq!(blended.r, 0.2 * 0.75 + 1.0 * 0.25);
        assert_eq!(blended.g, 0.4 * 0.75 + 1.0 * 0.25);
        assert_eq!(blended.b, 0.6 * 0.75 + 0.0 * 0.25);
    }
}
