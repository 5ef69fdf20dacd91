use crate::f;

/// Extends floats with more specific formatting options
pub trait ValueExt {
    /// Scientific number formatting with a signed, two digit exponent
    ///
    /// The default `{:e}` output is not very consistent, e.g. `1e0` and
    /// `1.5e-7`, which is awkward in log messages and tables.
    ///
    /// ```rust
    /// # use gridkit_utils::ValueExt;
    /// assert_eq!((-1.0_f64).sci(3), "-1.000e+00");
    /// assert_eq!(0.00015_f64.sci(2), "1.50e-04");
    /// ```
    fn sci(&self, precision: usize) -> String;

    /// Shortest of plain or scientific notation at six significant digits
    ///
    /// Matches the familiar `%g` conversion, so text output stays compact
    /// and lines up with what other scientific tools write.
    ///
    /// ```rust
    /// # use gridkit_utils::ValueExt;
    /// assert_eq!(0.5_f64.general(), "0.5");
    /// assert_eq!(1234567.0_f64.general(), "1.23457e+06");
    /// assert_eq!(0.00001_f64.general(), "1e-05");
    /// ```
    fn general(&self) -> String;

    /// Clamp into an inclusive `[lower, upper]` window
    ///
    /// Unlike [f64::clamp] this never panics on a reversed window, the lower
    /// bound simply wins.
    fn clamp_between(&self, lower: f64, upper: f64) -> f64;
}

impl ValueExt for f64 {
    fn sci(&self, precision: usize) -> String {
        let formatted = f!("{:.precision$e}", self, precision = precision);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                f!("{mantissa}e{sign}{digits:0>2}")
            }
            // inf and nan have no exponent
            None => formatted,
        }
    }

    fn general(&self) -> String {
        if self.is_nan() {
            return "nan".to_string();
        } else if self.is_infinite() {
            return if *self > 0.0 { "inf" } else { "-inf" }.to_string();
        } else if *self == 0.0 {
            return "0".to_string();
        }

        // exponent after rounding to six significant digits
        let rounded = f!("{:.5e}", self);
        let (mantissa, exponent) = rounded.split_once('e').unwrap_or((rounded.as_str(), "0"));
        let exponent = exponent.parse::<i32>().unwrap_or(0);

        if !(-4..6).contains(&exponent) {
            let sign = if exponent < 0 { '-' } else { '+' };
            f!("{}e{sign}{:0>2}", trim_zeros(mantissa), exponent.abs())
        } else {
            let decimals = (5 - exponent) as usize;
            trim_zeros(&f!("{:.decimals$}", self)).to_string()
        }
    }

    fn clamp_between(&self, lower: f64, upper: f64) -> f64 {
        if *self > upper {
            upper.max(lower)
        } else if *self < lower {
            lower
        } else {
            *self
        }
    }
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sci_pads_exponent() {
        assert_eq!(1.0_f64.sci(2), "1.00e+00");
        assert_eq!(12345.0_f64.sci(1), "1.2e+04");
        assert_eq!(f64::INFINITY.sci(2), "inf");
    }

    #[test]
    fn general_notation() {
        assert_eq!(100.0_f64.general(), "100");
        assert_eq!((-2.5_f64).general(), "-2.5");
        assert_eq!(0.0001_f64.general(), "0.0001");
        assert_eq!(1999999.0_f64.general(), "2e+06");
        assert_eq!(1.0e-10_f64.general(), "1e-10");
        assert_eq!(f64::NAN.general(), "nan");
        assert_eq!(0.0_f64.general(), "0");
    }

    #[test]
    fn clamp_between_window() {
        assert_eq!(5.0_f64.clamp_between(0.0, 1.0), 1.0);
        assert_eq!((-5.0_f64).clamp_between(0.0, 1.0), 0.0);
        assert_eq!(0.25_f64.clamp_between(0.0, 1.0), 0.25);
        // reversed windows collapse onto the lower bound
        assert_eq!(5.0_f64.clamp_between(2.0, 1.0), 2.0);
    }
}
