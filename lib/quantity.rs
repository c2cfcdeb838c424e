//! Mean-and-error pairs computed from sample sequences.

use std::fmt;

const ERROR_DIGITS: i32 = 4;
const VALUE_DIGITS: i32 = 6;

/// How [`Quantity`]'s `Display` joins the value and the error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Separator {
    PlusMinus,
    Space,
}

/// A measured value together with the standard error of its mean.
///
/// The textual form follows the error: the error is rounded to 4 significant
/// digits and the value is printed with the same number of decimal places, so
/// `0.805555 ± 0.194444` renders as `0.8056 ± 0.1944`. A zero error prints
/// the value alone with 6 significant digits and the error as plain `0`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub error: f64,
    separator: Separator,
}

impl Default for Separator {
    fn default() -> Self { Self::PlusMinus }
}

fn decimals(x: f64, significant_digits: i32) -> usize {
    if x == 0.0 {
        return 0;
    }
    let exponent = x.abs().log10().floor() as i32;
    (significant_digits - 1 - exponent).max(0) as usize
}

impl Quantity {
    pub fn new(value: f64, error: f64) -> Self {
        Self { value, error, separator: Separator::default() }
    }

    /// Mean and standard error of the mean, `sqrt(sum (x - mean)^2 / (n (n -
    /// 1)))`. Zero or one samples give a zero error; zero samples give a zero
    /// value as well.
    pub fn from_samples(samples: &[f64]) -> Self {
        match samples.len() {
            0 => Self::new(0.0, 0.0),
            1 => Self::new(samples[0], 0.0),
            n => {
                let mean: f64 = samples.iter().sum::<f64>() / n as f64;
                let variance: f64 = samples.iter()
                    .map(|x| (x - mean).powi(2))
                    .sum::<f64>()
                    / (n * (n - 1)) as f64;
                Self::new(mean, variance.sqrt())
            },
        }
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    /// The value and the error rendered as separate strings, for tabular
    /// inline output.
    pub fn value_error_strings(&self) -> (String, String) {
        if self.error == 0.0 {
            let d = decimals(self.value, VALUE_DIGITS);
            (format!("{:.*}", d, self.value), "0".to_string())
        } else {
            let d = decimals(self.error, ERROR_DIGITS);
            (format!("{:.*}", d, self.value), format!("{:.*}", d, self.error))
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, error) = self.value_error_strings();
        match self.separator {
            Separator::PlusMinus => write!(f, "{} ± {}", value, error),
            Separator::Space => write!(f, "{} {}", value, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_has_zero_error() {
        let q = Quantity::from_samples(&[11.0 / 18.0]);
        assert_eq!(q.value_error_strings(),
            ("0.611111".to_string(), "0".to_string()));
    }

    #[test]
    fn two_samples() {
        let q = Quantity::from_samples(&[11.0 / 18.0, 1.0]);
        assert_eq!(q.value_error_strings(),
            ("0.8056".to_string(), "0.1944".to_string()));
    }

    #[test]
    fn error_fixes_value_decimals() {
        let q = Quantity::from_samples(&[1.0, 2.0]);
        assert_eq!(q.value_error_strings(),
            ("1.5000".to_string(), "0.5000".to_string()));
    }

    #[test]
    fn no_samples() {
        let q = Quantity::from_samples(&[]);
        assert_eq!(q, Quantity::new(0.0, 0.0));
    }

    #[test]
    fn display_separators() {
        let q = Quantity::from_samples(&[1.0, 2.0]);
        assert_eq!(q.to_string(), "1.5000 ± 0.5000");
        assert_eq!(
            q.with_separator(Separator::Space).to_string(), "1.5000 0.5000");
    }

    #[test]
    fn large_error_drops_decimals() {
        let q = Quantity::new(1234.5, 250.0);
        assert_eq!(q.value_error_strings(),
            ("1234.5".to_string(), "250.0".to_string()));
    }
}
