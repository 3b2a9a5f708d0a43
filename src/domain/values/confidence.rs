use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!(
                "Confidence must be between 0.0 and 1.0, got {value}"
            ));
        }
        Ok(Confidence(value))
    }

    /// Clamps into range; NaN collapses to zero.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            return Confidence(0.0);
        }
        Confidence(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Confidence::new(1.2).is_err());
        assert!(Confidence::new(-0.1).is_err());
        assert_eq!(Confidence::new(0.7).unwrap().value(), 0.7);
    }

    #[test]
    fn test_saturating() {
        assert_eq!(Confidence::saturating(3.0).value(), 1.0);
        assert_eq!(Confidence::saturating(-3.0).value(), 0.0);
        assert_eq!(Confidence::saturating(f64::NAN).value(), 0.0);
    }
}
