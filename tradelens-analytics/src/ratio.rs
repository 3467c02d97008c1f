//! `Ratio` — a quotient that may be unbounded.
//!
//! Profit factor, recovery factor, Sortino and Calmar all divide by something
//! that is legitimately zero for a flawless record. Float infinity does not
//! survive JSON, so the unbounded case is an explicit variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Denominators with a smaller magnitude count as zero.
pub const ZERO_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Ratio {
    Finite(f64),
    /// Positive numerator over a zero denominator.
    Unbounded,
}

impl Ratio {
    /// `numerator / denominator` with the zero-denominator convention:
    /// unbounded when the numerator is positive, otherwise 0.
    ///
    /// A quotient that overflows follows the same convention, and NaN maps to 0.
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator.abs() < ZERO_EPSILON {
            if numerator > 0.0 {
                Ratio::Unbounded
            } else {
                Ratio::Finite(0.0)
            }
        } else {
            Ratio::from_value(numerator / denominator)
        }
    }

    fn from_value(v: f64) -> Self {
        if v.is_finite() {
            Ratio::Finite(v)
        } else if v > 0.0 {
            Ratio::Unbounded
        } else {
            Ratio::Finite(0.0)
        }
    }

    pub fn zero() -> Self {
        Ratio::Finite(0.0)
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Ratio::Unbounded)
    }

    /// The finite value, or `None` when unbounded.
    pub fn finite(self) -> Option<f64> {
        match self {
            Ratio::Finite(v) => Some(v),
            Ratio::Unbounded => None,
        }
    }

    /// Lossy view for sorting and display; unbounded maps to `f64::INFINITY`.
    pub fn as_f64(self) -> f64 {
        match self {
            Ratio::Finite(v) => v,
            Ratio::Unbounded => f64::INFINITY,
        }
    }

    /// Multiply a finite value by `factor`; unbounded stays unbounded.
    pub fn scale(self, factor: f64) -> Self {
        match self {
            Ratio::Finite(v) => Ratio::from_value(v * factor),
            Ratio::Unbounded => Ratio::Unbounded,
        }
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Ratio::zero()
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(v) => write!(f, "{v:.2}"),
            Ratio::Unbounded => write!(f, "∞"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_division() {
        assert_eq!(Ratio::of(800.0, 200.0), Ratio::Finite(4.0));
    }

    #[test]
    fn zero_denominator_positive_numerator_is_unbounded() {
        assert_eq!(Ratio::of(10.0, 0.0), Ratio::Unbounded);
    }

    #[test]
    fn zero_over_zero_is_zero() {
        assert_eq!(Ratio::of(0.0, 0.0), Ratio::Finite(0.0));
    }

    #[test]
    fn negative_over_zero_is_zero() {
        assert_eq!(Ratio::of(-5.0, 0.0), Ratio::Finite(0.0));
    }

    #[test]
    fn overflowing_quotient_is_never_infinite() {
        assert_eq!(Ratio::of(f64::MAX, 0.5), Ratio::Unbounded);
        assert_eq!(Ratio::of(-f64::MAX, 0.5), Ratio::Finite(0.0));
        assert_eq!(Ratio::of(f64::INFINITY, 1.0), Ratio::Unbounded);
        assert_eq!(Ratio::of(f64::NAN, 1.0), Ratio::Finite(0.0));
        assert_eq!(Ratio::Finite(f64::MAX).scale(2.0), Ratio::Unbounded);
    }

    #[test]
    fn scale_keeps_unbounded() {
        assert_eq!(Ratio::Unbounded.scale(100.0), Ratio::Unbounded);
        assert_eq!(Ratio::Finite(0.5).scale(100.0), Ratio::Finite(50.0));
    }

    #[test]
    fn serializes_without_infinity() {
        let json = serde_json::to_string(&Ratio::Unbounded).unwrap();
        assert_eq!(json, r#"{"kind":"unbounded"}"#);
        let json = serde_json::to_string(&Ratio::Finite(1.5)).unwrap();
        assert_eq!(json, r#"{"kind":"finite","value":1.5}"#);
        let back: Ratio = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Ratio::Finite(1.5));
    }

    #[test]
    fn display() {
        assert_eq!(Ratio::Unbounded.to_string(), "∞");
        assert_eq!(Ratio::Finite(1.234).to_string(), "1.23");
    }
}
