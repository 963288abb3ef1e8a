//! Numeric tolerance policy for comparing continuous oracle results.
//!
//! - `Exact`: bit-for-bit equal values only
//! - `AbsoluteEpsilon`: `|actual - expected| <= threshold`
//! - `RelativeEpsilon`: `|actual - expected| <= threshold * |expected|`
//!
//! NaN never matches anything, including another NaN.

use serde::{Deserialize, Serialize};

/// How two values are compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToleranceKind {
    Exact,
    AbsoluteEpsilon,
    RelativeEpsilon,
}

/// A comparison rule handed to an oracle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TolerancePolicy {
    pub kind: ToleranceKind,
    #[serde(default)]
    pub threshold: f64,
}

impl TolerancePolicy {
    pub fn exact() -> Self {
        Self {
            kind: ToleranceKind::Exact,
            threshold: 0.0,
        }
    }

    pub fn absolute(threshold: f64) -> Self {
        Self {
            kind: ToleranceKind::AbsoluteEpsilon,
            threshold,
        }
    }

    pub fn relative(threshold: f64) -> Self {
        Self {
            kind: ToleranceKind::RelativeEpsilon,
            threshold,
        }
    }

    /// Whether the threshold is usable (finite and non-negative).
    pub fn is_valid(&self) -> bool {
        self.threshold.is_finite() && self.threshold >= 0.0
    }

    /// Compare one submitted value against the expected one.
    pub fn matches(&self, actual: f64, expected: f64) -> bool {
        if actual.is_nan() || expected.is_nan() {
            return false;
        }
        match self.kind {
            ToleranceKind::Exact => actual == expected,
            ToleranceKind::AbsoluteEpsilon => (actual - expected).abs() <= self.threshold,
            ToleranceKind::RelativeEpsilon => {
                (actual - expected).abs() <= self.threshold * expected.abs()
            }
        }
    }

    /// Element-wise comparison; slices of different length never match.
    pub fn all_match(&self, actual: &[f64], expected: &[f64]) -> bool {
        actual.len() == expected.len()
            && actual
                .iter()
                .zip(expected)
                .all(|(a, e)| self.matches(*a, *e))
    }
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self::absolute(0.1)
    }
}
