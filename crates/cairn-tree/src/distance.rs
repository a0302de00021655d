//! Euclidean distance and its newtype wrapper.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative Euclidean distance value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    /// Zero distance, found on the matrix diagonal.
    pub const ZERO: Self = Self(0.0);

    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw distance value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// Euclidean distance between two equal-length feature vectors.
///
/// The distance matrix and the predictor both go through this function, so a
/// training sample is routed at prediction time exactly as it was partitioned
/// during training.
#[must_use]
pub fn euclidean(a: &[f64], b: &[f64]) -> Distance {
    debug_assert_eq!(a.len(), b.len(), "feature vectors differ in length");
    let sum_sq: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let delta = x - y;
            delta * delta
        })
        .sum();
    Distance(sum_sq.sqrt())
}
