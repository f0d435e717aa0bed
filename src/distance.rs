//! Pluggable distance metrics.
//!
//! The engine never computes distance itself; every comparison between a
//! candidate center and a data vector (or between two candidates during peak
//! suppression) goes through a [`DistanceMetric`]. Any `Fn(&[f64], &[f64]) -> f64`
//! is a metric, so ad-hoc closures work without a wrapper type.
//!
//! ```rust
//! use mountain_core::distance::{DistanceMetric, Euclidean};
//!
//! assert_eq!(Euclidean.distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
//!
//! let chebyshev = |a: &[f64], b: &[f64]| {
//!     a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
//! };
//! assert_eq!(chebyshev.distance(&[0.0, 0.0], &[3.0, 4.0]), 4.0);
//! ```
//!
//! # Contract
//! - Result is non-negative and symmetric in its arguments.
//! - The built-in metrics return `0.0` for empty or mismatched-length inputs
//!   instead of failing. The engine rejects such vectors at registration, so
//!   this only matters when the metrics are used standalone.

/// A non-negative, symmetric distance between two equal-length vectors.
pub trait DistanceMetric {
    /// Distance between `a` and `b`.
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;
}

impl<F> DistanceMetric for F
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    #[inline]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        self(a, b)
    }
}

/// Straight-line distance, `sqrt(Σ (aᵢ − bᵢ)²)`. The default metric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        if a.is_empty() || a.len() != b.len() {
            return 0.0;
        }
        a.iter()
            .zip(b)
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// City-block distance, `Σ |aᵢ − bᵢ|`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Manhattan;

impl DistanceMetric for Manhattan {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        if a.is_empty() || a.len() != b.len() {
            return 0.0;
        }
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
    }
}

/// Cosine distance, `1 − cos θ`, in `[0.0, 2.0]`.
///
/// Returns `0.0` when either vector has (near) zero norm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cosine;

impl DistanceMetric for Cosine {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        if a.is_empty() || a.len() != b.len() {
            return 0.0;
        }
        let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

        let epsilon = 1e-12;
        if norm_a < epsilon || norm_b < epsilon {
            return 0.0;
        }
        let cos = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
        1.0 - cos
    }
}
