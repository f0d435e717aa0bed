//! Error type shared by every stage of the clustering pipeline.
//!
//! All failures are local and immediate: there is no I/O, so nothing here is
//! transient and nothing is retried. Registration errors are raised before the
//! index is mutated, so a failed `register` leaves the engine as it was.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, MountainError>;

/// Everything that can go wrong while registering entities or building clusters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MountainError {
    /// A feature vector's length differs from the dimensionality fixed by the
    /// first registered vector.
    #[error("dimensionality mismatch: expected {expected} features, got {found}")]
    DimensionMismatch {
        /// Dimensionality of the run (length of the first registered vector).
        expected: usize,
        /// Length of the offending vector.
        found: usize,
    },

    /// The extractor produced a zero-length vector.
    #[error("feature vector is empty")]
    EmptyFeatureVector,

    /// A feature was NaN or infinite.
    #[error("feature {dimension} is not finite ({value})")]
    NonFiniteFeature {
        /// Index of the offending dimension.
        dimension: usize,
        /// The rejected value.
        value: f64,
    },

    /// Registering the vector would widen a dimension so far that its range,
    /// or the padded candidate axis over it, overflows to infinity.
    #[error("range of feature {dimension} overflows: [{min}, {max}]")]
    RangeOverflow {
        /// Index of the offending dimension.
        dimension: usize,
        /// Minimum the dimension would have.
        min: f64,
        /// Maximum the dimension would have.
        max: f64,
    },

    /// The injected extractor failed for an entity.
    #[error("feature extraction failed: {0}")]
    Extraction(String),

    /// A configuration value is outside its valid domain.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears on [`crate::config::MountainConfig`].
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// What the value must satisfy.
        reason: &'static str,
    },

    /// The candidate grid would exceed the configured size limit.
    ///
    /// `candidates` is `None` when the product overflowed `usize`.
    #[error("candidate grid too large: {candidates:?} candidates exceeds limit of {limit}")]
    GridTooLarge {
        /// Number of grid cells that would have been built.
        candidates: Option<usize>,
        /// The configured `max_candidates` (or `usize::MAX` when unbounded).
        limit: usize,
    },
}

impl MountainError {
    /// Wrap an extractor failure message.
    pub fn extraction(reason: impl Into<String>) -> Self {
        Self::Extraction(reason.into())
    }

    /// Returns `true` for errors caused by the data rather than by configuration.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::EmptyFeatureVector
                | Self::NonFiniteFeature { .. }
                | Self::RangeOverflow { .. }
                | Self::Extraction(_)
        )
    }
}
