//! Clustering parameters.
//!
//! Every field is optional in spirit: [`MountainConfig::default`] reproduces
//! the classic mountain-method setup (10 intervals per dimension, α from a
//! 50-pair distance sample, β = 2.25·α). Pin `alpha`, `beta` and `seed` for
//! reproducible runs.
//!
//! ```rust
//! use mountain_core::config::MountainConfig;
//!
//! let config = MountainConfig::default()
//!     .with_intervals(20)
//!     .with_alpha(2.0)
//!     .with_seed(42);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{MountainError, Result};
use crate::peaks::DEFAULT_BETA_RATIO;
use crate::potential::DEFAULT_ALPHA_SAMPLE_PAIRS;

/// Default number of grid intervals per dimension.
pub const DEFAULT_INTERVALS: usize = 10;

/// Default ceiling on the number of candidate centers.
pub const DEFAULT_MAX_CANDIDATES: usize = 1_000_000;

/// Parameters for [`crate::clustering::MountainClustering::build_clusters`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MountainConfig {
    /// Grid intervals per dimension; values below 1 are treated as 1.
    /// Default: 10.
    pub intervals_per_dimension: usize,

    /// Potential decay rate. `None` estimates it from sampled pairwise
    /// distances. Must be finite and > 0 when set.
    pub alpha: Option<f64>,

    /// Suppression decay rate. `None` uses `beta_ratio × α`.
    /// Must be finite and > 0 when set.
    pub beta: Option<f64>,

    /// Multiplier applied to α when β is not pinned. Default: 2.25.
    pub beta_ratio: f64,

    /// Maximum number of distinct entity pairs sampled to estimate α.
    /// Default: 50.
    pub alpha_sample_pairs: usize,

    /// Seed for the α sampling RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Refuse to build grids with more candidates than this. `None` removes
    /// the limit. Default: 1 000 000.
    pub max_candidates: Option<usize>,

    /// Stop extraction once a peak's potential falls below this fraction of
    /// the first peak's potential. `None` extracts every candidate.
    pub min_peak_ratio: Option<f64>,
}

impl Default for MountainConfig {
    fn default() -> Self {
        Self {
            intervals_per_dimension: DEFAULT_INTERVALS,
            alpha: None,
            beta: None,
            beta_ratio: DEFAULT_BETA_RATIO,
            alpha_sample_pairs: DEFAULT_ALPHA_SAMPLE_PAIRS,
            seed: None,
            max_candidates: Some(DEFAULT_MAX_CANDIDATES),
            min_peak_ratio: None,
        }
    }
}

impl MountainConfig {
    /// Set grid intervals per dimension.
    pub fn with_intervals(mut self, intervals: usize) -> Self {
        self.intervals_per_dimension = intervals;
        self
    }

    /// Pin α.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Pin β.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }

    /// Set the β / α ratio used when β is not pinned.
    pub fn with_beta_ratio(mut self, ratio: f64) -> Self {
        self.beta_ratio = ratio;
        self
    }

    /// Set the α sample size.
    pub fn with_alpha_sample_pairs(mut self, pairs: usize) -> Self {
        self.alpha_sample_pairs = pairs;
        self
    }

    /// Seed the α sampling RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set or remove the candidate-count ceiling.
    pub fn with_max_candidates(mut self, limit: Option<usize>) -> Self {
        self.max_candidates = limit;
        self
    }

    /// Enable the relative stop rule for peak extraction.
    pub fn with_min_peak_ratio(mut self, ratio: f64) -> Self {
        self.min_peak_ratio = Some(ratio);
        self
    }

    /// Intervals after clamping to the minimum of 1.
    pub fn effective_intervals(&self) -> usize {
        self.intervals_per_dimension.max(1)
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<()> {
        if let Some(alpha) = self.alpha {
            positive("alpha", alpha)?;
        }
        if let Some(beta) = self.beta {
            positive("beta", beta)?;
        }
        positive("beta_ratio", self.beta_ratio)?;
        if self.alpha.is_none() && self.alpha_sample_pairs == 0 {
            return Err(MountainError::InvalidParameter {
                name: "alpha_sample_pairs",
                value: 0.0,
                reason: "must be at least 1 when alpha is estimated",
            });
        }
        if let Some(ratio) = self.min_peak_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(MountainError::InvalidParameter {
                    name: "min_peak_ratio",
                    value: ratio,
                    reason: "must lie in [0, 1]",
                });
            }
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MountainError::InvalidParameter {
            name,
            value,
            reason: "must be finite and > 0",
        })
    }
}
