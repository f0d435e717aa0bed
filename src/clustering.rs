/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The public entry point: register entities, then build clusters.
//!
//! ```text
//! entities ─► FeatureIndex ─► CandidateGrid ─► PotentialField ─► PeakExtractor ─► resolve_centers
//!               (bounds)        (axes, ∏)        (α)                (β)             (entity claim)
//! ```
//!
//! ```rust
//! use mountain_core::{Euclidean, MountainClustering, MountainConfig};
//!
//! let mut engine = MountainClustering::new(|x: &i32| vec![*x as f64]);
//! engine.register_all([1, 2, 3, 40, 41, 42]).unwrap();
//!
//! let config = MountainConfig::default().with_alpha(1.0).with_beta(2.25);
//! let clusters = engine.build_clusters(&config, &Euclidean).unwrap();
//! assert!(clusters.len() <= 6);
//! ```
//!
//! With α and β pinned and a deterministic metric, repeated calls on the same
//! entity set return identical results. With α estimated, pin
//! [`MountainConfig::seed`] for the same guarantee.

use core::hash::Hash;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::MountainConfig;
use crate::distance::{DistanceMetric, Euclidean};
use crate::error::{MountainError, Result};
use crate::features::{FeatureExtractor, FeatureIndex};
use crate::grid::{build_axes, build_centers, candidate_count};
use crate::peaks::{Peak, PeakExtractor};
use crate::potential::{estimate_alpha, PotentialField, DEFAULT_ALPHA};
use crate::resolve::{resolve_centers, ClusterResult};

/// Where the α of a run came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaSource {
    /// Supplied by the caller.
    Pinned,
    /// Mean of sampled pairwise distances.
    Estimated {
        /// Number of pairs sampled.
        pairs: usize,
    },
    /// Estimation was impossible; [`DEFAULT_ALPHA`] was used.
    Fallback,
}

/// α and β as used by a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedParameters {
    /// Potential decay rate.
    pub alpha: f64,
    /// Suppression decay rate.
    pub beta: f64,
    /// Provenance of `alpha`.
    pub alpha_source: AlphaSource,
}

/// Mountain clustering over entities of type `E`.
///
/// Owns the [`FeatureIndex`]; every intermediate structure of a run (grid,
/// potentials, peaks) lives only for the duration of `build_clusters`.
pub struct MountainClustering<E, X> {
    index: FeatureIndex<E, X>,
}

impl<E, X> MountainClustering<E, X>
where
    E: Eq + Hash + Clone,
    X: FeatureExtractor<E>,
{
    /// Create an engine around the given feature extractor.
    pub fn new(extractor: X) -> Self {
        Self { index: FeatureIndex::new(extractor) }
    }

    /// Register one entity. See [`FeatureIndex::register`].
    pub fn register(&mut self, entity: E) -> Result<bool> {
        self.index.register(entity)
    }

    /// Register many entities. See [`FeatureIndex::register_all`].
    pub fn register_all<I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = E>,
    {
        self.index.register_all(entities)
    }

    /// The underlying index.
    pub fn index(&self) -> &FeatureIndex<E, X> {
        &self.index
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// `true` when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Forget every registered entity.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Cluster with the default configuration and Euclidean distance.
    pub fn build_clusters_default(&self) -> Result<ClusterResult<E>> {
        self.build_clusters(&MountainConfig::default(), &Euclidean)
    }

    /// Cluster the registered entities.
    ///
    /// The α-estimation RNG is seeded from `config.seed`, or from OS entropy
    /// when no seed is set. Zero registered entities give an empty result.
    pub fn build_clusters<M>(&self, config: &MountainConfig, metric: &M) -> Result<ClusterResult<E>>
    where
        M: DistanceMetric + ?Sized,
    {
        let mut rng = seeded_rng(config);
        self.build_clusters_with_rng(config, metric, &mut rng)
    }

    /// Cluster the registered entities, drawing the α sample from `rng`.
    pub fn build_clusters_with_rng<M, R>(
        &self,
        config: &MountainConfig,
        metric: &M,
        rng: &mut R,
    ) -> Result<ClusterResult<E>>
    where
        M: DistanceMetric + ?Sized,
        R: Rng + ?Sized,
    {
        config.validate()?;
        if self.index.is_empty() {
            debug!("no entities registered; returning empty clustering");
            return Ok(ClusterResult::empty());
        }

        let params = self.parameters_with_rng(config, metric, rng)?;
        let field = self.potential_field(config, metric, params.alpha)?;

        // Each peak claims at most one entity, so peaks past the entity count
        // can never reach the result.
        let limit = self.index.len();
        let peaks = self.extractor(field, config, metric, params.beta).take(limit);
        let result = resolve_centers(peaks, &self.index, metric);

        debug!(
            clusters = result.len(),
            entities = self.index.len(),
            alpha = params.alpha,
            beta = params.beta,
            "mountain clustering finished"
        );
        Ok(result)
    }

    /// Run extraction to completion and return every peak, unresolved.
    ///
    /// Unlike [`Self::build_clusters`] this does not stop at the entity count,
    /// so the cost is quadratic in the number of candidates.
    pub fn extract_peaks_with_rng<M, R>(
        &self,
        config: &MountainConfig,
        metric: &M,
        rng: &mut R,
    ) -> Result<Vec<Peak>>
    where
        M: DistanceMetric + ?Sized,
        R: Rng + ?Sized,
    {
        config.validate()?;
        if self.index.is_empty() {
            return Ok(Vec::new());
        }
        let params = self.parameters_with_rng(config, metric, rng)?;
        let field = self.potential_field(config, metric, params.alpha)?;
        let peaks: Vec<Peak> = self.extractor(field, config, metric, params.beta).collect();
        debug!(peaks = peaks.len(), "peak extraction finished");
        Ok(peaks)
    }

    /// Resolve α and β for a run without building the grid.
    pub fn parameters_with_rng<M, R>(
        &self,
        config: &MountainConfig,
        metric: &M,
        rng: &mut R,
    ) -> Result<ResolvedParameters>
    where
        M: DistanceMetric + ?Sized,
        R: Rng + ?Sized,
    {
        config.validate()?;
        let (alpha, alpha_source) = match config.alpha {
            Some(alpha) => (alpha, AlphaSource::Pinned),
            None => match estimate_alpha(self.index.vectors(), metric, config.alpha_sample_pairs, rng) {
                Some(est) if est.alpha.is_finite() && est.alpha > 0.0 => {
                    (est.alpha, AlphaSource::Estimated { pairs: est.pairs })
                }
                estimate => {
                    warn!(
                        entities = self.index.len(),
                        estimate = ?estimate.map(|e| e.alpha),
                        fallback = DEFAULT_ALPHA,
                        "cannot estimate alpha; using fallback"
                    );
                    (DEFAULT_ALPHA, AlphaSource::Fallback)
                }
            },
        };
        let beta = config.beta.unwrap_or(alpha * config.beta_ratio);
        debug!(alpha, beta, source = ?alpha_source, "parameters resolved");
        Ok(ResolvedParameters { alpha, beta, alpha_source })
    }

    fn potential_field<M>(&self, config: &MountainConfig, metric: &M, alpha: f64) -> Result<PotentialField>
    where
        M: DistanceMetric + ?Sized,
    {
        let intervals = config.effective_intervals();
        let axes = build_axes(self.index.bounds(), intervals);
        let limit = config.max_candidates.unwrap_or(usize::MAX);
        let candidates = match candidate_count(&axes) {
            Some(n) if n <= limit => n,
            other => {
                return Err(MountainError::GridTooLarge { candidates: other, limit });
            }
        };
        debug!(
            dimensions = axes.len(),
            intervals,
            candidates,
            "candidate grid built"
        );
        Ok(PotentialField::compute(build_centers(&axes), self.index.vectors(), metric, alpha))
    }

    fn extractor<'m, M>(
        &self,
        field: PotentialField,
        config: &MountainConfig,
        metric: &'m M,
        beta: f64,
    ) -> PeakExtractor<'m, M>
    where
        M: DistanceMetric + ?Sized,
    {
        let extractor = PeakExtractor::new(field, metric, beta);
        match config.min_peak_ratio {
            Some(ratio) => extractor.with_min_peak_ratio(ratio),
            None => extractor,
        }
    }
}

impl<E: core::fmt::Debug, X> core::fmt::Debug for MountainClustering<E, X> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MountainClustering")
            .field("index", &self.index)
            .finish()
    }
}

fn seeded_rng(config: &MountainConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
