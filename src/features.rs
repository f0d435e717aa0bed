/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Entity registration: feature extraction, the entity → vector index, and the
//! running per-dimension bounds the candidate grid is built from.
//!
//! # Implementing an extractor
//!
//! ```rust
//! use mountain_core::features::FeatureIndex;
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash)]
//! struct Sensor { id: u32, temp_milli_c: i32, humidity_pct: u8 }
//!
//! let mut index = FeatureIndex::new(|s: &Sensor| {
//!     vec![s.temp_milli_c as f64 / 1000.0, s.humidity_pct as f64]
//! });
//! index.register(Sensor { id: 1, temp_milli_c: 21_500, humidity_pct: 40 }).unwrap();
//! assert_eq!(index.dimensions(), 2);
//! ```
//!
//! # Invariants
//! - Every stored vector has the same length: the first registered vector
//!   fixes the dimensionality, later mismatches are rejected.
//! - Bounds move monotonically: `min` only decreases, `max` only increases.
//! - A rejected registration leaves the index untouched.

use core::hash::Hash;

use hashbrown::HashMap;

use crate::error::{MountainError, Result};
use crate::grid::MAX_START_OFFSET;

// ─── FeatureExtractor ────────────────────────────────────────────────────────

/// Converts a domain entity into its numeric feature vector.
///
/// Must be a pure, deterministic function of the entity for clustering
/// results to be reproducible. Any `Fn(&E) -> Vec<f64>` is an infallible
/// extractor; wrap fallible closures in [`Fallible`].
pub trait FeatureExtractor<E> {
    /// Feature vector for `entity`.
    fn feature_vec(&self, entity: &E) -> Result<Vec<f64>>;
}

impl<E, F> FeatureExtractor<E> for F
where
    F: Fn(&E) -> Vec<f64>,
{
    #[inline]
    fn feature_vec(&self, entity: &E) -> Result<Vec<f64>> {
        Ok(self(entity))
    }
}

/// Adapter for extractors that can fail.
///
/// ```rust
/// use mountain_core::error::MountainError;
/// use mountain_core::features::{Fallible, FeatureIndex};
///
/// let mut index = FeatureIndex::new(Fallible(|s: &&str| {
///     s.parse::<f64>()
///         .map(|v| vec![v])
///         .map_err(|e| MountainError::extraction(e.to_string()))
/// }));
/// assert!(index.register("2.5").is_ok());
/// assert!(index.register("not a number").is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Fallible<F>(pub F);

impl<E, F> FeatureExtractor<E> for Fallible<F>
where
    F: Fn(&E) -> Result<Vec<f64>>,
{
    #[inline]
    fn feature_vec(&self, entity: &E) -> Result<Vec<f64>> {
        (self.0)(entity)
    }
}

// ─── Bounds ──────────────────────────────────────────────────────────────────

/// Per-dimension running minimum and maximum of all registered vectors.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Bounds {
    /// Empty bounds (no dimensions observed yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the bounds to include `vector`.
    ///
    /// Dimensions not yet seen start at the vector's own value.
    pub fn observe(&mut self, vector: &[f64]) {
        for (i, &value) in vector.iter().enumerate() {
            if i >= self.min.len() {
                self.min.push(value);
                self.max.push(value);
                continue;
            }
            if value < self.min[i] {
                self.min[i] = value;
            }
            if value > self.max[i] {
                self.max[i] = value;
            }
        }
    }

    /// Number of dimensions observed.
    pub fn dimensions(&self) -> usize {
        self.min.len()
    }

    /// `true` before any vector has been observed.
    pub fn is_empty(&self) -> bool {
        self.min.is_empty()
    }

    /// Observed minimum of dimension `dim`.
    pub fn min(&self, dim: usize) -> Option<f64> {
        self.min.get(dim).copied()
    }

    /// Observed maximum of dimension `dim`.
    pub fn max(&self, dim: usize) -> Option<f64> {
        self.max.get(dim).copied()
    }

    /// `max − min` for dimension `dim`.
    pub fn range(&self, dim: usize) -> Option<f64> {
        Some(self.max(dim)? - self.min(dim)?)
    }

    /// Iterate `(min, max)` pairs in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.min.iter().copied().zip(self.max.iter().copied())
    }
}

/// Check `vector` before it is observed by `bounds`.
///
/// Rejects empty vectors, NaN/±∞ features, a length that differs from the
/// dimensions already observed, and values that would widen a dimension past
/// what a finite candidate axis can cover.
pub(crate) fn check_vector(vector: &[f64], bounds: &Bounds) -> Result<()> {
    if vector.is_empty() {
        return Err(MountainError::EmptyFeatureVector);
    }
    if let Some((dimension, &value)) = vector.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(MountainError::NonFiniteFeature { dimension, value });
    }
    if bounds.is_empty() {
        return Ok(());
    }
    if vector.len() != bounds.dimensions() {
        return Err(MountainError::DimensionMismatch {
            expected: bounds.dimensions(),
            found: vector.len(),
        });
    }
    for (dimension, (&value, (lo, hi))) in vector.iter().zip(bounds.iter()).enumerate() {
        let (min, max) = (lo.min(value), hi.max(value));
        let range = max - min;
        if !range.is_finite() || !(min - MAX_START_OFFSET * range).is_finite() {
            return Err(MountainError::RangeOverflow { dimension, min, max });
        }
    }
    Ok(())
}

// ─── FeatureIndex ────────────────────────────────────────────────────────────

/// Entity → feature vector index with running bounds.
///
/// Entities are kept in registration order; that order is the deterministic
/// tie-break when two entities are equally close to a cluster center.
pub struct FeatureIndex<E, X> {
    extractor: X,
    entities: Vec<E>,
    vectors: Vec<Vec<f64>>,
    positions: HashMap<E, usize>,
    bounds: Bounds,
}

impl<E, X> FeatureIndex<E, X>
where
    E: Eq + Hash + Clone,
    X: FeatureExtractor<E>,
{
    /// Create an empty index around the given extractor.
    pub fn new(extractor: X) -> Self {
        Self {
            extractor,
            entities: Vec::new(),
            vectors: Vec::new(),
            positions: HashMap::new(),
            bounds: Bounds::new(),
        }
    }

    /// Register one entity.
    ///
    /// Returns `Ok(false)` without calling the extractor if the entity is
    /// already known, `Ok(true)` when it was inserted. Extractor failures and
    /// invalid vectors are returned as errors and nothing is stored.
    pub fn register(&mut self, entity: E) -> Result<bool> {
        if self.positions.contains_key(&entity) {
            return Ok(false);
        }
        let vector = self.extractor.feature_vec(&entity)?;
        check_vector(&vector, &self.bounds)?;

        self.bounds.observe(&vector);
        self.positions.insert(entity.clone(), self.entities.len());
        self.entities.push(entity);
        self.vectors.push(vector);
        Ok(true)
    }

    /// Register every entity in sequence, stopping at the first error.
    ///
    /// Entities registered before the failing one stay registered. Returns the
    /// number of newly inserted entities.
    pub fn register_all<I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = E>,
    {
        let mut inserted = 0;
        for entity in entities {
            if self.register(entity)? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

impl<E, X> FeatureIndex<E, X>
where
    E: Eq + Hash,
{
    /// `true` if `entity` has been registered.
    pub fn contains(&self, entity: &E) -> bool {
        self.positions.contains_key(entity)
    }

    /// Stored feature vector for `entity`.
    pub fn feature_vec(&self, entity: &E) -> Option<&[f64]> {
        self.positions.get(entity).map(|&i| self.vectors[i].as_slice())
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// `true` when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Dimensionality of the run (0 before the first registration).
    pub fn dimensions(&self) -> usize {
        self.bounds.dimensions()
    }

    /// Running per-dimension bounds.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Registered vectors in registration order.
    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    /// Entity and vector at registration position `position`.
    pub fn entry_at(&self, position: usize) -> Option<(&E, &[f64])> {
        Some((self.entities.get(position)?, self.vectors.get(position)?.as_slice()))
    }

    /// `(entity, vector)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&E, &[f64])> + '_ {
        self.entities
            .iter()
            .zip(self.vectors.iter().map(Vec::as_slice))
    }

    /// Forget every entity and reset the bounds. The extractor is kept.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.vectors.clear();
        self.positions.clear();
        self.bounds = Bounds::new();
    }
}

impl<E: core::fmt::Debug, X> core::fmt::Debug for FeatureIndex<E, X> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeatureIndex")
            .field("len", &self.entities.len())
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}
