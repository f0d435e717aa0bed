/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Mapping abstract peaks back to concrete entities.
//!
//! Peaks are grid coordinates. Each one, in extraction order, claims the
//! nearest registered entity that no earlier peak has claimed. Once every
//! entity is claimed the remaining peaks are skipped silently.
//!
//! # Guarantees
//! - At most one result entry per entity and one entity per peak.
//! - Result size is `min(peaks, entities)`.
//! - Distance ties go to the earliest registered entity.

use core::hash::Hash;

use hashbrown::HashMap;

use crate::distance::DistanceMetric;
use crate::features::FeatureIndex;
use crate::peaks::Peak;

/// One discovered cluster: the entity standing in for a peak.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterCenter<E> {
    /// The entity nearest to the peak.
    pub entity: E,
    /// The peak's potential at the time it was extracted.
    pub potential: f64,
    /// Extraction order of the peak.
    pub rank: usize,
    /// Grid coordinates of the peak.
    pub center: Vec<f64>,
}

/// Entities chosen as cluster centers, in extraction order.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterResult<E> {
    clusters: Vec<ClusterCenter<E>>,
}

impl<E> ClusterResult<E> {
    /// A result with no clusters.
    pub fn empty() -> Self {
        Self { clusters: Vec::new() }
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// `true` when nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters in extraction order.
    pub fn iter(&self) -> core::slice::Iter<'_, ClusterCenter<E>> {
        self.clusters.iter()
    }

    /// Center entities in extraction order.
    pub fn entities(&self) -> impl Iterator<Item = &E> + '_ {
        self.clusters.iter().map(|c| &c.entity)
    }

    /// Clusters as a slice.
    pub fn as_slice(&self) -> &[ClusterCenter<E>] {
        &self.clusters
    }
}

impl<E: PartialEq> ClusterResult<E> {
    /// Potential recorded for `entity`, if it was chosen as a center.
    pub fn get(&self, entity: &E) -> Option<f64> {
        self.clusters
            .iter()
            .find(|c| &c.entity == entity)
            .map(|c| c.potential)
    }

    /// `true` if `entity` was chosen as a center.
    pub fn contains(&self, entity: &E) -> bool {
        self.clusters.iter().any(|c| &c.entity == entity)
    }
}

impl<E: Eq + Hash> ClusterResult<E> {
    /// Entity → potential mapping.
    pub fn into_map(self) -> HashMap<E, f64> {
        self.clusters
            .into_iter()
            .map(|c| (c.entity, c.potential))
            .collect()
    }
}

impl<E> IntoIterator for ClusterResult<E> {
    type Item = ClusterCenter<E>;
    type IntoIter = std::vec::IntoIter<ClusterCenter<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a ClusterResult<E> {
    type Item = &'a ClusterCenter<E>;
    type IntoIter = core::slice::Iter<'a, ClusterCenter<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

/// Claim the nearest unclaimed entity for each peak, in the order given.
pub fn resolve_centers<E, X, M, I>(peaks: I, index: &FeatureIndex<E, X>, metric: &M) -> ClusterResult<E>
where
    E: Eq + Hash + Clone,
    M: DistanceMetric + ?Sized,
    I: IntoIterator<Item = Peak>,
{
    let mut claimed = vec![false; index.len()];
    let mut unclaimed = index.len();
    let mut clusters = Vec::with_capacity(index.len());

    for peak in peaks {
        if unclaimed == 0 {
            break;
        }
        let mut best: Option<(usize, f64)> = None;
        for (i, (_, vector)) in index.iter().enumerate() {
            if claimed[i] {
                continue;
            }
            let d = metric.distance(&peak.center, vector);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((i, d)),
            }
        }
        let Some((winner, _)) = best else { continue };

        claimed[winner] = true;
        unclaimed -= 1;
        if let Some((entity, _)) = index.entry_at(winner) {
            clusters.push(ClusterCenter {
                entity: entity.clone(),
                potential: peak.potential,
                rank: peak.rank,
                center: peak.center,
            });
        }
    }

    ClusterResult { clusters }
}
