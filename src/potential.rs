/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Mountain potential over the candidate grid, and the α heuristic.
//!
//! ```text
//! potential(c) = Σᵥ exp(−α · d(c, v))
//! ```
//!
//! summed over every registered feature vector `v`. Larger α sharpens the
//! mountains (shorter radius of influence).
//!
//! When α is not pinned it is estimated as the mean distance over a uniform
//! sample of distinct unordered entity pairs ([`estimate_alpha`]). The sample
//! comes from an injected [`rand::Rng`], so a seeded generator makes the whole
//! run reproducible.

use rand::Rng;

use crate::distance::DistanceMetric;

/// Default number of entity pairs sampled when estimating α.
pub const DEFAULT_ALPHA_SAMPLE_PAIRS: usize = 50;

/// α used when it cannot be estimated (fewer than two entities, or every
/// sampled pair at zero distance).
pub const DEFAULT_ALPHA: f64 = 1.0;

// ─── PotentialField ──────────────────────────────────────────────────────────

/// Candidate centers and their mountain potentials, index-aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct PotentialField {
    centers: Vec<Vec<f64>>,
    potentials: Vec<f64>,
}

impl PotentialField {
    /// Compute the potential of every candidate from every data vector.
    pub fn compute<M>(centers: Vec<Vec<f64>>, vectors: &[Vec<f64>], metric: &M, alpha: f64) -> Self
    where
        M: DistanceMetric + ?Sized,
    {
        let potentials = centers
            .iter()
            .map(|center| mountain_potential(center, vectors, metric, alpha))
            .collect();
        Self { centers, potentials }
    }

    /// Candidate centers in grid order.
    pub fn centers(&self) -> &[Vec<f64>] {
        &self.centers
    }

    /// Potentials, index-aligned with [`Self::centers`].
    pub fn potentials(&self) -> &[f64] {
        &self.potentials
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// `true` when there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Index of the highest-potential candidate (lowest index on ties).
    pub fn argmax(&self) -> Option<usize> {
        argmax(&self.potentials, |_| true)
    }

    pub(crate) fn into_parts(self) -> (Vec<Vec<f64>>, Vec<f64>) {
        (self.centers, self.potentials)
    }
}

/// Potential of a single point.
pub fn mountain_potential<M>(point: &[f64], vectors: &[Vec<f64>], metric: &M, alpha: f64) -> f64
where
    M: DistanceMetric + ?Sized,
{
    vectors
        .iter()
        .map(|v| (-alpha * metric.distance(point, v)).exp())
        .sum()
}

/// First index holding the maximal value among those accepted by `include`.
///
/// Strict `>` keeps the earliest index on ties; NaN never wins against a
/// comparable value.
pub(crate) fn argmax(values: &[f64], include: impl Fn(usize) -> bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in values.iter().enumerate() {
        if !include(i) {
            continue;
        }
        match best {
            None => best = Some((i, value)),
            Some((_, b)) if value > b || (b.is_nan() && !value.is_nan()) => {
                best = Some((i, value))
            }
            Some(_) => {}
        }
    }
    best.map(|(i, _)| i)
}

// ─── α estimation ────────────────────────────────────────────────────────────

/// Outcome of [`estimate_alpha`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlphaEstimate {
    /// Mean sampled pairwise distance.
    pub alpha: f64,
    /// Number of distinct pairs the mean was taken over.
    pub pairs: usize,
}

/// Estimate α as the mean distance over distinct unordered pairs.
///
/// Uses every pair when there are at most `sample_pairs` of them, otherwise
/// draws `sample_pairs` distinct pairs uniformly without replacement. Returns
/// `None` with fewer than two vectors or a zero sample size.
pub fn estimate_alpha<M, R>(
    vectors: &[Vec<f64>],
    metric: &M,
    sample_pairs: usize,
    rng: &mut R,
) -> Option<AlphaEstimate>
where
    M: DistanceMetric + ?Sized,
    R: Rng + ?Sized,
{
    let n = vectors.len();
    if n < 2 || sample_pairs == 0 {
        return None;
    }
    let total = n.saturating_mul(n - 1) / 2;

    let mut sum = 0.0;
    let pairs = if total <= sample_pairs {
        for i in 0..n {
            for j in (i + 1)..n {
                sum += metric.distance(&vectors[i], &vectors[j]);
            }
        }
        total
    } else {
        for k in rand::seq::index::sample(rng, total, sample_pairs) {
            let (i, j) = pair_at(n, k);
            sum += metric.distance(&vectors[i], &vectors[j]);
        }
        sample_pairs
    };

    Some(AlphaEstimate { alpha: sum / pairs as f64, pairs })
}

/// Map a linear index over the upper triangle to its `(i, j)` pair, `i < j`.
///
/// Row `i` holds the `n − 1 − i` pairs `(i, i+1) … (i, n−1)`.
fn pair_at(n: usize, mut k: usize) -> (usize, usize) {
    let mut i = 0;
    loop {
        let row = n - 1 - i;
        if k < row {
            return (i, i + 1 + k);
        }
        k -= row;
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v]).collect()
    }

    #[test]
    fn potential_is_sum_of_kernels() {
        let vectors = line(&[0.0, 1.0]);
        let p = mountain_potential(&[0.0], &vectors, &Euclidean, 2.0);
        assert!((p - (1.0 + (-2.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn potential_peaks_near_dense_region() {
        let vectors = line(&[0.0, 0.1, 0.2, 10.0]);
        let centers = vec![vec![0.1], vec![5.0], vec![10.0]];
        let field = PotentialField::compute(centers, &vectors, &Euclidean, 1.0);
        assert_eq!(field.len(), 3);
        assert_eq!(field.argmax(), Some(0));
        assert!(field.potentials().iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn larger_alpha_sharpens_peaks() {
        let vectors = line(&[0.0, 4.0]);
        let soft = mountain_potential(&[2.0], &vectors, &Euclidean, 0.1);
        let sharp = mountain_potential(&[2.0], &vectors, &Euclidean, 5.0);
        assert!(sharp < soft);
    }

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0], |_| true), Some(1));
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0], |i| i != 1), Some(2));
        assert_eq!(argmax(&[f64::NAN, 0.5], |_| true), Some(1));
        assert_eq!(argmax(&[], |_| true), None);
    }

    #[test]
    fn pair_at_enumerates_upper_triangle() {
        let n = 5;
        let pairs: Vec<_> = (0..n * (n - 1) / 2).map(|k| pair_at(n, k)).collect();
        assert_eq!(pairs[0], (0, 1));
        assert_eq!(pairs[3], (0, 4));
        assert_eq!(pairs[4], (1, 2));
        assert_eq!(*pairs.last().unwrap(), (3, 4));
        assert!(pairs.iter().all(|&(i, j)| i < j && j < n));
    }

    #[test]
    fn alpha_uses_all_pairs_when_few() {
        let vectors = line(&[2.0, 7.0, 15.0]);
        let mut rng = StdRng::seed_from_u64(7);
        let est = estimate_alpha(&vectors, &Euclidean, 50, &mut rng).unwrap();
        assert_eq!(est.pairs, 3);
        // (5 + 13 + 8) / 3
        assert!((est.alpha - 26.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn alpha_sample_is_bounded_and_seeded() {
        let vectors: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let a = estimate_alpha(&vectors, &Euclidean, 50, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = estimate_alpha(&vectors, &Euclidean, 50, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a.pairs, 50);
        assert_eq!(a, b);
        assert!(a.alpha > 0.0 && a.alpha < 40.0);
    }

    #[test]
    fn alpha_needs_two_vectors() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(estimate_alpha(&line(&[1.0]), &Euclidean, 50, &mut rng).is_none());
        assert!(estimate_alpha(&[], &Euclidean, 50, &mut rng).is_none());
        assert!(estimate_alpha(&line(&[1.0, 2.0]), &Euclidean, 0, &mut rng).is_none());
    }
}
