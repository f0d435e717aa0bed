/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Peak extraction ("mountain destruction").
//!
//! # State machine
//!
//! ```text
//!            ┌──────────── next() ────────────┐
//!            ▼                                │
//!   Active candidates ── select argmax ──► Accepted peak
//!            │                                │
//!            │      suppress all remaining:   │
//!            │      p(c) −= p* · exp(−β·d(c*, c))
//!            ▼
//!   Terminal (no active candidates) ── next() → None
//! ```
//!
//! Each accepted peak is the active candidate with the highest *current*
//! potential. Its potential, scaled by an exponential of distance, is then
//! subtracted from every remaining candidate so the next peak is pushed away
//! from the one just taken. β controls the suppression radius.
//!
//! # Invariants
//! - A candidate's potential never increases. It may go negative, and a
//!   negative candidate stays selectable while it is active. A peak accepted
//!   with a non-positive potential suppresses nothing.
//! - Ties on the maximal potential go to the lowest candidate index (first in
//!   grid enumeration order).
//! - Peaks come out in extraction order, not re-sorted afterwards.

use crate::distance::DistanceMetric;
use crate::potential::{argmax, PotentialField};

/// Default β / α ratio: suppression radius wider than the influence radius.
pub const DEFAULT_BETA_RATIO: f64 = 2.25;

/// An accepted cluster center on the candidate grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peak {
    /// Extraction order, starting at 0.
    pub rank: usize,
    /// Index of the candidate in grid enumeration order.
    pub candidate: usize,
    /// Candidate coordinates.
    pub center: Vec<f64>,
    /// Potential of the candidate at the moment it was accepted.
    pub potential: f64,
}

/// Iterative select-then-suppress over a [`PotentialField`].
///
/// Implements [`Iterator`]: every `next()` performs one transition and yields
/// the accepted [`Peak`]; `None` once no candidates remain, or once the
/// optional stop ratio is reached.
pub struct PeakExtractor<'m, M: ?Sized> {
    centers: Vec<Vec<f64>>,
    potentials: Vec<f64>,
    active: Vec<bool>,
    remaining: usize,
    accepted: usize,
    first_potential: Option<f64>,
    min_peak_ratio: Option<f64>,
    beta: f64,
    metric: &'m M,
}

impl<'m, M> PeakExtractor<'m, M>
where
    M: DistanceMetric + ?Sized,
{
    /// Start extraction over every candidate of `field`.
    pub fn new(field: PotentialField, metric: &'m M, beta: f64) -> Self {
        let (centers, potentials) = field.into_parts();
        let remaining = centers.len();
        Self {
            active: vec![true; remaining],
            centers,
            potentials,
            remaining,
            accepted: 0,
            first_potential: None,
            min_peak_ratio: None,
            beta,
            metric,
        }
    }

    /// Stop once the next peak's potential falls below `ratio` × the first
    /// peak's potential.
    pub fn with_min_peak_ratio(mut self, ratio: f64) -> Self {
        self.min_peak_ratio = Some(ratio);
        self
    }

    /// Current potentials, index-aligned with the grid (accepted candidates
    /// keep the value they were accepted with).
    pub fn potentials(&self) -> &[f64] {
        &self.potentials
    }

    /// `true` while candidate `index` is still selectable.
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Number of candidates not yet accepted.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Number of peaks accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// `true` once no candidates remain.
    pub fn is_terminal(&self) -> bool {
        self.remaining == 0
    }

    fn suppress(&mut self, peak: usize, peak_potential: f64) {
        if peak_potential.is_nan() || peak_potential <= 0.0 {
            return;
        }
        let peak_center = &self.centers[peak];
        for (i, center) in self.centers.iter().enumerate() {
            if !self.active[i] {
                continue;
            }
            let d = self.metric.distance(peak_center, center);
            self.potentials[i] -= peak_potential * (-self.beta * d).exp();
        }
    }
}

impl<'m, M> Iterator for PeakExtractor<'m, M>
where
    M: DistanceMetric + ?Sized,
{
    type Item = Peak;

    fn next(&mut self) -> Option<Peak> {
        if self.remaining == 0 {
            return None;
        }
        let active = &self.active;
        let best = argmax(&self.potentials, |i| active[i])?;
        let potential = self.potentials[best];

        if let (Some(ratio), Some(first)) = (self.min_peak_ratio, self.first_potential) {
            if potential < ratio * first {
                tracing::trace!(potential, first, ratio, "peak below stop ratio");
                self.remaining = 0;
                self.active.iter_mut().for_each(|a| *a = false);
                return None;
            }
        }

        self.active[best] = false;
        self.remaining -= 1;
        self.suppress(best, potential);

        let rank = self.accepted;
        self.accepted += 1;
        self.first_potential.get_or_insert(potential);
        tracing::trace!(rank, candidate = best, potential, "peak accepted");

        Some(Peak {
            rank,
            candidate: best,
            center: self.centers[best].clone(),
            potential,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.min_peak_ratio.is_some() {
            (0, Some(self.remaining))
        } else {
            (self.remaining, Some(self.remaining))
        }
    }
}

/// Run extraction to the terminal state and collect every peak.
pub fn extract_peaks<M>(field: PotentialField, metric: &M, beta: f64) -> Vec<Peak>
where
    M: DistanceMetric + ?Sized,
{
    PeakExtractor::new(field, metric, beta).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;

    fn field(centers: &[f64], vectors: &[f64], alpha: f64) -> PotentialField {
        let centers = centers.iter().map(|&c| vec![c]).collect();
        let vectors: Vec<Vec<f64>> = vectors.iter().map(|&v| vec![v]).collect();
        PotentialField::compute(centers, &vectors, &Euclidean, alpha)
    }

    #[test]
    fn extracts_every_candidate_once() {
        let f = field(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 4.0], 1.0);
        let peaks = extract_peaks(f, &Euclidean, 2.25);
        assert_eq!(peaks.len(), 5);
        let mut seen: Vec<_> = peaks.iter().map(|p| p.candidate).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        for (i, p) in peaks.iter().enumerate() {
            assert_eq!(p.rank, i);
        }
    }

    #[test]
    fn first_peak_is_global_maximum() {
        let f = field(&[0.0, 5.0, 10.0], &[9.5, 10.0, 10.5, 0.0], 1.0);
        let expected = f.argmax();
        let first = PeakExtractor::new(f, &Euclidean, 2.25).next().unwrap();
        assert_eq!(Some(first.candidate), expected);
        assert_eq!(first.candidate, 2);
    }

    #[test]
    fn suppression_pushes_second_peak_away() {
        // Two clusters; the grid point next to the first peak must not win second.
        let f = field(&[0.0, 0.5, 5.0, 10.0, 10.5], &[0.0, 0.1, 10.0, 10.1, 10.2], 2.0);
        let peaks: Vec<_> = PeakExtractor::new(f, &Euclidean, 4.5).take(2).collect();
        assert_eq!(peaks[0].candidate, 3);
        assert_eq!(peaks[1].candidate, 0);
    }

    #[test]
    fn potentials_never_increase() {
        let f = field(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], &[0.5, 1.0, 4.5], 0.5);
        let mut ex = PeakExtractor::new(f, &Euclidean, 1.125);
        let mut previous = ex.potentials().to_vec();
        while ex.next().is_some() {
            for (i, (&now, &before)) in ex.potentials().iter().zip(&previous).enumerate() {
                assert!(now <= before, "candidate {i} rose from {before} to {now}");
            }
            previous = ex.potentials().to_vec();
        }
        assert!(ex.is_terminal());
        assert_eq!(ex.accepted(), 6);
    }

    #[test]
    fn negative_potential_candidates_stay_selectable() {
        let f = field(&[0.0, 0.0, 0.0], &[0.0], 1.0);
        let peaks = extract_peaks(f, &Euclidean, 1.0);
        // Identical candidates: after the first, the rest are driven to ≤ 0
        // but are still extracted.
        assert_eq!(peaks.len(), 3);
        assert!(peaks[1].potential <= 0.0);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        // Symmetric layout: candidates 0 and 2 have identical potential.
        let f = field(&[-1.0, 5.0, 1.0], &[-1.0, 1.0], 1.0);
        let first = PeakExtractor::new(f, &Euclidean, 2.25).next().unwrap();
        assert_eq!(first.candidate, 0);
    }

    #[test]
    fn min_peak_ratio_stops_early() {
        let f = field(&[0.0, 1.0, 2.0, 10.0], &[0.0, 0.0, 0.0, 10.0], 1.0);
        let peaks: Vec<_> = PeakExtractor::new(f, &Euclidean, 2.25)
            .with_min_peak_ratio(0.2)
            .collect();
        assert!(peaks.len() < 4);
        assert_eq!(peaks[0].candidate, 0);
        let first = peaks[0].potential;
        assert!(peaks.iter().all(|p| p.potential >= 0.2 * first));
    }

    #[test]
    fn empty_field_is_terminal() {
        let f = PotentialField::compute(Vec::new(), &[vec![1.0]], &Euclidean, 1.0);
        let mut ex = PeakExtractor::new(f, &Euclidean, 1.0);
        assert!(ex.is_terminal());
        assert!(ex.next().is_none());
    }
}
