/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Candidate-center grid over the observed feature space.
//!
//! Each dimension gets an [`Axis`] of `intervals + 1` evenly spaced marks that
//! starts slightly below the observed minimum:
//!
//! ```text
//! step  = max((max − min) / intervals, ε·scale)   scale = max(|min|, |max|, 1)
//! shift = step / 8
//! start = min − 3·shift
//! axis  = [start, start + step, …, start + intervals·step]
//! ```
//!
//! The candidate centers are the Cartesian product of all axes, enumerated in
//! lexicographic order of axis indices (first dimension outermost, last
//! dimension fastest).
//!
//! # Cost
//!
//! The candidate count is `∏ (intervals + 1)`, exponential in the number of
//! dimensions. Mountain clustering is meant for low-dimensional spaces; use
//! [`candidate_count`] to check the size before materialising the grid.

use crate::features::Bounds;

/// Relative floor on the axis step. Scaled by the magnitude of the bounds so
/// consecutive points stay distinct however many intervals are requested.
pub const GRID_EPSILON: f64 = f64::EPSILON * 1024.0;

/// Divisor of `step` giving the start-of-axis shift.
const SHIFT_DIVISOR: f64 = 8.0;

/// Number of shifts the axis start sits below the observed minimum.
const START_SHIFTS: f64 = 3.0;

/// Largest distance of the axis start below `min`, as a fraction of the range
/// (reached with a single interval).
pub(crate) const MAX_START_OFFSET: f64 = START_SHIFTS / SHIFT_DIVISOR;

// ─── Axis ────────────────────────────────────────────────────────────────────

/// Ordered, strictly increasing sample points for one dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    points: Vec<f64>,
    step: f64,
}

impl Axis {
    /// Build an axis spanning `[min, max]` with `intervals` steps.
    ///
    /// `intervals` is clamped to at least 1.
    pub fn spanning(min: f64, max: f64, intervals: usize) -> Self {
        let intervals = intervals.max(1);
        let scale = min.abs().max(max.abs()).max(1.0);
        let step = ((max - min) / intervals as f64).max(GRID_EPSILON * scale);
        let shift = step / SHIFT_DIVISOR;
        let start = min - START_SHIFTS * shift;

        // Multiply rather than accumulate so rounding error does not build up.
        let points = (0..=intervals)
            .map(|k| start + k as f64 * step)
            .collect();
        Self { points, step }
    }

    /// The sample points, strictly increasing.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of sample points (`intervals + 1`).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: an axis has at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Spacing between consecutive points.
    pub fn step(&self) -> f64 {
        self.step
    }
}

// ─── GridBuilder operations ──────────────────────────────────────────────────

/// One axis per observed dimension.
pub fn build_axes(bounds: &Bounds, intervals: usize) -> Vec<Axis> {
    bounds
        .iter()
        .map(|(min, max)| Axis::spanning(min, max, intervals))
        .collect()
}

/// Number of candidate centers the axes produce, or `None` on overflow.
///
/// Zero axes produce zero candidates.
pub fn candidate_count(axes: &[Axis]) -> Option<usize> {
    if axes.is_empty() {
        return Some(0);
    }
    axes.iter()
        .try_fold(1usize, |acc, axis| acc.checked_mul(axis.len()))
}

/// Full Cartesian product of the axes, in lexicographic index order.
///
/// Enumerated iteratively with an odometer over axis indices, so the depth of
/// the product never touches the call stack.
pub fn build_centers(axes: &[Axis]) -> Vec<Vec<f64>> {
    if axes.is_empty() || axes.iter().any(Axis::is_empty) {
        return Vec::new();
    }

    let total = candidate_count(axes).unwrap_or(0);
    let mut centers = Vec::with_capacity(total);
    let mut odometer = vec![0usize; axes.len()];

    loop {
        centers.push(
            odometer
                .iter()
                .zip(axes)
                .map(|(&i, axis)| axis.points[i])
                .collect(),
        );

        // Advance the last dimension first and carry leftwards.
        let mut dim = axes.len();
        loop {
            if dim == 0 {
                return centers;
            }
            dim -= 1;
            odometer[dim] += 1;
            if odometer[dim] < axes[dim].len() {
                break;
            }
            odometer[dim] = 0;
        }
    }
}

// ─── CandidateGrid ───────────────────────────────────────────────────────────

/// Axes together with the candidate centers they generate.
#[derive(Clone, Debug)]
pub struct CandidateGrid {
    axes: Vec<Axis>,
    centers: Vec<Vec<f64>>,
}

impl CandidateGrid {
    /// Build axes from `bounds` and materialise every candidate center.
    pub fn build(bounds: &Bounds, intervals: usize) -> Self {
        let axes = build_axes(bounds, intervals);
        let centers = build_centers(&axes);
        Self { axes, centers }
    }

    /// Per-dimension axes.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Candidate centers in enumeration order.
    pub fn centers(&self) -> &[Vec<f64>] {
        &self.centers
    }

    /// Number of candidate centers.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// `true` when the grid has no candidates (no dimensions observed).
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Take ownership of the candidate centers.
    pub fn into_centers(self) -> Vec<Vec<f64>> {
        self.centers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds_of(points: &[&[f64]]) -> Bounds {
        let mut b = Bounds::new();
        for p in points {
            b.observe(p);
        }
        b
    }

    fn assert_strictly_increasing(axis: &Axis) {
        for w in axis.points().windows(2) {
            assert!(w[0] < w[1], "axis not strictly increasing: {:?}", axis.points());
        }
    }

    #[test]
    fn axis_has_intervals_plus_one_points() {
        for intervals in [1, 2, 5, 10, 37] {
            let axis = Axis::spanning(2.0, 15.0, intervals);
            assert_eq!(axis.len(), intervals + 1);
            assert_strictly_increasing(&axis);
        }
    }

    #[test]
    fn axis_start_is_shifted_below_min() {
        // range 13, 10 intervals → step 1.3, shift 0.1625, start 2 − 0.4875
        let axis = Axis::spanning(2.0, 15.0, 10);
        assert!((axis.step() - 1.3).abs() < 1e-12);
        assert!((axis.points()[0] - 1.5125).abs() < 1e-12);
        assert!((axis.points()[10] - (1.5125 + 13.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_intervals_clamped_to_one() {
        let axis = Axis::spanning(0.0, 4.0, 0);
        assert_eq!(axis.len(), 2);
        assert!((axis.step() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn zero_range_dimension_still_increases() {
        let axis = Axis::spanning(3.0, 3.0, 10);
        assert_eq!(axis.len(), 11);
        assert!(axis.step() > 0.0);
        assert!(axis.points()[0] < 3.0);
        assert_strictly_increasing(&axis);
    }

    #[test]
    fn zero_range_with_many_intervals_still_increases() {
        for (value, intervals) in [(1.0, 2000), (1.0, 5000), (-3.5e9, 10_000), (0.0, 100_000)] {
            let axis = Axis::spanning(value, value, intervals);
            assert_eq!(axis.len(), intervals + 1);
            assert_strictly_increasing(&axis);
        }
    }

    #[test]
    fn tiny_range_is_floored_per_step() {
        // 1e-9 / 2000 is below the floor at magnitude 1e6.
        let axis = Axis::spanning(1e6, 1e6 + 1e-9, 2000);
        assert!(axis.step() >= GRID_EPSILON * 1e6);
        assert_strictly_increasing(&axis);
    }

    #[test]
    fn build_axes_one_per_dimension() {
        let b = bounds_of(&[&[0.0, 10.0, -1.0], &[1.0, 20.0, 1.0]]);
        let axes = build_axes(&b, 4);
        assert_eq!(axes.len(), 3);
        assert!(axes.iter().all(|a| a.len() == 5));
    }

    #[test]
    fn centers_are_lexicographic_last_dimension_fastest() {
        let b = bounds_of(&[&[0.0, 0.0], &[1.0, 1.0]]);
        let axes = build_axes(&b, 2);
        let centers = build_centers(&axes);
        assert_eq!(centers.len(), 9);
        let x = axes[0].points();
        let y = axes[1].points();
        assert_eq!(centers[0], vec![x[0], y[0]]);
        assert_eq!(centers[1], vec![x[0], y[1]]);
        assert_eq!(centers[2], vec![x[0], y[2]]);
        assert_eq!(centers[3], vec![x[1], y[0]]);
        assert_eq!(centers[8], vec![x[2], y[2]]);
    }

    #[test]
    fn candidate_count_matches_product() {
        let b = bounds_of(&[&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]]);
        let axes = build_axes(&b, 3);
        assert_eq!(candidate_count(&axes), Some(64));
        assert_eq!(build_centers(&axes).len(), 64);
    }

    #[test]
    fn candidate_count_detects_overflow() {
        let axis = Axis::spanning(0.0, 1.0, 1 << 20);
        let axes = vec![axis; 8];
        assert_eq!(candidate_count(&axes), None);
    }

    #[test]
    fn no_dimensions_no_candidates() {
        let grid = CandidateGrid::build(&Bounds::new(), 10);
        assert!(grid.is_empty());
        assert!(grid.axes().is_empty());
        assert_eq!(candidate_count(&[]), Some(0));
    }

    #[test]
    fn many_dimensions_do_not_recurse() {
        // 16 dimensions with one interval each: 65 536 centers.
        let lo = vec![0.0; 16];
        let hi = vec![1.0; 16];
        let b = bounds_of(&[&lo, &hi]);
        let grid = CandidateGrid::build(&b, 1);
        assert_eq!(grid.len(), 1 << 16);
        assert_eq!(grid.centers()[0].len(), 16);
    }
}
