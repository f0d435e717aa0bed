//! Python FFI bindings via PyO3.
//!
//! Exposes mountain clustering over explicit feature vectors. Entities are the
//! insertion indices of the vectors; map them back to your own objects on the
//! Python side. For custom entity types and extractors, use the Rust API.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from mountain_core import MountainClustering
//!
//! mc = MountainClustering()
//! for x in [2.0, 2.1, 7.0, 7.2, 15.0]:
//!     mc.add([x])
//!
//! centers = mc.build_clusters(intervals=10, alpha=2.0, beta=4.5)
//! print(centers)   # {index: potential, ...} for the chosen center points
//! ```

#![allow(non_snake_case)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::clustering::MountainClustering;
use crate::config::MountainConfig;
use crate::distance::Euclidean;
use crate::error::MountainError;
use crate::features::{check_vector, Bounds};

fn to_py_err(err: MountainError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

// ── MountainClustering ───────────────────────────────────────────────────────

/// Mountain clustering over a list of feature vectors.
///
/// All vectors must have the same length; the first one added fixes it.
#[pyclass(name = "MountainClustering")]
pub struct PyMountainClustering {
    points: Vec<Vec<f64>>,
    bounds: Bounds,
}

#[pymethods]
impl PyMountainClustering {
    /// Create an empty clustering session.
    #[new]
    pub fn new() -> Self {
        Self { points: Vec::new(), bounds: Bounds::new() }
    }

    /// Add a feature vector and return its index.
    ///
    /// Raises ValueError if the vector is empty, contains NaN/inf, has a
    /// different length than the vectors already added, or widens the data
    /// beyond a finite range.
    pub fn add(&mut self, vector: Vec<f64>) -> PyResult<usize> {
        check_vector(&vector, &self.bounds).map_err(to_py_err)?;
        self.bounds.observe(&vector);
        self.points.push(vector);
        Ok(self.points.len() - 1)
    }

    /// Discover cluster centers.
    ///
    /// Args:
    ///     intervals: grid intervals per dimension (default 10)
    ///     alpha:     potential decay rate; None estimates it (default None)
    ///     beta:      suppression decay rate; None uses 2.25 × alpha (default None)
    ///     seed:      seed for the alpha estimate (default None)
    ///
    /// Returns:
    ///     dict mapping vector index → peak potential, one entry per center
    #[pyo3(signature = (intervals=10, alpha=None, beta=None, seed=None))]
    pub fn build_clusters(
        &self,
        intervals: usize,
        alpha: Option<f64>,
        beta: Option<f64>,
        seed: Option<u64>,
    ) -> PyResult<HashMap<usize, f64>> {
        let config = MountainConfig {
            intervals_per_dimension: intervals,
            alpha,
            beta,
            seed,
            ..MountainConfig::default()
        };
        let engine = self.engine().map_err(to_py_err)?;
        let result = engine.build_clusters(&config, &Euclidean).map_err(to_py_err)?;
        Ok(result.into_iter().map(|c| (c.entity, c.potential)).collect())
    }

    /// Number of vectors added.
    pub fn __len__(&self) -> usize {
        self.points.len()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!("MountainClustering(points={})", self.points.len())
    }
}

impl PyMountainClustering {
    fn engine(&self) -> Result<MountainClustering<usize, impl Fn(&usize) -> Vec<f64> + '_>, MountainError> {
        let points = &self.points;
        let mut engine = MountainClustering::new(move |i: &usize| points[*i].clone());
        engine.register_all(0..points.len())?;
        Ok(engine)
    }
}

impl Default for PyMountainClustering {
    fn default() -> Self {
        Self::new()
    }
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Mountain clustering Python bindings.
///
/// Grid-based density peaks over low-dimensional feature vectors.
#[pymodule]
pub fn mountain_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMountainClustering>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("DEFAULT_INTERVALS", crate::config::DEFAULT_INTERVALS)?;
    Ok(())
}
