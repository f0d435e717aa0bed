//! # mountain-core
//!
//! Mountain clustering: find cluster centers in a set of entities without
//! knowing how many clusters there are.
//!
//! ---
//!
//! ## How it works
//!
//! Lay a regular grid over the feature space. Every grid point gets a
//! "mountain" whose height is the sum of exponentially decaying contributions
//! from every data point. Take the highest mountain as the first cluster
//! center, then flatten the landscape around it so its neighbours cannot win
//! the next round. Repeat. The grid points taken are abstract; each is finally
//! mapped to the nearest real entity not already chosen.
//!
//! > Dense regions raise mountains. Taking a peak destroys the mountain range
//! > around it.
//!
//! The number of clusters is not an input. It falls out of the data, the
//! grid resolution, and the two decay rates α (mountain width) and β
//! (destruction width).
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! Entities → FeatureIndex → CandidateGrid → PotentialField → PeakExtractor → resolve_centers
//!                ↑                               ↑                 ↑
//!         FeatureExtractor                 DistanceMetric, α   DistanceMetric, β
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`features`] | [`FeatureExtractor`], [`FeatureIndex`], [`Bounds`] | Entity → vector index with running bounds |
//! | [`distance`] | [`DistanceMetric`], [`Euclidean`] | Pluggable metrics (Euclidean, Manhattan, cosine) |
//! | [`grid`] | [`Axis`], [`CandidateGrid`] | Per-dimension axes and their Cartesian product |
//! | [`potential`] | [`PotentialField`] | Mountain potential per candidate; α estimation |
//! | [`peaks`] | [`PeakExtractor`], [`Peak`] | Select-highest-then-suppress state machine |
//! | [`resolve`] | [`ClusterResult`], [`ClusterCenter`] | Peaks → nearest unclaimed entities |
//! | [`config`] | [`MountainConfig`] | Intervals, α, β, seeding, limits |
//! | [`clustering`] | [`MountainClustering`] | The entry point wiring it all together |
//! | [`error`] | [`MountainError`] | Everything that can fail |
//!
//! ## Example
//!
//! ```rust
//! use mountain_core::{Euclidean, MountainClustering, MountainConfig};
//!
//! let mut engine = MountainClustering::new(|name: &&str| match *name {
//!     "a" => vec![2.0],
//!     "b" => vec![7.0],
//!     _ => vec![15.0],
//! });
//! engine.register_all(["a", "b", "c"]).unwrap();
//!
//! let config = MountainConfig::default().with_alpha(2.0).with_beta(4.5);
//! let clusters = engine.build_clusters(&config, &Euclidean).unwrap();
//! assert_eq!(clusters.len(), 3);
//! ```
//!
//! ## Cost
//!
//! The grid has `(intervals + 1)^dimensions` candidates and extraction is
//! quadratic in that count. Keep the dimensionality low; the default
//! [`MountainConfig::max_candidates`] refuses grids above one million cells.
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`MountainConfig`], [`Peak`],
//!   [`ClusterCenter`] and [`Bounds`].
//! - `python-ffi`: PyO3 bindings (`MountainClustering` Python class).
//!
//! ## License
//!
//! Business Source License 1.1.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod distance;
pub mod features;
pub mod grid;
pub mod potential;
pub mod peaks;
pub mod resolve;
pub mod config;
pub mod clustering;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use clustering::{AlphaSource, MountainClustering, ResolvedParameters};
pub use config::MountainConfig;
pub use distance::{Cosine, DistanceMetric, Euclidean, Manhattan};
pub use error::{MountainError, Result};
pub use features::{Bounds, Fallible, FeatureExtractor, FeatureIndex};
pub use grid::{Axis, CandidateGrid};
pub use peaks::{Peak, PeakExtractor};
pub use potential::PotentialField;
pub use resolve::{ClusterCenter, ClusterResult};
