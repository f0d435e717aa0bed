//! Serialization of configuration and results (`serde` feature).

#![cfg(feature = "serde")]

use mountain_core::{Bounds, ClusterCenter, Euclidean, MountainClustering, MountainConfig, Peak};

#[test]
fn config_round_trips() {
    let config = MountainConfig::default()
        .with_intervals(16)
        .with_alpha(1.5)
        .with_seed(7)
        .with_min_peak_ratio(0.25);
    let json = serde_json::to_string(&config).unwrap();
    let back: MountainConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, back);
}

#[test]
fn missing_config_fields_take_defaults() {
    let config: MountainConfig = serde_json::from_str(r#"{ "intervals_per_dimension": 4 }"#).unwrap();
    assert_eq!(config.intervals_per_dimension, 4);
    assert_eq!(config.alpha_sample_pairs, MountainConfig::default().alpha_sample_pairs);
    assert_eq!(config.max_candidates, MountainConfig::default().max_candidates);
}

#[test]
fn cluster_centers_serialize_with_entity() {
    let mut engine = MountainClustering::new(|s: &String| vec![s.len() as f64]);
    engine
        .register_all(["a", "bbbbbb", "cccccccccccc"].map(String::from))
        .unwrap();
    let config = MountainConfig::default().with_alpha(2.0).with_beta(4.5);
    let result = engine.build_clusters(&config, &Euclidean).unwrap();

    let centers: Vec<ClusterCenter<String>> = result.into_iter().collect();
    let json = serde_json::to_string(&centers).unwrap();
    let back: Vec<ClusterCenter<String>> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), 3);
    for (a, b) in centers.iter().zip(&back) {
        assert_eq!(a.entity, b.entity);
        assert_eq!(a.rank, b.rank);
        assert!((a.potential - b.potential).abs() < 1e-12);
        assert_eq!(a.center.len(), b.center.len());
    }
}

#[test]
fn peaks_and_bounds_round_trip() {
    let peak = Peak { rank: 2, candidate: 17, center: vec![0.5, -1.25], potential: 3.75 };
    let back: Peak = serde_json::from_str(&serde_json::to_string(&peak).unwrap()).unwrap();
    assert_eq!(peak, back);

    let mut bounds = Bounds::new();
    bounds.observe(&[1.0, 2.0]);
    bounds.observe(&[-1.0, 4.0]);
    let back: Bounds = serde_json::from_str(&serde_json::to_string(&bounds).unwrap()).unwrap();
    assert_eq!(bounds, back);
}
