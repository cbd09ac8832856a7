// Serialization tests
//
// Trees, hyperplanes and configurations survive a JSON round trip with predictions
// unchanged.

use hyperplane_tree::{Algorithm, Config, Error, Hyperplane, RegressionTree, Sample};
use std::fs;
use tempfile::tempdir;

// ============================================================================
// Helper functions
// ============================================================================

/// Points on z = x - 2y + 4 scattered over a small grid.
fn grid_points() -> Vec<Sample> {
    let mut points = Vec::new();
    for i in 0..5 {
        for j in 0..4 {
            let (x, y) = (i as f64, (j * j) as f64 + 0.5 * i as f64);
            points.push(Sample::new(vec![x, y], x - 2.0 * y + 4.0));
        }
    }
    points
}

fn fit_tree() -> RegressionTree {
    for seed in 0..16 {
        match RegressionTree::fit(&grid_points(), Config::new().with_seed(seed)) {
            Ok(tree) => return tree,
            Err(Error::SamplingExhausted { .. }) => continue,
            Err(err) => panic!("unexpected tree failure: {}", err),
        }
    }
    panic!("no seed produced a tree");
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_tree_save_load() {
    let tree = fit_tree();
    let probes = vec![
        Sample::unlabeled(vec![0.5, 1.0]),
        Sample::unlabeled(vec![3.0, 7.5]),
        Sample::unlabeled(vec![10.0, -2.0]),
    ];
    let before = tree.predict_many(&probes).unwrap();

    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("tree.json");
    fs::write(&path, serde_json::to_string(&tree).unwrap()).unwrap();

    let loaded: RegressionTree =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, tree);
    assert_eq!(loaded.predict_many(&probes).unwrap(), before);
}

#[test]
fn test_hyperplane_round_trip() {
    let hyperplane = Hyperplane::from_coefficients(vec![3.0, 2.0, 2.0]).unwrap();
    let json = serde_json::to_string(&hyperplane).unwrap();
    let loaded: Hyperplane = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, hyperplane);
}

#[test]
fn test_config_from_partial_json() {
    let config: Config =
        serde_json::from_str(r#"{"algorithm": "weighted", "ensemble_size": 6, "seed": 4}"#)
            .unwrap();
    assert_eq!(config.algorithm, Algorithm::Weighted);
    assert_eq!(config.ensemble_size, 6);
    assert_eq!(config.seed, Some(4));
    assert_eq!(config.concurrency_limit, Config::default().concurrency_limit);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_rejects_unknown_algorithm() {
    let result: Result<Config, _> = serde_json::from_str(r#"{"algorithm": "ridge"}"#);
    assert!(result.is_err());
}
