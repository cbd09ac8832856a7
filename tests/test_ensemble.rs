//! Hyperplane fitting and ensemble tests.
//!
//! Ensembles draw their test split at random, so tests over point sets with a single
//! off-line point try several seeds and accept the first one that keeps that point in
//! the training pool.

use approx::assert_relative_eq;
use hyperplane_tree::ensemble::{average, weigh, TrainTestSplit};
use hyperplane_tree::{
    Algorithm, Config, EnsembleModel, Error, Hyperplane, Runtime, Sample, MAX_WEIGHT,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Helper functions
// ============================================================================

/// Ten points on z = 3x + 2y + 2.
fn perfect_plane_points() -> Vec<Sample> {
    vec![
        Sample::new(vec![2.0, 2.0], 12.0),
        Sample::new(vec![3.0, 4.0], 19.0),
        Sample::new(vec![4.0, 5.0], 24.0),
        Sample::new(vec![5.0, 6.0], 29.0),
        Sample::new(vec![6.0, 7.0], 34.0),
        Sample::new(vec![7.0, 8.0], 39.0),
        Sample::new(vec![8.0, 9.0], 44.0),
        Sample::new(vec![9.0, 10.0], 49.0),
        Sample::new(vec![10.0, 11.0], 54.0),
        Sample::new(vec![11.0, 12.0], 59.0),
    ]
}

fn identical_points() -> Vec<Sample> {
    vec![Sample::new(vec![2.0, 2.0], 12.0); 9]
}

fn ensemble_config(algorithm: Algorithm) -> Config {
    Config::new()
        .with_algorithm(algorithm)
        .with_ensemble_size(10)
        .with_diameter_multiple(2)
        .with_concurrency_limit(4)
        .with_max_attempts(200)
}

/// Execute an ensemble over `points` for successive seeds until one succeeds.
fn execute_any_seed(points: &[Sample], config: Config) -> Hyperplane {
    for seed in 0..32 {
        let runtime = Runtime::new(config.clone().with_seed(seed)).unwrap();
        let mut rng = runtime.rng();
        let mut model = EnsembleModel::new(&runtime, points, None, &mut rng).unwrap();
        match model.execute() {
            Ok(hyperplane) => return hyperplane.clone(),
            Err(Error::SamplingExhausted { .. }) => continue,
            Err(err) => panic!("unexpected ensemble failure: {}", err),
        }
    }
    panic!("no seed produced an ensemble");
}

fn assert_coefficients(hyperplane: &Hyperplane, expected: &[f64]) {
    assert_eq!(hyperplane.len(), expected.len());
    for (c, e) in hyperplane.coefficients().iter().zip(expected) {
        assert_relative_eq!(*c, *e, epsilon = 1e-6);
    }
}

// ============================================================================
// Hyperplane primitive
// ============================================================================

#[test]
fn test_fit_exact_line() {
    let points = vec![Sample::new(vec![1.0], 3.0), Sample::new(vec![3.0], 7.0)];
    let hyperplane = Hyperplane::fit_exact(&points).unwrap();
    assert_coefficients(&hyperplane, &[2.0, 1.0]);
    assert_relative_eq!(
        hyperplane.solve(&Sample::unlabeled(vec![5.0])),
        11.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_fit_exact_plane() {
    let points = &perfect_plane_points()[..3];
    let hyperplane = Hyperplane::fit_exact(points).unwrap();
    assert_coefficients(&hyperplane, &[3.0, 2.0, 2.0]);
    assert_relative_eq!(
        hyperplane.solve(&Sample::unlabeled(vec![5.0, 6.0])),
        29.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_fit_least_squares_plane() {
    let hyperplane = Hyperplane::fit(&perfect_plane_points()).unwrap();
    assert_coefficients(&hyperplane, &[3.0, 2.0, 2.0]);
}

#[test]
fn test_identical_points_are_degenerate() {
    let points = identical_points();
    assert!(matches!(
        Hyperplane::fit_exact(&points[..3]),
        Err(Error::Degenerate)
    ));
    assert!(matches!(
        Hyperplane::fit_least_squares(&points),
        Err(Error::Degenerate)
    ));
}

// ============================================================================
// Weights and averaging
// ============================================================================

#[test]
fn test_weigh_and_average() {
    let exact = Hyperplane::from_coefficients(vec![2.0, 1.0]).unwrap();
    let shifted = Hyperplane::from_coefficients(vec![2.0, 1.5]).unwrap();
    let validators = vec![Sample::new(vec![1.0], 3.0), Sample::new(vec![2.0], 5.0)];

    let exact_weight = weigh(&exact, &validators).unwrap();
    let shifted_weight = weigh(&shifted, &validators).unwrap();
    assert_eq!(exact_weight, MAX_WEIGHT);
    assert_relative_eq!(shifted_weight, 2.0, epsilon = 1e-9);

    let averaged = average(
        &[shifted.clone(), exact.clone()],
        &[shifted_weight, exact_weight],
    )
    .unwrap();
    assert_eq!(averaged, exact);
}

// ============================================================================
// Ensembles
// ============================================================================

#[test]
fn test_diameter_ensemble_perfect_plane() {
    let hyperplane = execute_any_seed(
        &perfect_plane_points(),
        ensemble_config(Algorithm::Diameter),
    );
    assert_coefficients(&hyperplane, &[3.0, 2.0, 2.0]);
}

#[test]
fn test_weighted_ensemble_perfect_plane() {
    let hyperplane = execute_any_seed(
        &perfect_plane_points(),
        ensemble_config(Algorithm::Weighted),
    );
    assert_coefficients(&hyperplane, &[3.0, 2.0, 2.0]);
}

#[test]
fn test_ensemble_identical_points_fail() {
    let runtime = Runtime::new(ensemble_config(Algorithm::Diameter).with_seed(1)).unwrap();
    let mut rng = runtime.rng();
    let mut model = EnsembleModel::new(&runtime, &identical_points(), None, &mut rng).unwrap();
    assert!(matches!(
        model.execute(),
        Err(Error::SamplingExhausted { attempts: 200 })
    ));
    assert!(!model.is_fitted());
    assert!(matches!(model.error(), Err(Error::NotFitted)));
}

#[test]
fn test_ensemble_too_few_points() {
    let runtime = Runtime::new(Config::new()).unwrap();
    let mut rng = runtime.rng();
    let points = &perfect_plane_points()[..8];
    assert!(matches!(
        EnsembleModel::new(&runtime, points, None, &mut rng),
        Err(Error::InsufficientPoints {
            required: 9,
            found: 8
        })
    ));
}

#[test]
fn test_ensemble_with_supplied_test_set() {
    let points = perfect_plane_points();
    let (test, training) = points.split_at(2);
    let runtime = Runtime::new(ensemble_config(Algorithm::Diameter).with_seed(9)).unwrap();
    let mut rng = runtime.rng();
    let model = EnsembleModel::new(&runtime, training, Some(test), &mut rng).unwrap();
    assert_eq!(model.training().len(), 8);
    assert_eq!(model.test().len(), 2);
}

#[test]
fn test_supplied_test_set_drawn_from_points() {
    // The test set is a subset of the points handed to the model
    let points = perfect_plane_points();
    let test = &points[..2];
    let runtime = Runtime::new(ensemble_config(Algorithm::Diameter).with_seed(9)).unwrap();
    let mut rng = runtime.rng();
    let model = EnsembleModel::new(&runtime, &points, Some(test), &mut rng).unwrap();
    assert_eq!(model.test().len(), 2);
    assert_eq!(model.training().len(), 8);
    assert_eq!(model.training().len() + model.test().len(), points.len());
    assert!(model.training().iter().all(|p| !test.contains(p)));
}

#[test]
fn test_split_is_a_partition() {
    // distinct targets identify every point
    let points: Vec<Sample> = (0..25)
        .map(|i| Sample::new(vec![i as f64, (i * i % 7) as f64], i as f64))
        .collect();
    let mut rng = StdRng::seed_from_u64(12);
    let split = TrainTestSplit::derive(&points, 0.3, &mut rng).unwrap();
    assert_eq!(split.test.len(), 7);
    assert_eq!(split.training.len() + split.test.len(), points.len());

    let mut seen: Vec<f64> = split
        .training
        .iter()
        .chain(&split.test)
        .map(|s| s.target().unwrap())
        .collect();
    seen.sort_by(f64::total_cmp);
    let expected: Vec<f64> = (0..25).map(|i| i as f64).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_same_seed_same_hyperplane() {
    let points: Vec<Sample> = (0..20)
        .map(|i| {
            let (x, y) = (i as f64, (i * 3 % 5) as f64);
            Sample::new(vec![x, y], x - 0.5 * y + (i % 3) as f64 * 0.1)
        })
        .collect();
    let config = ensemble_config(Algorithm::Diameter).with_seed(77);

    let run = || {
        let runtime = Runtime::new(config.clone()).unwrap();
        let mut rng = runtime.rng();
        let mut model = EnsembleModel::new(&runtime, &points, None, &mut rng).unwrap();
        model.execute().unwrap().clone()
    };
    assert_eq!(run(), run());
}
