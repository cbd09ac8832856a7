//! Piecewise-linear regression example.
//!
//! This example demonstrates:
//! - Building samples from parsed `id,target,features...` records
//! - Growing a regression tree over a function with a kink
//! - Grouping points by the leaf hyperplane that serves them
//! - Evaluating predictions on held-out data

use hyperplane_tree::evaluation::root_mean_squared_error;
use hyperplane_tree::{Config, RegressionTree, Sample, TreeNode};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RECORDS: &str = "\
id,target,x,y
1,4.2,1.0,1.0
2,7.1,2.0,1.0
3,9.8,3.0,0.5
4,13.3,4.0,1.2
";

/// z = 3x + y for x <= 5, then the slope flips to -2.
fn kinked(x: f64, y: f64) -> f64 {
    if x <= 5.0 {
        3.0 * x + y
    } else {
        15.0 - 2.0 * (x - 5.0) + y
    }
}

fn generate(n: usize, rng: &mut StdRng) -> Vec<Sample> {
    (0..n)
        .map(|_| {
            let x: f64 = rng.random_range(0.0..10.0);
            let y: f64 = rng.random_range(0.0..4.0);
            Sample::new(vec![x, y], kinked(x, y) + rng.random_range(-0.05..0.05))
        })
        .collect()
}

fn describe(node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        TreeNode::Leaf(leaf) => {
            let coefficients: Vec<String> = leaf
                .hyperplane
                .coefficients()
                .iter()
                .map(|c| format!("{:.3}", c))
                .collect();
            println!(
                "{}leaf: [{}] ({} points, validation RMSE {:.4})",
                indent,
                coefficients.join(", "),
                leaf.n_samples,
                leaf.error
            );
        }
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            println!("{}x[{}] <= {:.3}", indent, feature, threshold);
            describe(left, depth + 1);
            println!("{}x[{}] > {:.3}", indent, feature, threshold);
            describe(right, depth + 1);
        }
    }
}

fn main() {
    println!("Piecewise-Linear Regression Example");
    println!("===================================\n");

    // Parsed records carry an identifier column that is ignored
    let parsed: Vec<Sample> = RECORDS
        .lines()
        .skip(1)
        .map(|line| {
            let row: Vec<f64> = line
                .split(',')
                .map(|field| field.trim().parse().expect("numeric field"))
                .collect();
            Sample::from_record(&row).expect("well-formed record")
        })
        .collect();
    println!("Parsed {} records from text\n", parsed.len());

    let mut rng = StdRng::seed_from_u64(42);
    let mut train = generate(60, &mut rng);
    train.extend(parsed);
    let test = generate(40, &mut rng);

    let config = Config::new().with_seed(7).with_ensemble_size(10);
    println!("Configuration:\n{}", config);

    println!("Growing tree on {} samples...", train.len());
    let tree = RegressionTree::fit(&train, config).expect("Failed to fit tree");
    println!(
        "Tree complete: {} leaves, depth {}\n",
        tree.leaf_count(),
        tree.depth()
    );
    describe(tree.root(), 0);

    // Count how many test points each leaf hyperplane serves
    let leaves = tree.root().leaves();
    let mut served = vec![0usize; leaves.len()];
    for sample in &test {
        let hyperplane = tree.hyperplane(sample).expect("matching dimensions");
        if let Some(i) = leaves.iter().position(|l| &l.hyperplane == hyperplane) {
            served[i] += 1;
        }
    }
    println!("\nTest points per leaf: {:?}", served);

    let predicted = tree.predict_many(&test).expect("matching dimensions");
    let actual: Array1<f64> = test.iter().filter_map(|s| s.target()).collect();
    println!("\nTest Set Performance:");
    println!("  Samples: {}", actual.len());
    println!("  RMSE:    {:.4}", root_mean_squared_error(&predicted, &actual));

    // Fill the target slots of unlabeled samples
    let mut queries = vec![
        Sample::unlabeled(vec![2.0, 1.0]),
        Sample::unlabeled(vec![8.0, 1.0]),
    ];
    tree.predict_into(&mut queries).expect("matching dimensions");
    println!("\nSample Predictions:");
    for query in &queries {
        let features = query.features();
        println!(
            "  f({:.1}, {:.1}) = {:.3} (true {:.3})",
            features[0],
            features[1],
            query.target().unwrap_or(f64::NAN),
            kinked(features[0], features[1])
        );
    }
}
