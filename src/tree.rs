//! Piecewise-linear regression tree.
//!
//! The tree recursively partitions feature space. Every node fits an ensemble hyperplane to
//! its points; a node splits when some axis-aligned cut lowers the size-weighted validation
//! error of the two halves below its own. Leaves keep their hyperplane for prediction.

use crate::config::{Algorithm, Config};
use crate::ensemble::EnsembleModel;
use crate::error::{Error, Result};
use crate::evaluation::root_mean_squared_error;
use crate::hyperplane::Hyperplane;
use crate::runtime::Runtime;
use crate::sample::{self, Sample};
use ndarray::Array1;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Terminal region of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub hyperplane: Hyperplane,
    /// Validation RMSE of the ensemble that produced the hyperplane.
    pub error: f64,
    /// Number of points the region was fitted on.
    pub n_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf(Leaf),
    /// Samples with `feature <= threshold` go left, the rest right. The threshold is the
    /// largest split-feature value among the left training points, so ties route left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }

    /// Walk down to the leaf whose region contains `sample`.
    pub fn leaf_for(&self, sample: &Sample) -> &Leaf {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return leaf,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample.feature(*feature) <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Number of splits on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Leaves from left to right.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                TreeNode::Leaf(leaf) => leaves.push(leaf),
                TreeNode::Split { left, right, .. } => {
                    stack.push(&**right);
                    stack.push(&**left);
                }
            }
        }
        leaves
    }
}

/// A fitted piecewise-linear regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
    dimensions: usize,
    algorithm: Algorithm,
}

impl RegressionTree {
    /// Fit a tree to `points`, sampling on the process-wide pool for the configured
    /// concurrency limit.
    pub fn fit(points: &[Sample], config: Config) -> Result<Self> {
        let runtime = Runtime::new(config)?;
        Self::fit_with(&runtime, points)
    }

    /// Fit a tree to `points` on an existing runtime, e.g. one from
    /// [`Runtime::dedicated`].
    pub fn fit_with(runtime: &Runtime, points: &[Sample]) -> Result<Self> {
        let dimensions = sample::common_dimensions(points)?;
        let config = runtime.config();
        log::info!(
            "growing {} tree on {} points of dimension {}",
            config.algorithm,
            points.len(),
            dimensions
        );

        let mut rng = runtime.rng();
        let mut model = EnsembleModel::new(runtime, points, None, &mut rng)?;
        model.execute()?;

        let mut grower = Grower {
            runtime,
            rng,
            min_points: config.min_split_multiple * dimensions,
            max_depth: config.max_depth,
        };
        let root = grower.grow(points.to_vec(), model, 0)?;
        log::info!(
            "tree complete: {} leaves, depth {}",
            root.leaf_count(),
            root.depth()
        );

        Ok(RegressionTree {
            root,
            dimensions,
            algorithm: config.algorithm,
        })
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// The hyperplane of the leaf that serves `sample`.
    pub fn hyperplane(&self, sample: &Sample) -> Result<&Hyperplane> {
        self.check_dimensions(sample)?;
        Ok(&self.root.leaf_for(sample).hyperplane)
    }

    pub fn predict(&self, sample: &Sample) -> Result<f64> {
        self.hyperplane(sample)?.try_solve(sample)
    }

    pub fn predict_many(&self, samples: &[Sample]) -> Result<Array1<f64>> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    /// Fill the target slot of every sample with its prediction.
    pub fn predict_into(&self, samples: &mut [Sample]) -> Result<()> {
        for sample in samples.iter_mut() {
            let value = self.predict(sample)?;
            sample.set_target(value);
        }
        Ok(())
    }

    /// RMSE of the predictions against the targets of `test`.
    pub fn error(&self, test: &[Sample]) -> Result<f64> {
        if test.is_empty() {
            return Err(Error::InsufficientPoints {
                required: 1,
                found: 0,
            });
        }
        let predicted = self.predict_many(test)?;
        let actual = test
            .iter()
            .enumerate()
            .map(|(index, s)| s.target().ok_or(Error::MissingTarget { index }))
            .collect::<Result<Array1<f64>>>()?;
        Ok(root_mean_squared_error(&predicted, &actual))
    }

    fn check_dimensions(&self, sample: &Sample) -> Result<()> {
        if sample.dimensions() != self.dimensions {
            return Err(Error::ShapeMismatch {
                expected: self.dimensions,
                found: sample.dimensions(),
            });
        }
        Ok(())
    }
}

/// Best cut found so far while searching one node.
struct SplitChoice {
    feature: usize,
    threshold: f64,
    error: f64,
    left_points: Vec<Sample>,
    right_points: Vec<Sample>,
    left: EnsembleModel,
    right: EnsembleModel,
}

struct Grower<'a> {
    runtime: &'a Runtime,
    rng: StdRng,
    min_points: usize,
    max_depth: Option<u32>,
}

impl Grower<'_> {
    fn grow(
        &mut self,
        mut points: Vec<Sample>,
        model: EnsembleModel,
        depth: u32,
    ) -> Result<TreeNode> {
        let node_error = model.error()?;
        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        if points.len() < 2 * self.min_points || depth_reached {
            log::debug!(
                "leaf at depth {} with {} points, error {:.6}",
                depth,
                points.len(),
                node_error
            );
            return make_leaf(model, node_error, points.len());
        }

        match self.search(&mut points, node_error)? {
            Some(choice) => {
                log::debug!(
                    "split at depth {} on feature {} <= {} ({} | {}), error {:.6} -> {:.6}",
                    depth,
                    choice.feature,
                    choice.threshold,
                    choice.left_points.len(),
                    choice.right_points.len(),
                    node_error,
                    choice.error
                );
                let left = self.grow(choice.left_points, choice.left, depth + 1)?;
                let right = self.grow(choice.right_points, choice.right, depth + 1)?;
                Ok(TreeNode::Split {
                    feature: choice.feature,
                    threshold: choice.threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            None => {
                log::debug!(
                    "no cut improves on error {:.6}, leaf at depth {} with {} points",
                    node_error,
                    depth,
                    points.len()
                );
                make_leaf(model, node_error, points.len())
            }
        }
    }

    /// Try every feature and every admissible cut position; return the first cut with the
    /// lowest weighted error if it beats `node_error`.
    fn search(
        &mut self,
        points: &mut [Sample],
        node_error: f64,
    ) -> Result<Option<SplitChoice>> {
        let n = points.len();
        let n_features = points[0].n_features();
        let mut best: Option<SplitChoice> = None;
        let mut best_error = node_error;

        for feature in 0..n_features {
            points.sort_by(|a, b| a.feature(feature).total_cmp(&b.feature(feature)));
            for i in self.min_points..=(n - self.min_points) {
                let (left_points, right_points) = points.split_at(i);
                let (left, right) = match self.fit_pair(left_points, right_points) {
                    Ok(pair) => pair,
                    Err(err) if err.is_fitting_failure() => {
                        log::trace!("skipping cut {} on feature {}: {}", i, feature, err);
                        continue;
                    }
                    Err(err) => return Err(err),
                };

                let error = (i as f64 / n as f64) * left.error()?
                    + ((n - i) as f64 / n as f64) * right.error()?;
                if error < best_error {
                    best_error = error;
                    best = Some(SplitChoice {
                        feature,
                        threshold: left_points[i - 1].feature(feature),
                        error,
                        left_points: left_points.to_vec(),
                        right_points: right_points.to_vec(),
                        left,
                        right,
                    });
                }
            }
        }
        Ok(best)
    }

    fn fit_pair(
        &mut self,
        left_points: &[Sample],
        right_points: &[Sample],
    ) -> Result<(EnsembleModel, EnsembleModel)> {
        let mut left = EnsembleModel::new(self.runtime, left_points, None, &mut self.rng)?;
        left.execute()?;
        let mut right = EnsembleModel::new(self.runtime, right_points, None, &mut self.rng)?;
        right.execute()?;
        Ok((left, right))
    }
}

fn make_leaf(model: EnsembleModel, error: f64, n_samples: usize) -> Result<TreeNode> {
    Ok(TreeNode::Leaf(Leaf {
        hyperplane: model.into_hyperplane()?,
        error,
        n_samples,
    }))
}
