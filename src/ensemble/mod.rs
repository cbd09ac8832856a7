//! Randomized hyperplane ensembles.
//!
//! An [`EnsembleModel`] holds a training pool and a test set disjoint from it. Executing it samples
//! candidate hyperplanes from the training pool in parallel, lets the configured
//! [`EnsembleStrategy`] pick which candidates to keep and averages them by validation
//! weight into one hyperplane.

mod diameter;
pub mod sampling;
mod weighted;
pub mod weights;

pub use diameter::DiameterStrategy;
pub use sampling::{sample_candidates, Candidate, SamplingTask};
pub use weighted::WeightedStrategy;
pub use weights::{average, weigh, MAX_WEIGHT};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::evaluation::root_mean_squared_error;
use crate::hyperplane::Hyperplane;
use crate::runtime::Runtime;
use crate::sample::{self, Sample};
use ndarray::Array1;
use rand::seq::index;
use rand::Rng;

/// How an ensemble turns sampled candidates into one hyperplane.
pub trait EnsembleStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of sampling tasks to run per fit.
    fn candidate_count(&self, config: &Config) -> usize;

    /// Choose the candidates that enter the weighted average.
    fn select(&self, candidates: Vec<Candidate>, config: &Config) -> Vec<Candidate>;

    fn execute(&self, runtime: &Runtime, training: &[Sample], seed: u64) -> Result<Hyperplane> {
        let config = runtime.config();
        let candidates =
            sample_candidates(runtime, training, self.candidate_count(config), seed)?;
        let selected = self.select(candidates, config);
        log::trace!(
            "{} strategy averaging {} candidates",
            self.name(),
            selected.len()
        );

        let (hyperplanes, weights): (Vec<Hyperplane>, Vec<f64>) = selected
            .into_iter()
            .map(|candidate| (candidate.hyperplane, candidate.weight))
            .unzip();
        average(&hyperplanes, &weights)
    }
}

/// Disjoint training and test partitions of a point set.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub training: Vec<Sample>,
    pub test: Vec<Sample>,
}

impl TrainTestSplit {
    /// Hold out `max(floor(n * test_fraction), d + 1)` points chosen uniformly at random.
    ///
    /// Requires at least `3 * (d + 1)` points. Both partitions keep the input order.
    pub fn derive<R: Rng + ?Sized>(
        points: &[Sample],
        test_fraction: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let dimensions = sample::common_dimensions(points)?;
        require_points(points.len(), 3 * dimensions)?;
        ensure_labelled(points)?;

        let n_test = ((points.len() as f64 * test_fraction).floor() as usize)
            .max(dimensions)
            .min(points.len());
        let mut held_out = vec![false; points.len()];
        for i in index::sample(rng, points.len(), n_test) {
            held_out[i] = true;
        }

        let mut training = Vec::with_capacity(points.len() - n_test);
        let mut test = Vec::with_capacity(n_test);
        for (point, &is_test) in points.iter().zip(&held_out) {
            if is_test {
                test.push(point.clone());
            } else {
                training.push(point.clone());
            }
        }
        Ok(TrainTestSplit { training, test })
    }

    /// Test on `test` and train on the points of `points` that are not in it.
    ///
    /// Points equal to a test point are removed from training. At least `2 * (d + 1)`
    /// training points must remain and the test set must be non-empty.
    pub fn supplied(points: &[Sample], test: &[Sample]) -> Result<Self> {
        let dimensions = sample::common_dimensions(points.iter().chain(test))?;
        let training: Vec<Sample> = points
            .iter()
            .filter(|point| !test.contains(point))
            .cloned()
            .collect();
        require_points(training.len(), 2 * dimensions)?;
        require_points(test.len(), 1)?;
        ensure_labelled(&training)?;
        ensure_labelled(test)?;

        Ok(TrainTestSplit {
            training,
            test: test.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.training.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn require_points(found: usize, required: usize) -> Result<()> {
    if found < required {
        return Err(Error::InsufficientPoints { required, found });
    }
    Ok(())
}

fn ensure_labelled(points: &[Sample]) -> Result<()> {
    match points.iter().position(|p| p.target().is_none()) {
        Some(index) => Err(Error::MissingTarget { index }),
        None => Ok(()),
    }
}

/// An ensemble fit over one point set.
#[derive(Debug, Clone)]
pub struct EnsembleModel {
    runtime: Runtime,
    split: TrainTestSplit,
    seed: u64,
    hyperplane: Option<Hyperplane>,
}

impl EnsembleModel {
    /// Split `points` for a fit, holding out `test` when given or a random share otherwise.
    ///
    /// Draws the split and the fit seed from `rng`.
    pub fn new<R: Rng + ?Sized>(
        runtime: &Runtime,
        points: &[Sample],
        test: Option<&[Sample]>,
        rng: &mut R,
    ) -> Result<Self> {
        let split = match test {
            Some(test) => TrainTestSplit::supplied(points, test)?,
            None => TrainTestSplit::derive(points, runtime.config().test_fraction, rng)?,
        };
        Ok(EnsembleModel {
            runtime: runtime.clone(),
            split,
            seed: rng.random(),
            hyperplane: None,
        })
    }

    /// Sample, select and average candidates with the configured strategy.
    pub fn execute(&mut self) -> Result<&Hyperplane> {
        let strategy = self.runtime.config().algorithm.strategy();
        let hyperplane = strategy.execute(&self.runtime, &self.split.training, self.seed)?;
        Ok(&*self.hyperplane.insert(hyperplane))
    }

    pub fn is_fitted(&self) -> bool {
        self.hyperplane.is_some()
    }

    pub fn hyperplane(&self) -> Result<&Hyperplane> {
        self.hyperplane.as_ref().ok_or(Error::NotFitted)
    }

    pub fn into_hyperplane(self) -> Result<Hyperplane> {
        self.hyperplane.ok_or(Error::NotFitted)
    }

    pub fn solve(&self, sample: &Sample) -> Result<f64> {
        self.hyperplane()?.try_solve(sample)
    }

    /// RMSE over the held-out test set.
    pub fn error(&self) -> Result<f64> {
        self.error_on(&self.split.test)
    }

    /// RMSE over `test`.
    pub fn error_on(&self, test: &[Sample]) -> Result<f64> {
        let hyperplane = self.hyperplane()?;
        require_points(test.len(), 1)?;
        ensure_labelled(test)?;

        let predicted = test
            .iter()
            .map(|s| hyperplane.try_solve(s))
            .collect::<Result<Array1<f64>>>()?;
        let actual: Array1<f64> = test
            .iter()
            .map(|s| s.target().unwrap_or(f64::NAN))
            .collect();
        Ok(root_mean_squared_error(&predicted, &actual))
    }

    pub fn training(&self) -> &[Sample] {
        &self.split.training
    }

    pub fn test(&self) -> &[Sample] {
        &self.split.test
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
