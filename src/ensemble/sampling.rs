//! Parallel generation of candidate hyperplanes.
//!
//! Every task resamples a hyperplane from the training pool, weighs it against validators
//! drawn from the rest of the pool and measures the spread of its support points. Tasks
//! run on the runtime's worker pool and each seeds its own generator from the fit seed
//! and its index, so the outcome does not depend on scheduling.

use super::weights::weigh;
use crate::error::{Error, Result};
use crate::hyperplane::Hyperplane;
use crate::runtime::Runtime;
use crate::sample::Sample;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Golden-ratio increment separating the seeds of consecutive tasks.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// One sampled hyperplane with its validation weight and support diameter.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub hyperplane: Hyperplane,
    /// Training pool indices of the points the hyperplane passes through.
    pub support: Vec<usize>,
    pub weight: f64,
    pub diameter: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingTask {
    pub index: usize,
    pub seed: u64,
}

impl SamplingTask {
    pub fn new(index: usize, fit_seed: u64) -> Self {
        SamplingTask {
            index,
            seed: fit_seed.wrapping_add((index as u64).wrapping_mul(SEED_STRIDE)),
        }
    }

    pub fn run(&self, training: &[Sample], max_attempts: usize) -> Result<Candidate> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let sampled = Hyperplane::resample(training, max_attempts, &mut rng)?;
        let validators = draw_excluding(
            training.len(),
            &sampled.support,
            sampled.support.len(),
            &mut rng,
        )?;
        let weight = weigh(
            &sampled.hyperplane,
            validators.iter().map(|&i| &training[i]),
        )?;
        let diameter = diameter(training, &sampled.support);

        Ok(Candidate {
            hyperplane: sampled.hyperplane,
            support: sampled.support,
            weight,
            diameter,
        })
    }
}

/// Draw `count` distinct indices below `len`, skipping those in `exclude`.
pub(crate) fn draw_excluding<R: Rng + ?Sized>(
    len: usize,
    exclude: &[usize],
    count: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let available: Vec<usize> = (0..len).filter(|i| !exclude.contains(i)).collect();
    if available.len() < count {
        return Err(Error::InsufficientPoints {
            required: count,
            found: available.len(),
        });
    }
    Ok(index::sample(rng, available.len(), count)
        .into_iter()
        .map(|i| available[i])
        .collect())
}

/// Cyclic sum of distances between consecutive support points.
pub(crate) fn diameter(pool: &[Sample], support: &[usize]) -> f64 {
    let size = support.len();
    (0..size)
        .map(|i| pool[support[i]].distance(&pool[support[(i + 1) % size]]))
        .sum()
}

/// Run `count` sampling tasks on the runtime's pool and wait for all of them.
pub fn sample_candidates(
    runtime: &Runtime,
    training: &[Sample],
    count: usize,
    fit_seed: u64,
) -> Result<Vec<Candidate>> {
    let max_attempts = runtime.config().max_attempts;
    let tasks: Vec<SamplingTask> = (0..count)
        .map(|index| SamplingTask::new(index, fit_seed))
        .collect();

    let outcomes: Vec<Result<Candidate>> = runtime.install(|| {
        tasks
            .par_iter()
            .map(|task| task.run(training, max_attempts))
            .collect()
    });
    collect_outcomes(outcomes)
}

/// Keep successful outcomes in task order.
///
/// When any task failed, the failure with the highest task index is returned and the
/// others are logged.
pub(crate) fn collect_outcomes<T>(outcomes: Vec<Result<T>>) -> Result<Vec<T>> {
    let mut successes = Vec::with_capacity(outcomes.len());
    let mut failure: Option<(usize, Error)> = None;
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(value) => successes.push(value),
            Err(err) => {
                if let Some((previous, dropped)) = failure.replace((index, err)) {
                    log::warn!("sampling task {} failed: {}", previous, dropped);
                }
            }
        }
    }
    match failure {
        Some((_, err)) => Err(err),
        None => Ok(successes),
    }
}
