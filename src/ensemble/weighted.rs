use super::{Candidate, EnsembleStrategy};
use crate::config::Config;

/// Samples `K` candidates and averages every one of them by weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedStrategy;

impl EnsembleStrategy for WeightedStrategy {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn candidate_count(&self, config: &Config) -> usize {
        config.ensemble_size
    }

    fn select(&self, candidates: Vec<Candidate>, _config: &Config) -> Vec<Candidate> {
        candidates
    }
}
