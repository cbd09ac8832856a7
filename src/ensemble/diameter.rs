use super::{Candidate, EnsembleStrategy};
use crate::config::Config;

/// Oversamples `K * diameter_multiple` candidates and keeps the `K` whose support points
/// lie closest together.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiameterStrategy;

impl EnsembleStrategy for DiameterStrategy {
    fn name(&self) -> &'static str {
        "diameter"
    }

    fn candidate_count(&self, config: &Config) -> usize {
        config.ensemble_size * config.diameter_multiple
    }

    fn select(&self, mut candidates: Vec<Candidate>, config: &Config) -> Vec<Candidate> {
        // Stable, so equal diameters keep task order.
        candidates.sort_by(|a, b| a.diameter.total_cmp(&b.diameter));
        candidates.truncate(config.ensemble_size);
        candidates
    }
}
