//! Hyperparameters for ensemble fitting and tree growth.
//!
//! The values are plain data; reading them from a file is left to the caller.

use crate::ensemble::{DiameterStrategy, EnsembleStrategy, WeightedStrategy};
use crate::error::{Error, Result};
use crate::hyperplane::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ensembling strategy used to turn sampled hyperplanes into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Oversample `K * diameter_multiple` candidates and average the `K` with the smallest
    /// diameter.
    #[default]
    Diameter,
    /// Sample `K` candidates and average all of them.
    Weighted,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Diameter => "diameter",
            Algorithm::Weighted => "weighted",
        }
    }

    /// Resolve the strategy implementation for this identifier.
    pub fn strategy(&self) -> Box<dyn EnsembleStrategy> {
        match self {
            Algorithm::Diameter => Box::new(DiameterStrategy),
            Algorithm::Weighted => Box::new(WeightedStrategy),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diameter" => Ok(Algorithm::Diameter),
            "weighted" => Ok(Algorithm::Weighted),
            other => Err(Error::InvalidConfig(format!("unknown algorithm '{}'", other))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub algorithm: Algorithm,
    /// Number of hyperplanes averaged into one model (K).
    pub ensemble_size: usize,
    /// Oversampling factor of the diameter strategy.
    pub diameter_multiple: usize,
    /// Maximum number of sampling tasks running at once.
    pub concurrency_limit: usize,
    /// Resample ceiling before giving up on a point pool.
    pub max_attempts: usize,
    /// Share of the points held out for testing when no test set is supplied.
    pub test_fraction: f64,
    /// Minimum points per side of a split, in multiples of the dimensionality.
    pub min_split_multiple: usize,
    /// Depth at which nodes stop splitting. The root is at depth 0.
    pub max_depth: Option<u32>,
    /// Seed for every random draw of a fit. `None` seeds from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            algorithm: Algorithm::Diameter,
            ensemble_size: 10,
            diameter_multiple: 2,
            concurrency_limit: 4,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            test_fraction: 0.3,
            min_split_multiple: 3,
            max_depth: None,
            seed: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_ensemble_size(mut self, k: usize) -> Self {
        self.ensemble_size = k;
        self
    }

    pub fn with_diameter_multiple(mut self, multiple: usize) -> Self {
        self.diameter_multiple = multiple;
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_min_split_multiple(mut self, multiple: usize) -> Self {
        self.min_split_multiple = multiple;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of candidates the configured strategy samples per fit.
    pub fn candidate_count(&self) -> usize {
        self.algorithm.strategy().candidate_count(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ensemble_size == 0 {
            return Err(Error::InvalidConfig("ensemble_size must be at least 1".into()));
        }
        if self.diameter_multiple == 0 {
            return Err(Error::InvalidConfig(
                "diameter_multiple must be at least 1".into(),
            ));
        }
        if self.concurrency_limit == 0 {
            return Err(Error::InvalidConfig(
                "concurrency_limit must be at least 1".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig("max_attempts must be at least 1".into()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "test_fraction must lie in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.min_split_multiple == 0 {
            return Err(Error::InvalidConfig(
                "min_split_multiple must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "algorithm = {}", self.algorithm)?;
        writeln!(f, "ensemble size = {}", self.ensemble_size)?;
        writeln!(f, "diameter multiple = {}", self.diameter_multiple)?;
        writeln!(f, "concurrency limit = {}", self.concurrency_limit)?;
        writeln!(f, "max attempts = {}", self.max_attempts)?;
        writeln!(f, "test fraction = {}", self.test_fraction)?;
        writeln!(f, "min split multiple = {}", self.min_split_multiple)?;
        match self.max_depth {
            Some(depth) => writeln!(f, "max depth = {}", depth)?,
            None => writeln!(f, "max depth = unlimited")?,
        }
        match self.seed {
            Some(seed) => writeln!(f, "seed = {}", seed),
            None => writeln!(f, "seed = random"),
        }
    }
}
