//! Shared execution context: validated configuration plus the sampling worker pool.
//!
//! Worker pools are process-wide. Every [`Runtime::new`] with the same concurrency limit
//! runs its sampling tasks on the same pool, so concurrent fits together never run more
//! than that many tasks at once.

use crate::config::Config;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Configuration and worker pool used by every ensemble fit of one tree.
///
/// Cloning is cheap: both halves sit behind an `Arc`.
#[derive(Clone)]
pub struct Runtime {
    config: Arc<Config>,
    pool: Arc<ThreadPool>,
}

impl Runtime {
    /// Validate `config` and attach to the process-wide pool of `concurrency_limit`
    /// workers, building it on first use.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let pool = shared_pool(config.concurrency_limit)?;
        Ok(Runtime {
            config: Arc::new(config),
            pool,
        })
    }

    /// Validate `config` and build a private pool that no other runtime uses.
    pub fn dedicated(config: Config) -> Result<Self> {
        config.validate()?;
        let pool = build_pool(config.concurrency_limit)?;
        Ok(Runtime {
            config: Arc::new(config),
            pool: Arc::new(pool),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `op` inside the worker pool, blocking until it returns.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Root generator of a fit: seeded from the configuration when a seed is set.
    pub fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

fn build_pool(workers: usize) -> Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("hyperplane-sampler-{}", i))
        .build()?;
    Ok(pool)
}

/// The process-wide pool for a concurrency limit.
fn shared_pool(workers: usize) -> Result<Arc<ThreadPool>> {
    static POOLS: OnceLock<Mutex<HashMap<usize, Arc<ThreadPool>>>> = OnceLock::new();
    let mut pools = POOLS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(pool) = pools.get(&workers) {
        return Ok(Arc::clone(pool));
    }
    log::debug!("building shared sampling pool with {} workers", workers);
    let pool = Arc::new(build_pool(workers)?);
    pools.insert(workers, Arc::clone(&pool));
    Ok(pool)
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}
