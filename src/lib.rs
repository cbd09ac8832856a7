//! Piecewise-linear regression trees whose leaves are fitted by randomized hyperplane
//! ensembles.
//!
//! ```no_run
//! use hyperplane_tree::{Config, RegressionTree, Sample};
//!
//! let points: Vec<Sample> = (0..30)
//!     .map(|i| {
//!         let (x, y) = (i as f64, (i % 7) as f64);
//!         Sample::new(vec![x, y], 3.0 * x + 2.0 * y + 2.0)
//!     })
//!     .collect();
//! let tree = RegressionTree::fit(&points, Config::new().with_seed(7)).unwrap();
//! let z = tree.predict(&Sample::unlabeled(vec![7.0, 8.0])).unwrap();
//! ```

pub mod config;
pub mod ensemble;
pub mod error;
pub mod evaluation;
pub mod hyperplane;
pub mod runtime;
pub mod sample;
pub mod tree;

// Re-export commonly used types at crate root
pub use config::{Algorithm, Config};
pub use ensemble::{EnsembleModel, EnsembleStrategy, MAX_WEIGHT};
pub use error::{Error, Result};
pub use hyperplane::Hyperplane;
pub use runtime::Runtime;
pub use sample::Sample;
pub use tree::{Leaf, RegressionTree, TreeNode};
