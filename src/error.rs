//! Error type shared by every fitting and prediction routine.

use ndarray_linalg::error::LinalgError;
use rayon::ThreadPoolBuildError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fewer samples than the dimensional minimum of the requested operation.
    #[error("not enough points: {required} required, {found} provided")]
    InsufficientPoints { required: usize, found: usize },

    /// The coordinate matrix is rank-deficient (points are linearly dependent).
    #[error("the points provided are linearly dependent")]
    Degenerate,

    #[error("no independent point set found after {attempts} sampling attempts")]
    SamplingExhausted { attempts: usize },

    #[error("shape mismatch: expected length {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("a hyperplane needs at least an intercept coefficient")]
    EmptyHyperplane,

    #[error("cannot average an empty set of hyperplanes")]
    EmptyEnsemble,

    #[error("sample {index} has no target value")]
    MissingTarget { index: usize },

    #[error("model has not been executed yet")]
    NotFitted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("linear algebra failure: {0}")]
    Linalg(#[from] LinalgError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}

impl Error {
    /// Whether the error only means "this point set could not be fitted".
    ///
    /// The split search treats these as a rejected candidate rather than a failed fit.
    pub fn is_fitting_failure(&self) -> bool {
        matches!(
            self,
            Error::Degenerate | Error::SamplingExhausted { .. } | Error::InsufficientPoints { .. }
        )
    }
}
