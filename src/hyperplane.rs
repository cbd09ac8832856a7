//! Affine functions fitted through sample points.
//!
//! A hyperplane over `d` features carries `d + 1` coefficients: one weight per feature
//! followed by the intercept. It is fitted either exactly through `d + 1` points or, when
//! more points are given, by least squares. Both refuse point sets whose coordinate
//! matrix is rank-deficient.

use crate::error::{Error, Result};
use crate::sample::{self, Sample};
use ndarray::{s, Array1, Array2, ArrayView1};
use ndarray_linalg::{Determinant, LeastSquaresSvd, Solve};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default resample ceiling used by [`Hyperplane::resample`] callers.
pub const DEFAULT_MAX_ATTEMPTS: usize = 50;

/// Singular values below `RANK_TOLERANCE * max_singular_value` count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperplane {
    coefficients: Array1<f64>,
}

/// A hyperplane produced by [`Hyperplane::resample`], with the pool indices of the
/// points it passes through.
#[derive(Debug, Clone)]
pub struct SampledHyperplane {
    pub hyperplane: Hyperplane,
    pub support: Vec<usize>,
}

impl Hyperplane {
    /// Build a hyperplane from feature weights followed by the intercept.
    ///
    /// At least the intercept must be present.
    pub fn from_coefficients(coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(Error::EmptyHyperplane);
        }
        Ok(Hyperplane {
            coefficients: Array1::from_vec(coefficients),
        })
    }

    pub fn coefficients(&self) -> ArrayView1<'_, f64> {
        self.coefficients.view()
    }

    /// Number of coefficients, i.e. the dimensionality of the samples it fits.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Fit exactly through `d + 1` points, or by least squares through more.
    pub fn fit(points: &[Sample]) -> Result<Self> {
        let dimensions = sample::common_dimensions(points)?;
        if points.len() > dimensions {
            Self::fit_least_squares(points)
        } else {
            Self::fit_exact(points)
        }
    }

    /// Solve the square system through exactly `d + 1` points.
    ///
    /// # Example
    /// ```
    /// use hyperplane_tree::{Hyperplane, Sample};
    /// // y = 2x + 1
    /// let points = vec![Sample::new(vec![1.0], 3.0), Sample::new(vec![3.0], 7.0)];
    /// let hyperplane = Hyperplane::fit_exact(&points).unwrap();
    /// assert!((hyperplane.solve(&Sample::unlabeled(vec![5.0])) - 11.0).abs() < 1e-9);
    /// ```
    pub fn fit_exact(points: &[Sample]) -> Result<Self> {
        let points: Vec<&Sample> = points.iter().collect();
        Self::fit_exact_refs(&points)
    }

    fn fit_exact_refs(points: &[&Sample]) -> Result<Self> {
        let (a, b) = linear_system(points)?;
        if points.len() > a.ncols() {
            return Err(Error::ShapeMismatch {
                expected: a.ncols(),
                found: points.len(),
            });
        }
        if determinant_vanishes(&a) {
            return Err(Error::Degenerate);
        }
        let coefficients = a.solve_into(b)?;
        Ok(Hyperplane { coefficients })
    }

    /// Least-squares fit through at least `d + 1` points.
    pub fn fit_least_squares(points: &[Sample]) -> Result<Self> {
        let points: Vec<&Sample> = points.iter().collect();
        let (a, b) = linear_system(&points)?;
        let result = a.least_squares(&b)?;
        if numerical_rank(result.singular_values.view()) < a.ncols() {
            return Err(Error::Degenerate);
        }
        Ok(Hyperplane {
            coefficients: result.solution,
        })
    }

    /// Draw `d + 1` distinct points from `pool` and fit exactly through them, redrawing
    /// whenever the draw is degenerate.
    ///
    /// Gives up with [`Error::SamplingExhausted`] after `max_attempts` degenerate draws.
    pub fn resample<R: Rng + ?Sized>(
        pool: &[Sample],
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<SampledHyperplane> {
        let dimensions = sample::common_dimensions(pool)?;
        if pool.len() < dimensions {
            return Err(Error::InsufficientPoints {
                required: dimensions,
                found: pool.len(),
            });
        }

        for attempt in 0..max_attempts {
            let support = index::sample(rng, pool.len(), dimensions).into_vec();
            let points: Vec<&Sample> = support.iter().map(|&i| &pool[i]).collect();
            match Self::fit_exact_refs(&points) {
                Ok(hyperplane) => return Ok(SampledHyperplane { hyperplane, support }),
                Err(Error::Degenerate) => {
                    log::trace!("degenerate draw {:?} on attempt {}", support, attempt + 1);
                }
                Err(err) => return Err(err),
            }
        }

        Err(Error::SamplingExhausted {
            attempts: max_attempts,
        })
    }

    /// Evaluate the affine function at the sample's features.
    ///
    /// Returns NaN when the sample's dimensionality differs from the hyperplane's; use
    /// [`Hyperplane::try_solve`] to get the mismatch as an error.
    pub fn solve(&self, sample: &Sample) -> f64 {
        self.try_solve(sample).unwrap_or(f64::NAN)
    }

    /// Evaluate the affine function, rejecting samples of the wrong dimensionality.
    pub fn try_solve(&self, sample: &Sample) -> Result<f64> {
        let n = self.coefficients.len();
        if n == 0 {
            return Err(Error::EmptyHyperplane);
        }
        if n != sample.dimensions() {
            return Err(Error::ShapeMismatch {
                expected: n,
                found: sample.dimensions(),
            });
        }
        let weights = self.coefficients.slice(s![..n - 1]);
        Ok(weights.dot(&sample.features()) + self.coefficients[n - 1])
    }
}

/// Coordinate matrix (features padded with a column of ones) and target vector.
fn linear_system(points: &[&Sample]) -> Result<(Array2<f64>, Array1<f64>)> {
    let dimensions = sample::common_dimensions(points.iter().copied())?;
    if points.len() < dimensions {
        return Err(Error::InsufficientPoints {
            required: dimensions,
            found: points.len(),
        });
    }

    let n_features = dimensions - 1;
    let a = Array2::from_shape_fn((points.len(), dimensions), |(i, j)| {
        if j < n_features {
            points[i].feature(j)
        } else {
            1.0
        }
    });
    let b = (0..points.len())
        .map(|i| sample::label(points, i))
        .collect::<Result<Array1<f64>>>()?;
    Ok((a, b))
}

/// True when the determinant rounds to zero at one decimal place.
fn determinant_vanishes(a: &Array2<f64>) -> bool {
    // LU factorization only fails on a singular matrix.
    let det = a.det().unwrap_or(0.0);
    (det * 10.0).round() == 0.0
}

fn numerical_rank(singular_values: ArrayView1<'_, f64>) -> usize {
    let max = singular_values.iter().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return 0;
    }
    let cutoff = max * RANK_TOLERANCE;
    singular_values.iter().filter(|&&s| s > cutoff).count()
}
