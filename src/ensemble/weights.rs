//! Validation weights and the weighted average of sampled hyperplanes.

use crate::error::{Error, Result};
use crate::evaluation::sum_squared_error;
use crate::hyperplane::Hyperplane;
use crate::sample::Sample;
use ndarray::Array1;

/// Weight of a hyperplane that reproduces its validators exactly.
pub const MAX_WEIGHT: f64 = f64::MAX;

/// Reciprocal of the squared residual sum over `validators`.
///
/// Returns [`MAX_WEIGHT`] when the sum rounds to zero at five decimal places. Validators
/// of a different dimensionality than the hyperplane are a [`Error::ShapeMismatch`].
pub fn weigh<'a, I>(hyperplane: &Hyperplane, validators: I) -> Result<f64>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut predicted = Vec::new();
    let mut actual = Vec::new();
    for (index, validator) in validators.into_iter().enumerate() {
        let target = validator.target().ok_or(Error::MissingTarget { index })?;
        predicted.push(hyperplane.try_solve(validator)?);
        actual.push(target);
    }

    let residual = sum_squared_error(&Array1::from_vec(predicted), &Array1::from_vec(actual));
    if (residual * 1e5).round() == 0.0 {
        return Ok(MAX_WEIGHT);
    }
    Ok(1.0 / residual)
}

/// Coefficient-wise average of `hyperplanes` weighted by `weights`.
///
/// A hyperplane carrying [`MAX_WEIGHT`] wins outright and is returned unchanged.
pub fn average(hyperplanes: &[Hyperplane], weights: &[f64]) -> Result<Hyperplane> {
    let first = hyperplanes.first().ok_or(Error::EmptyEnsemble)?;
    if weights.len() != hyperplanes.len() {
        return Err(Error::ShapeMismatch {
            expected: hyperplanes.len(),
            found: weights.len(),
        });
    }
    let len = first.len();
    if let Some(other) = hyperplanes.iter().find(|h| h.len() != len) {
        return Err(Error::ShapeMismatch {
            expected: len,
            found: other.len(),
        });
    }

    if let Some(position) = weights.iter().position(|&w| w == MAX_WEIGHT) {
        return Ok(hyperplanes[position].clone());
    }

    let total: f64 = weights.iter().sum();
    let mut coefficients = Array1::<f64>::zeros(len);
    for (hyperplane, &weight) in hyperplanes.iter().zip(weights) {
        coefficients.scaled_add(weight / total, &hyperplane.coefficients());
    }
    Hyperplane::from_coefficients(coefficients.to_vec())
}
