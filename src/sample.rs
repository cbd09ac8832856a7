//! Feature vectors paired with their target value.

use crate::error::{Error, Result};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// One observation: `d` feature values and an optional target.
///
/// Conceptually this is a `d + 1` coordinate vector whose last element is the target,
/// which is how [`Sample::coordinates`] and [`Sample::dimensions`] present it. The
/// target is missing for prediction-only samples and can be filled in afterwards with
/// [`Sample::set_target`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    features: Array1<f64>,
    target: Option<f64>,
}

impl Sample {
    pub fn new(features: Vec<f64>, target: f64) -> Self {
        Sample {
            features: Array1::from_vec(features),
            target: Some(target),
        }
    }

    /// A sample whose target is unknown.
    pub fn unlabeled(features: Vec<f64>) -> Self {
        Sample {
            features: Array1::from_vec(features),
            target: None,
        }
    }

    /// Build a sample from a parsed record laid out as `[id, target, features...]`.
    ///
    /// The identifier column is ignored.
    pub fn from_record(record: &[f64]) -> Result<Self> {
        if record.len() < 3 {
            return Err(Error::InsufficientPoints {
                required: 3,
                found: record.len(),
            });
        }
        Ok(Sample::new(record[2..].to_vec(), record[1]))
    }

    pub fn features(&self) -> ArrayView1<'_, f64> {
        self.features.view()
    }

    pub fn feature(&self, index: usize) -> f64 {
        self.features[index]
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Length of the coordinate vector: the features plus the target slot.
    pub fn dimensions(&self) -> usize {
        self.features.len() + 1
    }

    pub fn target(&self) -> Option<f64> {
        self.target
    }

    pub fn set_target(&mut self, value: f64) {
        self.target = Some(value);
    }

    /// Features followed by the target, `NaN` standing in for a missing target.
    pub fn coordinates(&self) -> Array1<f64> {
        let mut coordinates = Array1::zeros(self.dimensions());
        coordinates
            .slice_mut(ndarray::s![..self.features.len()])
            .assign(&self.features);
        coordinates[self.features.len()] = self.target.unwrap_or(f64::NAN);
        coordinates
    }

    /// Euclidean distance between the coordinate vectors of two samples.
    pub fn distance(&self, other: &Sample) -> f64 {
        let features: f64 = self
            .features
            .iter()
            .zip(other.features.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        let target = self.target.unwrap_or(f64::NAN) - other.target.unwrap_or(f64::NAN);
        (features + target * target).sqrt()
    }
}

/// Target of `samples[index]`, or `MissingTarget` if it has none.
pub(crate) fn label(samples: &[&Sample], index: usize) -> Result<f64> {
    samples[index]
        .target()
        .ok_or(Error::MissingTarget { index })
}

/// Shared dimensionality of a point set.
pub(crate) fn common_dimensions<'a, I>(samples: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut iter = samples.into_iter();
    let first = match iter.next() {
        Some(sample) => sample.dimensions(),
        None => {
            return Err(Error::InsufficientPoints {
                required: 1,
                found: 0,
            })
        }
    };
    for sample in iter {
        if sample.dimensions() != first {
            return Err(Error::ShapeMismatch {
                expected: first,
                found: sample.dimensions(),
            });
        }
    }
    Ok(first)
}
