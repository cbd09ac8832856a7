//! Error metrics over predicted and observed targets.
//!
//! Validation weights use the raw squared residual sum; node and tree errors are RMSE.

use ndarray::Array1;

fn squared_residuals(predicted: &Array1<f64>, actual: &Array1<f64>) -> Array1<f64> {
    (predicted - actual).mapv(|r| r * r)
}

/// Sum of squared differences.
pub fn sum_squared_error(predicted: &Array1<f64>, actual: &Array1<f64>) -> f64 {
    squared_residuals(predicted, actual).sum()
}

/// Mean of the squared differences, 0.0 for empty input.
pub fn mean_squared_error(predicted: &Array1<f64>, actual: &Array1<f64>) -> f64 {
    squared_residuals(predicted, actual).mean().unwrap_or(0.0)
}

pub fn root_mean_squared_error(predicted: &Array1<f64>, actual: &Array1<f64>) -> f64 {
    mean_squared_error(predicted, actual).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_sum_squared_error() {
        let predicted = array![1.0, 2.0, 3.0];
        let actual = array![1.5, 2.0, 1.0];
        assert_relative_eq!(sum_squared_error(&predicted, &actual), 4.25, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_squared_error_of_plane_residuals() {
        // Residuals of y = 2x + 1 against a slightly steeper line
        let actual = array![1.0, 3.0, 5.0, 7.0];
        let predicted = array![1.0, 3.5, 6.0, 8.5];
        assert_relative_eq!(
            mean_squared_error(&predicted, &actual),
            (0.25 + 1.0 + 2.25) / 4.0,
            epsilon = 1e-12
        );
        assert_eq!(mean_squared_error(&actual, &actual), 0.0);
    }

    #[test]
    fn test_root_mean_squared_error() {
        let predicted = array![0.0, 0.0];
        let actual = array![3.0, 4.0];
        assert_relative_eq!(
            root_mean_squared_error(&predicted, &actual),
            12.5_f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_empty_input_has_no_error() {
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(sum_squared_error(&empty, &empty), 0.0);
        assert_eq!(root_mean_squared_error(&empty, &empty), 0.0);
    }
}
