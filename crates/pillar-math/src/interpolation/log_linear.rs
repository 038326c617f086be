//! Log-linear interpolation.
//!
//! Linear in `ln y`. On discount factors this gives piecewise constant
//! forward rates, and extrapolating the last segment keeps the last forward
//! flat.

use crate::error::{MathError, MathResult};
use crate::interpolation::{find_segment, validate_nodes, Interpolator};

/// Log-linear interpolation between positive node values.
///
/// ```text
/// y(x) = exp(ln y_i + (x - x_i) / (x_{i+1} - x_i) * (ln y_{i+1} - ln y_i))
/// ```
///
/// # Example
///
/// ```rust
/// use pillar_math::interpolation::{Interpolator, LogLinearInterpolator};
///
/// let interp = LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.95]).unwrap();
/// let df = interp.evaluate(2.0, true).unwrap();
/// assert!((df - 0.95 * 0.95).abs() < 1e-15);
/// ```
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Precomputed ln(y) values
    log_ys: Vec<f64>,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, lengths differ, the
    /// xs are not strictly increasing, or any y value is non-positive.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;

        let mut log_ys = Vec::with_capacity(ys.len());
        for (i, &y) in ys.iter().enumerate() {
            if y <= 0.0 {
                return Err(MathError::invalid_input(format!(
                    "y[{i}] = {y} is not positive; log-linear requires positive values"
                )));
            }
            log_ys.push(y.ln());
        }

        Ok(Self { xs, ys, log_ys })
    }

    fn log_slope(&self, i: usize) -> f64 {
        (self.log_ys[i + 1] - self.log_ys[i]) / (self.xs[i + 1] - self.xs[i])
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> f64 {
        let i = find_segment(&self.xs, x);
        (self.log_ys[i] + (x - self.xs[i]) * self.log_slope(i)).exp()
    }

    fn slope(&self, x: f64) -> f64 {
        let i = find_segment(&self.xs, x);
        self.interpolate(x) * self.log_slope(i)
    }

    fn xs(&self) -> &[f64] {
        &self.xs
    }

    fn ys(&self) -> &[f64] {
        &self.ys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_forward_between_nodes() {
        let interp = LogLinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![1.0, 0.95, 0.9]).unwrap();

        // Constant forward on (1, 2]: f = ln(0.95 / 0.9)
        let fwd = (0.95f64 / 0.9).ln();
        let df = interp.evaluate(1.25, false).unwrap();
        assert_relative_eq!(df, 0.95 * (-fwd * 0.25).exp(), epsilon = 1e-14);

        let d = interp.derivative(1.5, false).unwrap();
        assert_relative_eq!(d / interp.evaluate(1.5, false).unwrap(), -fwd, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.0]).is_err());
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![-1.0, 0.5]).is_err());
    }

    #[test]
    fn test_integral_matches_closed_form() {
        let interp = LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.5]).unwrap();

        // Integral of exp(-ln2 x) over [0, 1] = (1 - 0.5) / ln 2
        let expected = 0.5 / std::f64::consts::LN_2;
        assert_relative_eq!(interp.integral(0.0, 1.0, false).unwrap(), expected, epsilon = 1e-5);
    }
}
