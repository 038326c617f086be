//! Backward-flat interpolation.

use crate::error::MathResult;
use crate::interpolation::{validate_nodes, Interpolator};

/// Piecewise constant: on `(x_{i-1}, x_i]` the value is `y_i`.
///
/// Before the first node the value is `y_0`; after the last node it stays
/// `y_n`. This is the usual scheme for bootstrapped hazard rates, where each
/// node carries the rate over the period ending at its pillar.
#[derive(Debug, Clone)]
pub struct BackwardFlatInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl BackwardFlatInterpolator {
    /// Creates a new backward-flat interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, lengths differ or
    /// the xs are not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        Ok(Self { xs, ys })
    }

    /// Index of the node whose value applies at `x`.
    fn node_for(&self, x: f64) -> usize {
        self.xs
            .partition_point(|&node| node < x)
            .min(self.xs.len() - 1)
    }
}

impl Interpolator for BackwardFlatInterpolator {
    fn interpolate(&self, x: f64) -> f64 {
        self.ys[self.node_for(x)]
    }

    fn slope(&self, _x: f64) -> f64 {
        0.0
    }

    fn xs(&self) -> &[f64] {
        &self.xs
    }

    fn ys(&self) -> &[f64] {
        &self.ys
    }

    fn integral(&self, a: f64, b: f64, allow_extrapolation: bool) -> MathResult<f64> {
        self.check_range(a, allow_extrapolation)?;
        self.check_range(b, allow_extrapolation)?;
        let (lo, hi, sign) = if a <= b { (a, b, 1.0) } else { (b, a, -1.0) };

        let n = self.xs.len();
        let mut total = 0.0;
        let mut left = lo;
        while left < hi {
            // First node strictly to the right carries the value on (left, node]
            let j = self.xs.partition_point(|&node| node <= left);
            let (value, right) = if j < n {
                (self.ys[j], self.xs[j].min(hi))
            } else {
                (self.ys[n - 1], hi)
            };
            total += value * (right - left);
            left = right;
        }
        Ok(sign * total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hazard() -> BackwardFlatInterpolator {
        BackwardFlatInterpolator::new(vec![0.0, 1.0, 3.0], vec![0.0, 0.02, 0.03]).unwrap()
    }

    #[test]
    fn test_right_node_value_applies() {
        let interp = hazard();

        assert_eq!(interp.evaluate(0.0, false).unwrap(), 0.0);
        assert_eq!(interp.evaluate(0.5, false).unwrap(), 0.02);
        assert_eq!(interp.evaluate(1.0, false).unwrap(), 0.02);
        assert_eq!(interp.evaluate(1.0001, false).unwrap(), 0.03);
        assert_eq!(interp.evaluate(10.0, true).unwrap(), 0.03);
        assert_eq!(interp.derivative(2.0, false).unwrap(), 0.0);
    }

    #[test]
    fn test_integral() {
        let interp = hazard();

        assert_relative_eq!(interp.integral(0.0, 1.0, false).unwrap(), 0.02, epsilon = 1e-15);
        assert_relative_eq!(interp.integral(0.0, 3.0, false).unwrap(), 0.08, epsilon = 1e-15);
        assert_relative_eq!(interp.integral(0.5, 2.0, false).unwrap(), 0.01 + 0.03, epsilon = 1e-15);
        assert_relative_eq!(interp.integral(3.0, 5.0, true).unwrap(), 0.06, epsilon = 1e-15);
    }
}
