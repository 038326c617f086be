//! Linear interpolation.

use crate::error::MathResult;
use crate::interpolation::{find_segment, validate_nodes, Interpolator};

/// Straight lines between consecutive nodes; the end segments extend outward.
///
/// # Example
///
/// ```rust
/// use pillar_math::interpolation::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![1.0, 0.95, 0.85]).unwrap();
/// assert!((interp.evaluate(1.5, false).unwrap() - 0.90).abs() < 1e-15);
/// assert!(interp.evaluate(2.5, false).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, lengths differ or
    /// the xs are not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        Ok(Self { xs, ys })
    }

    fn segment_slope(&self, i: usize) -> f64 {
        (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i])
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> f64 {
        let i = find_segment(&self.xs, x);
        self.ys[i] + (x - self.xs[i]) * self.segment_slope(i)
    }

    fn slope(&self, x: f64) -> f64 {
        self.segment_slope(find_segment(&self.xs, x))
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

        let mut total = 0.0;
        let mut left = lo;
        while left < hi {
            let i = find_segment(&self.xs, left);
            let right = if i + 1 < self.xs.len() - 1 && self.xs[i + 1] > left {
                self.xs[i + 1].min(hi)
            } else {
                hi
            };
            total += 0.5 * (self.interpolate(left) + self.interpolate(right)) * (right - left);
            left = right;
        }
        Ok(sign * total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nodes_are_reproduced() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 4.0, 9.0];
        let interp = LinearInterpolator::new(xs.clone(), ys.clone()).unwrap();

        for (x, y) in xs.iter().zip(&ys) {
            assert_relative_eq!(interp.evaluate(*x, false).unwrap(), *y, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_midpoint_and_slope() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 4.0]).unwrap();

        assert_relative_eq!(interp.evaluate(1.5, false).unwrap(), 2.5, epsilon = 1e-15);
        assert_relative_eq!(interp.derivative(0.5, false).unwrap(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(interp.derivative(1.5, false).unwrap(), 3.0, epsilon = 1e-15);
    }

    #[test]
    fn test_extrapolation_extends_end_segments() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 3.0]).unwrap();

        assert_relative_eq!(interp.evaluate(3.0, true).unwrap(), 5.0, epsilon = 1e-15);
        assert_relative_eq!(interp.evaluate(-1.0, true).unwrap(), -1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_exact_integral() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 3.0]).unwrap();

        // Trapezoids: 0.5 + 2.0
        assert_relative_eq!(interp.integral(0.0, 2.0, false).unwrap(), 2.5, epsilon = 1e-15);
        assert_relative_eq!(interp.integral(0.5, 1.5, false).unwrap(), 1.125, epsilon = 1e-15);
        assert_relative_eq!(interp.integral(2.0, 3.0, true).unwrap(), 4.0, epsilon = 1e-15);
    }
}
