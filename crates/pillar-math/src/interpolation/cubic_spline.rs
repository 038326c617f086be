//! Natural cubic spline interpolation.

use crate::error::MathResult;
use crate::interpolation::{find_segment, validate_nodes, Interpolator};

/// Natural cubic spline: C2 through every node, zero curvature at both ends.
///
/// Every node influences the whole curve, so the scheme reports itself as
/// global. With only two nodes the spline is the straight line through them.
///
/// # Example
///
/// ```rust
/// use pillar_math::interpolation::{CubicSpline, Interpolator};
///
/// let spline = CubicSpline::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 4.0, 9.0]).unwrap();
/// let y = spline.evaluate(1.5, false).unwrap();
/// assert!(y > 1.0 && y < 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Creates a natural cubic spline.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, lengths differ or
    /// the xs are not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        let y2s = second_derivatives(&xs, &ys);
        Ok(Self { xs, ys, y2s })
    }

    /// Segment coordinates `(i, h, a, b)` with `a + b = 1` inside the segment.
    fn locate(&self, x: f64) -> (usize, f64, f64, f64) {
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        (i, h, a, b)
    }
}

impl Interpolator for CubicSpline {
    fn interpolate(&self, x: f64) -> f64 {
        let (i, h, a, b) = self.locate(x);
        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.y2s[i] + (b * b * b - b) * self.y2s[i + 1]) * (h * h) / 6.0
    }

    fn slope(&self, x: f64) -> f64 {
        let (i, h, a, b) = self.locate(x);
        (self.ys[i + 1] - self.ys[i]) / h
            - (3.0 * a * a - 1.0) / 6.0 * h * self.y2s[i]
            + (3.0 * b * b - 1.0) / 6.0 * h * self.y2s[i + 1]
    }

    fn xs(&self) -> &[f64] {
        &self.xs
    }

    fn ys(&self) -> &[f64] {
        &self.ys
    }
}

/// Solves the tridiagonal system for natural-spline second derivatives.
fn second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut y2s = vec![0.0; n];
    if n < 3 {
        return y2s;
    }
    let mut u = vec![0.0; n];

    for i in 1..n - 1 {
        let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
        let p = sig * y2s[i - 1] + 2.0;
        y2s[i] = (sig - 1.0) / p;
        let dy = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]) - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
        u[i] = (6.0 * dy / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
    }

    y2s[n - 1] = 0.0;
    for k in (0..n - 1).rev() {
        y2s[k] = y2s[k] * y2s[k + 1] + u[k];
    }
    y2s
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_passes_through_nodes() {
        let xs = vec![0.0, 0.5, 1.0, 2.0, 5.0];
        let ys = vec![1.0, 0.98, 0.96, 0.91, 0.78];
        let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();

        for (x, y) in xs.iter().zip(&ys) {
            assert_relative_eq!(spline.evaluate(*x, false).unwrap(), *y, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_two_points_is_linear() {
        let spline = CubicSpline::new(vec![0.0, 2.0], vec![1.0, 0.9]).unwrap();

        assert_relative_eq!(spline.evaluate(1.0, false).unwrap(), 0.95, epsilon = 1e-15);
        assert_relative_eq!(spline.derivative(1.0, false).unwrap(), -0.05, epsilon = 1e-15);
    }

    #[test]
    fn test_reproduces_straight_line() {
        let xs = vec![0.0, 1.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let spline = CubicSpline::new(xs, ys).unwrap();

        assert_relative_eq!(spline.evaluate(2.2, false).unwrap(), 5.4, epsilon = 1e-12);
        assert_relative_eq!(spline.derivative(3.5, false).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let spline = CubicSpline::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 4.0, 9.0]).unwrap();
        let h = 1e-6;
        let fd = (spline.interpolate(1.7 + h) - spline.interpolate(1.7 - h)) / (2.0 * h);

        assert_relative_eq!(spline.derivative(1.7, false).unwrap(), fd, epsilon = 1e-6);
    }
}
