//! Interpolation over curve nodes.
//!
//! Two contracts:
//!
//! - [`Interpolation`] is the factory a curve is configured with. It turns
//!   an ordered set of `(x, y)` nodes into an [`Interpolator`].
//! - [`Interpolator`] is the continuous function built over those nodes.
//!   Every query states whether extrapolation is allowed, so the same
//!   instance serves a strict query surface and a relaxed bootstrap trial.
//!
//! # Available Methods
//!
//! | Method | Continuity | Extrapolation | Typical node value |
//! |--------|------------|---------------|--------------------|
//! | [`LinearInterpolator`] | C0 | Last segment slope | Discount factor, hazard rate |
//! | [`LogLinearInterpolator`] | C0 | Flat forward | Discount factor, survival |
//! | [`BackwardFlatInterpolator`] | Step | Flat | Hazard rate |
//! | [`CubicSpline`] | C2 | Cubic of end segment | Smooth discount curves |
//!
//! Callers never downcast: the nodes behind any interpolator are available
//! through [`Interpolator::xs`] and [`Interpolator::ys`].

mod backward_flat;
mod cubic_spline;
mod linear;
mod log_linear;
mod method;

pub use backward_flat::BackwardFlatInterpolator;
pub use cubic_spline::CubicSpline;
pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;
pub use method::InterpolationMethod;

use std::fmt;

use crate::error::{MathError, MathResult};

/// Sub-intervals per node segment in the default Simpson integral.
const SIMPSON_STEPS: usize = 8;

/// A continuous function built over ordered nodes.
pub trait Interpolator: Send + Sync + fmt::Debug {
    /// Value at `x` without a range check; outside the nodes the scheme's
    /// own extrapolation rule applies.
    fn interpolate(&self, x: f64) -> f64;

    /// First derivative at `x` without a range check.
    fn slope(&self, x: f64) -> f64;

    /// Node abscissas, strictly increasing.
    fn xs(&self) -> &[f64];

    /// Node values.
    fn ys(&self) -> &[f64];

    /// Value at `x`.
    ///
    /// # Errors
    ///
    /// Returns `MathError::ExtrapolationNotAllowed` if `x` is outside the
    /// nodes and `allow_extrapolation` is false.
    fn evaluate(&self, x: f64, allow_extrapolation: bool) -> MathResult<f64> {
        self.check_range(x, allow_extrapolation)?;
        Ok(self.interpolate(x))
    }

    /// First derivative at `x`, with the same range rule as [`evaluate`](Self::evaluate).
    fn derivative(&self, x: f64, allow_extrapolation: bool) -> MathResult<f64> {
        self.check_range(x, allow_extrapolation)?;
        Ok(self.slope(x))
    }

    /// Integral from `a` to `b`.
    ///
    /// The default splits at every node and applies Simpson's rule on each
    /// piece, which is exact for piecewise polynomials up to degree three.
    fn integral(&self, a: f64, b: f64, allow_extrapolation: bool) -> MathResult<f64> {
        self.check_range(a, allow_extrapolation)?;
        self.check_range(b, allow_extrapolation)?;
        if a > b {
            return self.integral(b, a, allow_extrapolation).map(|v| -v);
        }

        let mut breaks = vec![a];
        breaks.extend(self.xs().iter().copied().filter(|&x| x > a && x < b));
        breaks.push(b);

        Ok(breaks
            .windows(2)
            .map(|w| simpson(|x| self.interpolate(x), w[0], w[1], SIMPSON_STEPS))
            .sum())
    }

    /// First node abscissa.
    fn min_x(&self) -> f64 {
        self.xs().first().copied().unwrap_or(f64::NAN)
    }

    /// Last node abscissa.
    fn max_x(&self) -> f64 {
        self.xs().last().copied().unwrap_or(f64::NAN)
    }

    /// Checks if `x` is within the node range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }

    /// Range check shared by the checked accessors.
    fn check_range(&self, x: f64, allow_extrapolation: bool) -> MathResult<()> {
        if x.is_nan() {
            return Err(MathError::invalid_input("interpolation abscissa is NaN"));
        }
        if allow_extrapolation || self.in_range(x) {
            Ok(())
        } else {
            Err(MathError::ExtrapolationNotAllowed {
                x,
                min: self.min_x(),
                max: self.max_x(),
            })
        }
    }
}

/// Builds an [`Interpolator`] over a set of nodes.
pub trait Interpolation: Send + Sync + fmt::Debug {
    /// Builds the interpolator.
    ///
    /// # Errors
    ///
    /// Fails if the nodes are too few, unsorted, mismatched in length, or
    /// outside the scheme's domain (e.g. non-positive values for log-linear).
    fn build(&self, xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Box<dyn Interpolator>>;

    /// Minimum number of nodes the scheme accepts.
    ///
    /// Sequential bootstrapping builds its first trial curve from two nodes,
    /// so it rejects schemes returning more.
    fn min_points(&self) -> usize {
        2
    }

    /// True if moving one node changes the curve away from its neighbours.
    ///
    /// Sequential bootstrapping over such a scheme needs a second pass for
    /// early nodes to see the later ones.
    fn is_global(&self) -> bool {
        false
    }
}

/// Validates node vectors shared by all schemes.
pub(crate) fn validate_nodes(xs: &[f64], ys: &[f64], required: usize) -> MathResult<()> {
    if xs.len() < required {
        return Err(MathError::insufficient_data(required, xs.len()));
    }
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("node coordinates must be finite"));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MathError::invalid_input("x values must be strictly increasing"));
    }
    Ok(())
}

/// Index `i` of the segment `[xs[i], xs[i + 1]]` used for `x`; clamps to the end segments.
pub(crate) fn find_segment(xs: &[f64], x: f64) -> usize {
    let last = xs.len().saturating_sub(2);
    match xs.binary_search_by(|node| node.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)) {
        Ok(i) => i.min(last),
        Err(i) => i.saturating_sub(1).min(last),
    }
}

fn simpson<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, steps: usize) -> f64 {
    let h = (b - a) / steps as f64;
    let interior: f64 = (1..steps)
        .map(|k| {
            let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
            weight * f(a + h * k as f64)
        })
        .sum();
    h / 3.0 * (f(a) + interior + f(b))
}
