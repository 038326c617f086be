//! Tagged selector for the built-in interpolation schemes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MathResult;
use crate::interpolation::{
    BackwardFlatInterpolator, CubicSpline, Interpolation, Interpolator, LinearInterpolator,
    LogLinearInterpolator,
};

/// Built-in interpolation schemes.
///
/// Implements [`Interpolation`], so a curve can be configured with a plain
/// enum value (and deserialized from TOML or JSON) instead of a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterpolationMethod {
    /// Linear on node values.
    Linear,

    /// Linear on log node values (flat forwards on discount factors).
    #[default]
    LogLinear,

    /// Piecewise constant, right-continuous at nodes.
    BackwardFlat,

    /// Natural cubic spline on node values.
    CubicSpline,
}

impl Interpolation for InterpolationMethod {
    fn build(&self, xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Box<dyn Interpolator>> {
        Ok(match self {
            Self::Linear => Box::new(LinearInterpolator::new(xs, ys)?),
            Self::LogLinear => Box::new(LogLinearInterpolator::new(xs, ys)?),
            Self::BackwardFlat => Box::new(BackwardFlatInterpolator::new(xs, ys)?),
            Self::CubicSpline => Box::new(CubicSpline::new(xs, ys)?),
        })
    }

    fn is_global(&self) -> bool {
        matches!(self, Self::CubicSpline)
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear => "Linear",
            Self::LogLinear => "Log-Linear",
            Self::BackwardFlat => "Backward-Flat",
            Self::CubicSpline => "Cubic Spline",
        };
        write!(f, "{name}")
    }
}
