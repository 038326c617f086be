//! # Pillar Math
//!
//! Numerical building blocks consumed by the bootstrap engine:
//!
//! - **Solvers**: the [`RootFinder`](solvers::RootFinder) contract with
//!   [`Brent`](solvers::Brent) and [`Bisection`](solvers::Bisection)
//! - **Interpolation**: the [`Interpolator`](interpolation::Interpolator)
//!   contract, its [`Interpolation`](interpolation::Interpolation) factory, and
//!   linear, log-linear, backward-flat and cubic-spline schemes
//!
//! Both contracts are object safe; the curve crate holds them as trait objects.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod interpolation;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{
        BackwardFlatInterpolator, CubicSpline, Interpolation, InterpolationMethod, Interpolator,
        LinearInterpolator, LogLinearInterpolator,
    };
    pub use crate::solvers::{Bisection, Bracket, Brent, RootFinder, SolverConfig, SolverResult};
}

pub use error::{MathError, MathResult};
