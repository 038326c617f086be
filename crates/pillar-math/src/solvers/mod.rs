//! Root-finding algorithms.
//!
//! The bootstrap engine only sees the [`RootFinder`] contract: an objective,
//! an initial guess, the interval the root must lie in, and a
//! [`SolverConfig`] carrying the accuracy and the evaluation budget.
//!
//! - [`Brent`]: expands outward from the guess until the root is bracketed,
//!   then runs Brent's method. The default.
//! - [`Bisection`]: halves the supplied interval. Slow but predictable.
//!
//! # Example
//!
//! ```rust
//! use pillar_math::solvers::{Bracket, Brent, RootFinder, SolverConfig};
//!
//! let f = |x: f64| x * x - 2.0;
//! let bracket = Bracket::new(0.0, 10.0).unwrap();
//! let result = Brent::default()
//!     .find_root(&f, 1.0, bracket, &SolverConfig::default())
//!     .unwrap();
//! assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
//! ```

mod bisection;
mod brent;

pub use bisection::Bisection;
pub use brent::Brent;

use std::fmt;

use crate::error::{MathError, MathResult};

/// Default absolute accuracy on the objective.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Default cap on objective evaluations.
pub const DEFAULT_MAX_EVALUATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Absolute tolerance on `|f(x)|`.
    pub tolerance: f64,
    /// Maximum number of objective evaluations, bracketing included.
    pub max_evaluations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_evaluations: u32) -> Self {
        Self {
            tolerance,
            max_evaluations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the evaluation budget.
    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: u32) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }
}

/// Interval a root is searched in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl Bracket {
    /// Creates a bracket.
    ///
    /// # Errors
    ///
    /// Returns `MathError::InvalidInput` if a bound is not finite or
    /// `lower >= upper`.
    pub fn new(lower: f64, upper: f64) -> MathResult<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(MathError::invalid_input(format!(
                "bracket bounds must be finite and increasing: [{lower}, {upper}]"
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Width of the interval.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Midpoint of the interval.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    /// Returns true if `x` lies inside the closed interval.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }

    /// Clamps `x` into the interval.
    #[must_use]
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.lower, self.upper)
    }

    /// Scales the half-width around the midpoint by `factor` (values below 1 are ignored).
    #[must_use]
    pub fn widen(&self, factor: f64) -> Self {
        let factor = factor.max(1.0);
        let mid = self.midpoint();
        let half = 0.5 * self.width() * factor;
        Self {
            lower: mid - half,
            upper: mid + half,
        }
    }

    /// Intersects with `[min, max]`, keeping a non-empty interval.
    #[must_use]
    pub fn restrict(&self, min: f64, max: f64) -> Self {
        let lower = self.lower.max(min);
        let upper = self.upper.min(max);
        if lower < upper {
            Self { lower, upper }
        } else {
            *self
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Result of a root-finding run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of solver iterations after bracketing.
    pub iterations: u32,
    /// `f(root)`.
    pub residual: f64,
    /// Total objective evaluations, bracketing included.
    pub evaluations: u32,
}

/// A one-dimensional root finder.
///
/// Implementations must stop after `config.max_evaluations` evaluations and
/// never evaluate the objective outside `bracket`.
pub trait RootFinder: Send + Sync + fmt::Debug {
    /// Finds `x` in `bracket` with `|f(x)| <= config.tolerance`.
    ///
    /// # Arguments
    ///
    /// * `f` - The objective
    /// * `guess` - Starting point, clamped into `bracket`
    /// * `bracket` - Interval the root must lie in
    /// * `config` - Accuracy and evaluation budget
    ///
    /// # Errors
    ///
    /// - `MathError::InvalidBracket` if no sign change exists inside `bracket`
    /// - `MathError::ConvergenceFailed` if the budget runs out
    /// - `MathError::NonFiniteValue` if the objective returns NaN or infinity
    fn find_root(
        &self,
        f: &dyn Fn(f64) -> f64,
        guess: f64,
        bracket: Bracket,
        config: &SolverConfig,
    ) -> MathResult<SolverResult>;

    /// Returns the name of the solver.
    fn name(&self) -> &'static str;
}

/// Counts evaluations and rejects non-finite objective values.
pub(crate) struct Evaluator<'a> {
    f: &'a dyn Fn(f64) -> f64,
    pub(crate) count: u32,
    pub(crate) limit: u32,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(f: &'a dyn Fn(f64) -> f64, limit: u32) -> Self {
        Self { f, count: 0, limit }
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.count >= self.limit
    }

    pub(crate) fn eval(&mut self, x: f64) -> MathResult<f64> {
        self.count += 1;
        let y = (self.f)(x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(MathError::NonFiniteValue { x })
        }
    }
}
