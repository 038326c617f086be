//! Error types for curve construction and queries.
//!
//! The bootstrap failures (`DuplicatePillar`, `PillarFailure`,
//! `GlobalCheckFailure`, `RootFind`, `Interpolation`) abort a whole solve attempt. The
//! controller memoizes the error it last returned, so the type is `Clone`.

use pillar_core::CoreError;
use pillar_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// The curve has no helpers to calibrate against.
    #[error("No helpers supplied for bootstrap")]
    EmptyHelperSet,

    /// Two helpers map to the same (or practically the same) pillar time.
    #[error("Duplicate pillar at t = {time:.6}")]
    DuplicatePillar {
        /// The shared pillar time.
        time: f64,
    },

    /// A helper's pillar lies before the reference date.
    #[error("Pillar {index} lies before the reference date (t = {time:.6})")]
    InvalidPillar {
        /// Node index of the pillar (1-based).
        index: usize,
        /// Offending pillar time.
        time: f64,
    },

    /// Root finding at a pillar failed, including the widened retry.
    #[error("Bootstrap failed at pillar {index} (last residual: {last_residual:.3e})")]
    PillarFailure {
        /// Node index of the pillar (1-based).
        index: usize,
        /// Smallest objective value reached on the last attempt.
        last_residual: f64,
    },

    /// Every pillar solved but the finished curve does not reprice all helpers.
    #[error("Global repricing check failed: helper {worst_helper_index} misses by {residual:.3e}")]
    GlobalCheckFailure {
        /// Node index of the helper with the largest error (1-based).
        worst_helper_index: usize,
        /// Implied minus market quote for that helper.
        residual: f64,
    },

    /// The root finder failed for a reason a wider bracket cannot fix.
    #[error("Root finder failed at pillar {index}: {source}")]
    RootFind {
        /// Node index of the pillar (1-based).
        index: usize,
        /// Underlying solver error.
        source: MathError,
    },

    /// The interpolation scheme rejected the trial nodes at a pillar.
    #[error("Interpolation failed at pillar {index}: {source}")]
    Interpolation {
        /// Node index of the pillar (1-based).
        index: usize,
        /// Underlying interpolation error.
        source: MathError,
    },

    /// A helper could not be evaluated.
    #[error("Helper at pillar {index} failed: {source}")]
    Helper {
        /// Node index of the pillar (1-based).
        index: usize,
        /// What went wrong inside the helper.
        source: Box<CurveError>,
    },

    /// A helper was constructed with inconsistent parameters.
    #[error("Invalid helper: {reason}")]
    InvalidHelper {
        /// Description of the problem.
        reason: String,
    },

    /// A quote has no value.
    #[error("Invalid quote: {reason}")]
    InvalidQuote {
        /// Description of the problem.
        reason: String,
    },

    /// Query outside the node range with extrapolation disabled.
    #[error("Extrapolation not allowed: t = {t:.6} is outside [{min:.6}, {max:.6}]")]
    ExtrapolationNotAllowed {
        /// Requested time.
        t: f64,
        /// First node time.
        min: f64,
        /// Last node time.
        max: f64,
    },

    /// The turn-of-year adjustment cannot be applied.
    #[error("Invalid adjustment: {reason}")]
    InvalidAdjustment {
        /// Description of the problem.
        reason: String,
    },

    /// Configuration values are out of range or unparsable.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Numerical error from the math crate.
    #[error(transparent)]
    Math(MathError),

    /// Date or day-count error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CurveError {
    /// Wraps an error raised while evaluating the helper at `index`.
    #[must_use]
    pub fn helper(index: usize, source: CurveError) -> Self {
        Self::Helper {
            index,
            source: Box::new(source),
        }
    }

    /// Creates an invalid helper error.
    #[must_use]
    pub fn invalid_helper(reason: impl Into<String>) -> Self {
        Self::InvalidHelper {
            reason: reason.into(),
        }
    }

    /// Creates an invalid quote error.
    #[must_use]
    pub fn invalid_quote(reason: impl Into<String>) -> Self {
        Self::InvalidQuote {
            reason: reason.into(),
        }
    }

    /// Creates an invalid adjustment error.
    #[must_use]
    pub fn invalid_adjustment(reason: impl Into<String>) -> Self {
        Self::InvalidAdjustment {
            reason: reason.into(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns true for the errors a bootstrap solve attempt can end with.
    #[must_use]
    pub fn is_bootstrap_failure(&self) -> bool {
        matches!(
            self,
            Self::EmptyHelperSet
                | Self::DuplicatePillar { .. }
                | Self::InvalidPillar { .. }
                | Self::PillarFailure { .. }
                | Self::GlobalCheckFailure { .. }
                | Self::RootFind { .. }
                | Self::Interpolation { .. }
                | Self::Helper { .. }
        )
    }
}

impl From<MathError> for CurveError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ExtrapolationNotAllowed { x, min, max } => {
                Self::ExtrapolationNotAllowed { t: x, min, max }
            }
            other => Self::Math(other),
        }
    }
}
