//! Error types for numerical routines.

use thiserror::Error;

/// A specialized Result type for mathematical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during root finding or interpolation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Root-finding algorithm exhausted its evaluation budget.
    #[error("Convergence failed after {iterations} evaluations (residual: {residual:.2e})")]
    ConvergenceFailed {
        /// Number of function evaluations performed.
        iterations: u32,
        /// Smallest absolute residual reached.
        residual: f64,
    },

    /// No sign change could be found inside the allowed search interval.
    #[error("Invalid bracket: f({a}) = {fa:.2e} and f({b}) = {fb:.2e} have same sign")]
    InvalidBracket {
        /// Lower end of the last bracket tried.
        a: f64,
        /// Upper end of the last bracket tried.
        b: f64,
        /// Function value at a.
        fa: f64,
        /// Function value at b.
        fb: f64,
    },

    /// The objective returned NaN or infinity.
    #[error("Objective is not finite at x = {x}")]
    NonFiniteValue {
        /// The abscissa that produced the non-finite value.
        x: f64,
    },

    /// Interpolation point is outside the node range.
    #[error("Extrapolation not allowed: {x} is outside [{min}, {max}]")]
    ExtrapolationNotAllowed {
        /// The query point.
        x: f64,
        /// First node abscissa.
        min: f64,
        /// Last node abscissa.
        max: f64,
    },

    /// Insufficient data points for operation.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl MathError {
    /// Creates a convergence failed error.
    #[must_use]
    pub fn convergence_failed(iterations: u32, residual: f64) -> Self {
        Self::ConvergenceFailed {
            iterations,
            residual,
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Returns true if the error came from a bracket search or an exhausted
    /// evaluation budget, the two cases a wider search interval can fix.
    #[must_use]
    pub fn is_search_failure(&self) -> bool {
        matches!(
            self,
            Self::ConvergenceFailed { .. } | Self::InvalidBracket { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::convergence_failed(100, 1e-6);
        assert!(err.to_string().contains("100 evaluations"));

        let err = MathError::ExtrapolationNotAllowed {
            x: 3.0,
            min: 0.0,
            max: 2.0,
        };
        assert_eq!(err.to_string(), "Extrapolation not allowed: 3 is outside [0, 2]");
    }

    #[test]
    fn test_search_failure_classification() {
        assert!(MathError::convergence_failed(10, 1.0).is_search_failure());
        assert!(!MathError::NonFiniteValue { x: 1.0 }.is_search_failure());
        assert!(!MathError::insufficient_data(2, 1).is_search_failure());
    }
}
