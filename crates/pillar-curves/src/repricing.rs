//! Repricing of helpers against a finished curve.
//!
//! After every full pass the bootstrap engine reprices each helper against
//! the complete curve, not the trial curve it was solved on. With local
//! interpolation the two agree; global schemes such as cubic splines let a
//! later node move an earlier pillar, which only this check can see.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CurveError, CurveResult};
use crate::helpers::Helper;
use crate::traits::CurveView;

/// Result of repricing one helper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepricingCheck {
    /// Node index of the helper's pillar (1-based).
    pub helper_index: usize,

    /// Helper description.
    pub description: String,

    /// Quote observed in the market.
    pub market_quote: f64,

    /// Quote implied by the curve.
    pub implied_quote: f64,

    /// `implied_quote - market_quote`
    pub residual: f64,

    /// `|residual|`
    pub error: f64,

    /// Largest acceptable error.
    pub tolerance: f64,

    /// Whether `error <= tolerance`.
    pub passed: bool,
}

impl RepricingCheck {
    /// Creates a check from the two quotes.
    #[must_use]
    pub fn new(
        helper_index: usize,
        description: String,
        market_quote: f64,
        implied_quote: f64,
        tolerance: f64,
    ) -> Self {
        let residual = implied_quote - market_quote;
        let error = residual.abs();
        Self {
            helper_index,
            description,
            market_quote,
            implied_quote,
            residual,
            error,
            tolerance,
            passed: error <= tolerance,
        }
    }

    /// Reprices `helper` against `curve`.
    pub fn evaluate(
        helper_index: usize,
        helper: &dyn Helper,
        curve: &dyn CurveView,
        tolerance: f64,
    ) -> CurveResult<Self> {
        let market = helper.market_quote()?;
        let implied = helper.implied_quote(curve)?;
        Ok(Self::new(
            helper_index,
            helper.description(),
            market,
            implied,
            tolerance,
        ))
    }
}

impl fmt::Display for RepricingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "✓" } else { "✗" };
        write!(
            f,
            "{} [{}] {} | market: {:.8} | implied: {:.8} | error: {:.2e} (tol: {:.2e})",
            status,
            self.helper_index,
            self.description,
            self.market_quote,
            self.implied_quote,
            self.error,
            self.tolerance
        )
    }
}

/// Repricing results for every helper of a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepricingReport {
    checks: Vec<RepricingCheck>,
    max_error: f64,
    rms_error: f64,
    all_passed: bool,
    worst_index: Option<usize>,
}

impl RepricingReport {
    /// Summarises individual checks.
    #[must_use]
    pub fn new(checks: Vec<RepricingCheck>) -> Self {
        let worst = checks
            .iter()
            .max_by(|a, b| a.error.total_cmp(&b.error));
        let max_error = worst.map_or(0.0, |c| c.error);
        let worst_index = worst.map(|c| c.helper_index);

        let rms_error = if checks.is_empty() {
            0.0
        } else {
            let sum_sq: f64 = checks.iter().map(|c| c.error * c.error).sum();
            (sum_sq / checks.len() as f64).sqrt()
        };
        let all_passed = checks.iter().all(|c| c.passed);

        Self {
            checks,
            max_error,
            rms_error,
            all_passed,
            worst_index,
        }
    }

    /// Individual checks in pillar order.
    #[must_use]
    pub fn checks(&self) -> &[RepricingCheck] {
        &self.checks
    }

    /// Largest absolute error.
    #[must_use]
    pub fn max_error(&self) -> f64 {
        self.max_error
    }

    /// Root mean square of the errors.
    #[must_use]
    pub fn rms_error(&self) -> f64 {
        self.rms_error
    }

    /// Whether every helper repriced within tolerance.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.all_passed
    }

    /// Helper index with the largest error.
    #[must_use]
    pub fn worst_index(&self) -> Option<usize> {
        self.worst_index
    }

    /// Checks that missed their tolerance.
    #[must_use]
    pub fn failed_checks(&self) -> Vec<&RepricingCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// The error to report if any check failed.
    #[must_use]
    pub fn failure(&self) -> Option<CurveError> {
        if self.all_passed {
            return None;
        }
        let worst = self
            .checks
            .iter()
            .max_by(|a, b| a.error.total_cmp(&b.error))?;
        Some(CurveError::GlobalCheckFailure {
            worst_helper_index: worst.helper_index,
            residual: worst.residual,
        })
    }
}

impl fmt::Display for RepricingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        writeln!(f, "Repricing Report")?;
        writeln!(f, "================")?;
        writeln!(f, "Status: {}", if self.all_passed { "PASSED" } else { "FAILED" })?;
        writeln!(f, "Helpers: {}/{} passed", passed, self.checks.len())?;
        writeln!(f, "Max Error: {:.2e}", self.max_error)?;
        writeln!(f, "RMS Error: {:.2e}", self.rms_error)?;

        if !self.checks.is_empty() {
            writeln!(f)?;
            writeln!(f, "Details:")?;
            for check in &self.checks {
                writeln!(f, "  {check}")?;
            }
        }

        Ok(())
    }
}
