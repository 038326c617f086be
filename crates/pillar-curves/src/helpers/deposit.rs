//! Deposit and FRA helper.

use std::sync::Arc;

use pillar_core::daycounts::DayCountConvention;
use pillar_core::Date;

use super::Helper;
use crate::error::{CurveError, CurveResult};
use crate::quote::Quote;
use crate::traits::CurveView;

/// A simple-compounded rate between two dates.
///
/// Covers spot-starting deposits and forward-starting FRAs alike. The
/// pillar is the end date.
///
/// # Pricing Formula
///
/// ```text
/// rate = (D(start) / D(end) - 1) / τ
/// ```
/// where τ is the year fraction under the helper's own day count.
#[derive(Debug, Clone)]
pub struct DepositHelper {
    quote: Arc<dyn Quote>,
    start: Date,
    end: Date,
    day_count: DayCountConvention,
    tau: f64,
}

impl DepositHelper {
    /// Creates an ACT/360 deposit.
    pub fn new(quote: Arc<dyn Quote>, start: Date, end: Date) -> CurveResult<Self> {
        Self::with_day_count(quote, start, end, DayCountConvention::Act360)
    }

    /// Creates a deposit accruing under `day_count`.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidHelper` unless `end` is after `start`.
    pub fn with_day_count(
        quote: Arc<dyn Quote>,
        start: Date,
        end: Date,
        day_count: DayCountConvention,
    ) -> CurveResult<Self> {
        if end <= start {
            return Err(CurveError::invalid_helper(format!(
                "deposit end {end} must be after start {start}"
            )));
        }
        let tau = day_count.to_day_count().year_fraction_f64(start, end);
        Ok(Self {
            quote,
            start,
            end,
            day_count,
            tau,
        })
    }

    /// Accrual start.
    #[must_use]
    pub fn start(&self) -> Date {
        self.start
    }

    /// Accrual end.
    #[must_use]
    pub fn end(&self) -> Date {
        self.end
    }

    /// Accrual year fraction.
    #[must_use]
    pub fn accrual(&self) -> f64 {
        self.tau
    }
}

impl Helper for DepositHelper {
    fn pillar_date(&self) -> Date {
        self.end
    }

    fn quote(&self) -> &dyn Quote {
        self.quote.as_ref()
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        let df_start = curve.discount_date(self.start)?;
        let df_end = curve.discount_date(self.end)?;
        Ok((df_start / df_end - 1.0) / self.tau)
    }

    fn description(&self) -> String {
        format!("Deposit {} to {} ({})", self.start, self.end, self.day_count)
    }
}
