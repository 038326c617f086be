//! Turn-of-year effect.
//!
//! Year-end funding pressure shows up as a jump in discount factors across
//! 31 December. The bootstrapped curve is smooth; this adjustment multiplies
//! every value past the jump by a quoted factor. It is applied to query
//! results only and never seen by helpers during a solve.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pillar_core::daycounts::DayCount;
use pillar_core::Date;

use crate::error::{CurveError, CurveResult};
use crate::quote::Quote;

/// Jump time computed for one reference date.
#[derive(Debug, Clone, Copy)]
struct JumpWindow {
    reference_date: Date,
    jump_time: f64,
}

/// A multiplicative jump at a single date.
///
/// The factor is read from the quote on every query, so quote changes take
/// effect without re-bootstrapping. The jump time is cached against the
/// reference date it was computed for and only recomputed when that date
/// changes.
pub struct TurnOfYearEffect {
    quote: Arc<dyn Quote>,
    jump_date: Option<Date>,
    window: Mutex<Option<JumpWindow>>,
    recomputations: AtomicU64,
}

impl TurnOfYearEffect {
    /// Jumps at 31 December of the reference date's year.
    #[must_use]
    pub fn new(quote: Arc<dyn Quote>) -> Self {
        Self {
            quote,
            jump_date: None,
            window: Mutex::new(None),
            recomputations: AtomicU64::new(0),
        }
    }

    /// Jumps at `date` instead of the year end.
    #[must_use]
    pub fn with_jump_date(mut self, date: Date) -> Self {
        self.jump_date = Some(date);
        self
    }

    /// The factor quote.
    #[must_use]
    pub fn quote(&self) -> &dyn Quote {
        self.quote.as_ref()
    }

    /// Jump date for a curve referenced at `reference_date`.
    pub fn jump_date(&self, reference_date: Date) -> CurveResult<Date> {
        match self.jump_date {
            Some(date) => Ok(date),
            None => Ok(reference_date.end_of_year()?),
        }
    }

    /// Curve time of the jump, cached per reference date.
    pub fn jump_time(&self, reference_date: Date, day_count: &dyn DayCount) -> CurveResult<f64> {
        let mut window = self.window.lock();
        if let Some(cached) = *window {
            if cached.reference_date == reference_date {
                return Ok(cached.jump_time);
            }
        }

        let jump_time = day_count.year_fraction_f64(reference_date, self.jump_date(reference_date)?);
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%reference_date, jump_time, "turn-of-year window recomputed");
        *window = Some(JumpWindow {
            reference_date,
            jump_time,
        });
        Ok(jump_time)
    }

    /// Current factor.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidAdjustment` if the quote is empty or the
    /// factor lies outside `(0, 1]`.
    pub fn factor(&self) -> CurveResult<f64> {
        let factor = self
            .quote
            .value()
            .ok_or_else(|| CurveError::invalid_adjustment("turn-of-year quote has no value"))?;
        if factor > 0.0 && factor <= 1.0 {
            Ok(factor)
        } else {
            Err(CurveError::invalid_adjustment(format!(
                "turn-of-year factor must lie in (0, 1], got {factor}"
            )))
        }
    }

    /// Applies the jump to a discount factor or survival probability at `t`.
    pub fn apply(
        &self,
        t: f64,
        value: f64,
        reference_date: Date,
        day_count: &dyn DayCount,
    ) -> CurveResult<f64> {
        if t > self.jump_time(reference_date, day_count)? {
            Ok(value * self.factor()?)
        } else {
            Ok(value)
        }
    }

    /// Number of times the jump time was computed.
    #[must_use]
    pub fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for TurnOfYearEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnOfYearEffect")
            .field("factor", &self.quote.value())
            .field("jump_date", &self.jump_date)
            .finish_non_exhaustive()
    }
}
