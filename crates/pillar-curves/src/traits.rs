//! The read-only curve surface helpers price against.

use pillar_core::daycounts::DayCount;
use pillar_core::Date;
use pillar_math::MathError;

use crate::error::{CurveError, CurveResult};
use crate::kind::CurveKind;

/// Time step used for rates quoted at t = 0.
const SHORT_END: f64 = 1e-4;

/// A term structure as seen by a helper.
///
/// Implemented by the trial curves the bootstrap engine builds for each
/// candidate node value and by the finished [`PiecewiseCurve`](crate::PiecewiseCurve).
/// `discount` is a discount factor for discount curves and a survival
/// probability for credit curves.
pub trait CurveView {
    /// Date at which t = 0.
    fn reference_date(&self) -> Date;

    /// Convention converting dates to times.
    fn day_count(&self) -> &dyn DayCount;

    /// What the node values represent.
    fn kind(&self) -> CurveKind;

    /// Interpolated node-space value at `t`.
    fn value_at(&self, t: f64) -> CurveResult<f64>;

    /// Discount factor (or survival probability) at `t`.
    fn discount(&self, t: f64) -> CurveResult<f64>;

    /// Year fraction from the reference date to `date`.
    fn time_from_reference(&self, date: Date) -> f64 {
        self.day_count().year_fraction_f64(self.reference_date(), date)
    }

    /// Discount factor (or survival probability) at `date`.
    fn discount_date(&self, date: Date) -> CurveResult<f64> {
        self.discount(self.time_from_reference(date))
    }

    /// Continuously compounded zero rate (average hazard rate on credit curves).
    fn zero_rate(&self, t: f64) -> CurveResult<f64> {
        let t = if t > 0.0 { t } else { SHORT_END };
        Ok(-self.discount(t)?.ln() / t)
    }

    /// Continuously compounded forward rate between `t1` and `t2`.
    fn forward_rate(&self, t1: f64, t2: f64) -> CurveResult<f64> {
        if t2 <= t1 {
            return Err(CurveError::Math(MathError::invalid_input(format!(
                "forward period must be increasing: [{t1}, {t2}]"
            ))));
        }
        let d1 = self.discount(t1)?;
        let d2 = self.discount(t2)?;
        Ok((d1 / d2).ln() / (t2 - t1))
    }
}
