//! Single-curve par swap helper.

use std::sync::Arc;

use pillar_core::daycounts::DayCountConvention;
use pillar_core::Date;

use super::Helper;
use crate::error::{CurveError, CurveResult};
use crate::quote::Quote;
use crate::traits::CurveView;

/// A par swap priced off one curve.
///
/// The fixed leg rolls forward from the start date in whole months; a short
/// final stub ends at maturity. The floating leg is worth `D(start) - D(end)`.
///
/// # Pricing Formula
///
/// ```text
/// par = (D(start) - D(end)) / Σ τ_i D(t_i)
/// ```
#[derive(Debug, Clone)]
pub struct SwapHelper {
    quote: Arc<dyn Quote>,
    start: Date,
    maturity: Date,
    fixed_day_count: DayCountConvention,
    /// Fixed leg payment dates, maturity last.
    payments: Vec<Date>,
    /// Accrual fraction of each fixed period.
    accruals: Vec<f64>,
}

impl SwapHelper {
    /// Creates a swap with an ACT/365F fixed leg paying every `period_months`.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidHelper` if maturity is not after start or
    /// the period is zero.
    pub fn new(
        quote: Arc<dyn Quote>,
        start: Date,
        maturity: Date,
        period_months: u32,
    ) -> CurveResult<Self> {
        Self::with_day_count(
            quote,
            start,
            maturity,
            period_months,
            DayCountConvention::Act365Fixed,
        )
    }

    /// Creates a swap whose fixed leg accrues under `fixed_day_count`.
    pub fn with_day_count(
        quote: Arc<dyn Quote>,
        start: Date,
        maturity: Date,
        period_months: u32,
        fixed_day_count: DayCountConvention,
    ) -> CurveResult<Self> {
        if maturity <= start {
            return Err(CurveError::invalid_helper(format!(
                "swap maturity {maturity} must be after start {start}"
            )));
        }
        let step = i32::try_from(period_months)
            .ok()
            .filter(|&m| m > 0)
            .ok_or_else(|| {
                CurveError::invalid_helper(format!("invalid fixed period: {period_months}M"))
            })?;

        let mut payments = Vec::new();
        let mut periods = 1;
        loop {
            let date = start.add_months(step * periods)?;
            if date >= maturity {
                break;
            }
            payments.push(date);
            periods += 1;
        }
        payments.push(maturity);

        let dc = fixed_day_count.to_day_count();
        let mut accruals = Vec::with_capacity(payments.len());
        let mut previous = start;
        for &date in &payments {
            accruals.push(dc.year_fraction_f64(previous, date));
            previous = date;
        }

        Ok(Self {
            quote,
            start,
            maturity,
            fixed_day_count,
            payments,
            accruals,
        })
    }

    /// Fixed leg payment dates.
    #[must_use]
    pub fn payment_dates(&self) -> &[Date] {
        &self.payments
    }

    /// Present value of one unit of fixed coupon.
    pub fn annuity(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        self.payments
            .iter()
            .zip(&self.accruals)
            .try_fold(0.0, |acc, (&date, &tau)| {
                Ok(acc + tau * curve.discount_date(date)?)
            })
    }
}

impl Helper for SwapHelper {
    fn pillar_date(&self) -> Date {
        self.maturity
    }

    fn quote(&self) -> &dyn Quote {
        self.quote.as_ref()
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        let floating = curve.discount_date(self.start)? - curve.discount_date(self.maturity)?;
        Ok(floating / self.annuity(curve)?)
    }

    fn description(&self) -> String {
        format!(
            "Swap {} to {} ({} periods, {})",
            self.start,
            self.maturity,
            self.payments.len(),
            self.fixed_day_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::CurveKind;
    use crate::nodes::NodeCurve;
    use crate::quote::SimpleQuote;
    use approx::assert_relative_eq;
    use pillar_core::daycounts::Act365Fixed;
    use pillar_math::interpolation::{Interpolation, InterpolationMethod};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_schedule_with_short_stub() {
        let swap = SwapHelper::new(
            Arc::new(SimpleQuote::new(0.03)),
            date(2025, 1, 1),
            date(2026, 3, 1),
            6,
        )
        .unwrap();

        assert_eq!(
            swap.payment_dates(),
            &[date(2025, 7, 1), date(2026, 1, 1), date(2026, 3, 1)]
        );
    }

    #[test]
    fn test_invalid_swaps() {
        let quote: Arc<dyn Quote> = Arc::new(SimpleQuote::new(0.03));
        assert!(SwapHelper::new(quote.clone(), date(2025, 1, 1), date(2025, 1, 1), 12).is_err());
        assert!(SwapHelper::new(quote, date(2025, 1, 1), date(2027, 1, 1), 0).is_err());
    }

    #[test]
    fn test_par_rate_on_flat_curve() {
        let interpolator = InterpolationMethod::LogLinear
            .build(vec![0.0, 5.0], vec![1.0, (-0.15f64).exp()])
            .unwrap();
        let curve = NodeCurve::new(
            date(2025, 1, 1),
            Arc::new(Act365Fixed),
            CurveKind::Discount,
            interpolator,
        );
        let swap = SwapHelper::new(
            Arc::new(SimpleQuote::new(0.03)),
            date(2025, 1, 1),
            date(2027, 1, 1),
            12,
        )
        .unwrap();

        let d1 = (-0.03f64).exp();
        let d2 = (-0.06f64).exp();
        assert_relative_eq!(swap.annuity(&curve).unwrap(), d1 + d2, epsilon = 1e-14);
        assert_relative_eq!(
            swap.implied_quote(&curve).unwrap(),
            (1.0 - d2) / (d1 + d2),
            epsilon = 1e-14
        );
    }
}
