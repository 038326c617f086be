//! Zero rate helper.

use std::sync::Arc;

use pillar_core::Date;

use super::Helper;
use crate::error::CurveResult;
use crate::quote::Quote;
use crate::traits::CurveView;

/// A continuously compounded zero rate to a single date.
///
/// On credit curves the same quote reads as an average hazard rate, since
/// `-ln(S(t)) / t` is the mean hazard over `[0, t]`.
#[derive(Debug, Clone)]
pub struct ZeroRateHelper {
    quote: Arc<dyn Quote>,
    pillar: Date,
}

impl ZeroRateHelper {
    /// Creates a helper quoting the zero rate to `pillar`.
    #[must_use]
    pub fn new(quote: Arc<dyn Quote>, pillar: Date) -> Self {
        Self { quote, pillar }
    }
}

impl Helper for ZeroRateHelper {
    fn pillar_date(&self) -> Date {
        self.pillar
    }

    fn quote(&self) -> &dyn Quote {
        self.quote.as_ref()
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        curve.zero_rate(curve.time_from_reference(self.pillar))
    }

    fn description(&self) -> String {
        format!("Zero rate to {}", self.pillar)
    }
}
