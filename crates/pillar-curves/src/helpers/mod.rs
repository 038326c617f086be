//! Calibration helpers.
//!
//! A helper ties one market quote to one pillar of the curve. The bootstrap
//! engine asks it for the quote the curve implies and moves the pillar's node
//! until that matches the market.
//!
//! # Available Helpers
//!
//! - [`DepositHelper`]: simple-compounded deposits and FRAs
//! - [`SwapHelper`]: single-curve par swaps
//! - [`ZeroRateHelper`]: continuously compounded zero rates or average hazard rates
//!
//! Anything implementing [`Helper`] can be mixed in the same curve.

mod deposit;
mod swap;
mod zero;

pub use deposit::DepositHelper;
pub use swap::SwapHelper;
pub use zero::ZeroRateHelper;

use std::fmt;
use std::sync::Weak;

use pillar_core::Date;

use crate::error::{CurveError, CurveResult};
use crate::observer::Observer;
use crate::quote::Quote;
use crate::traits::CurveView;

/// A calibrating instrument.
///
/// `implied_quote` must be pure for a given curve view: the engine calls it
/// many times per pillar with trial curves that differ only in the last node.
pub trait Helper: Send + Sync + fmt::Debug {
    /// Date whose curve time becomes this helper's pillar.
    fn pillar_date(&self) -> Date;

    /// Latest date at which `implied_quote` reads the curve.
    fn latest_relevant_date(&self) -> Date {
        self.pillar_date()
    }

    /// The quote this helper calibrates to.
    fn quote(&self) -> &dyn Quote;

    /// Current market quote.
    fn market_quote(&self) -> CurveResult<f64> {
        self.quote().value().ok_or_else(|| {
            CurveError::invalid_quote(format!("no value for {}", self.description()))
        })
    }

    /// Quote implied by `curve`.
    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64>;

    /// Implied minus market quote.
    fn quote_error(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        Ok(self.implied_quote(curve)? - self.market_quote()?)
    }

    /// Short human-readable description.
    fn description(&self) -> String;

    /// Subscribes `observer` to quote changes.
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.quote().register_observer(observer);
    }

    /// Cancels a subscription made with `register_observer`.
    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.quote().unregister_observer(observer);
    }
}
