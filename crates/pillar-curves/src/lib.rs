//! # Pillar Curves
//!
//! Piecewise bootstrapping of term structures from market quotes.
//!
//! This crate provides:
//!
//! - **Helpers**: the [`Helper`](helpers::Helper) contract tying one quote to one
//!   pillar, with deposit, swap and zero-rate implementations
//! - **Bootstrap**: the [`SequentialBootstrapper`](bootstrap::SequentialBootstrapper),
//!   solving one node per pillar with bracket widening, one-pillar extrapolation
//!   and a seeded global retry
//! - **Lazy recalculation**: [`LazyController`](lazy::LazyController), solving
//!   only after an input changed and memoizing failures
//! - **Curves**: [`PiecewiseCurve`], the query surface over the committed nodes,
//!   for discount factors, survival probabilities and hazard rates
//! - **Adjustments**: a turn-of-year jump applied after interpolation
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use pillar_core::prelude::*;
//! use pillar_curves::prelude::*;
//!
//! let reference = Date::from_ymd(2025, 1, 1).unwrap();
//! let deposit: Arc<dyn Helper> = Arc::new(
//!     DepositHelper::new(
//!         Arc::new(SimpleQuote::new(0.0525)),
//!         reference,
//!         Date::from_ymd(2025, 7, 1).unwrap(),
//!     )
//!     .unwrap(),
//! );
//! let swap: Arc<dyn Helper> = Arc::new(
//!     SwapHelper::new(
//!         Arc::new(SimpleQuote::new(0.045)),
//!         reference,
//!         Date::from_ymd(2030, 1, 1).unwrap(),
//!         12,
//!     )
//!     .unwrap(),
//! );
//!
//! let curve = PiecewiseCurve::builder(reference)
//!     .with_helpers([deposit, swap])
//!     .build()
//!     .unwrap();
//!
//! let df = curve.discount(2.5).unwrap();
//! assert!(df > 0.85 && df < 0.95);
//! assert!(curve.last_report().unwrap().all_passed());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

pub mod adjustment;
pub mod bootstrap;
pub mod config;
pub mod curve;
pub mod error;
pub mod helpers;
pub mod kind;
pub mod lazy;
pub mod nodes;
pub mod observer;
pub mod quote;
pub mod repricing;
pub mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adjustment::TurnOfYearEffect;
    pub use crate::bootstrap::{BootstrapInputs, BootstrapOutcome, SequentialBootstrapper};
    pub use crate::config::{BootstrapConfig, PiecewiseCurveConfig};
    pub use crate::curve::{CommittedCurve, PiecewiseCurve, PiecewiseCurveBuilder};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::helpers::{DepositHelper, Helper, SwapHelper, ZeroRateHelper};
    pub use crate::kind::CurveKind;
    pub use crate::lazy::LazyController;
    pub use crate::nodes::{Node, NodeCurve, NodeStore};
    pub use crate::observer::{Observable, Observer};
    pub use crate::quote::{Quote, SimpleQuote};
    pub use crate::repricing::{RepricingCheck, RepricingReport};
    pub use crate::traits::CurveView;
}

pub use curve::PiecewiseCurve;
pub use error::{CurveError, CurveResult};
