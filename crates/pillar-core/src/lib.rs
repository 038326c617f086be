//! # Pillar Core
//!
//! Foundational types shared by the Pillar crates:
//!
//! - **Dates**: [`Date`], a thin newtype over `chrono::NaiveDate`
//! - **Day Counts**: the [`DayCount`](daycounts::DayCount) trait with ACT/360 and ACT/365F
//! - **Errors**: [`CoreError`] and [`CoreResult`]
//!
//! ## Example
//!
//! ```rust
//! use pillar_core::prelude::*;
//!
//! let start = Date::from_ymd(2025, 1, 1).unwrap();
//! let end = start.add_months(6).unwrap();
//! let tau = Act365Fixed.year_fraction_f64(start, end);
//! assert!(tau > 0.49 && tau < 0.5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod date;
pub mod daycounts;
pub mod error;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::date::Date;
    pub use crate::daycounts::{Act360, Act365Fixed, DayCount, DayCountConvention};
    pub use crate::error::{CoreError, CoreResult};
}

pub use date::Date;
pub use error::{CoreError, CoreResult};
