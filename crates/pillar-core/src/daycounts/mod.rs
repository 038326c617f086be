//! Day count conventions.
//!
//! A curve converts every date into a time-from-reference through its day
//! count, so pillar times and query times are only comparable under the same
//! convention.
//!
//! - [`Act360`]: Actual/360, money market deposits and FRAs
//! - [`Act365Fixed`]: Actual/365 Fixed, the usual curve time axis

mod act360;
mod act365;

pub use act360::Act360;
pub use act365::Act365Fixed;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::date::Date;
use crate::error::CoreError;

/// Trait for day count conventions.
///
/// Implementations must be thread-safe so curves holding a boxed day count
/// can be shared across threads.
pub trait DayCount: Send + Sync + fmt::Debug {
    /// Returns the market name of the convention (e.g. "ACT/360").
    fn name(&self) -> &'static str;

    /// Exact year fraction between two dates. Negative if `end < start`.
    fn year_fraction(&self, start: Date, end: Date) -> Decimal;

    /// Day count between two dates according to the convention.
    fn day_count(&self, start: Date, end: Date) -> i64;

    /// Year fraction as `f64`, the unit curves work in.
    fn year_fraction_f64(&self, start: Date, end: Date) -> f64 {
        self.year_fraction(start, end).to_f64().unwrap_or(f64::NAN)
    }
}

/// Runtime-selectable day count convention.
///
/// # Example
///
/// ```rust
/// use pillar_core::daycounts::DayCountConvention;
/// use pillar_core::Date;
///
/// let dc = "ACT/360".parse::<DayCountConvention>().unwrap().to_day_count();
/// let start = Date::from_ymd(2025, 1, 1).unwrap();
/// let end = Date::from_ymd(2025, 4, 1).unwrap();
/// assert_eq!(dc.year_fraction_f64(start, end), 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DayCountConvention {
    /// Actual/360
    Act360,
    /// Actual/365 Fixed
    #[default]
    Act365Fixed,
}

impl DayCountConvention {
    /// Returns a boxed implementation of the convention.
    #[must_use]
    pub fn to_day_count(self) -> Box<dyn DayCount> {
        match self {
            Self::Act360 => Box::new(Act360),
            Self::Act365Fixed => Box::new(Act365Fixed),
        }
    }

    /// Returns the market name of the convention.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Act360 => Act360.name(),
            Self::Act365Fixed => Act365Fixed.name(),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DayCountConvention {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(' ', "").as_str() {
            "ACT/360" | "A360" | "ACT360" => Ok(Self::Act360),
            "ACT/365F" | "ACT/365FIXED" | "ACT/365" | "A365F" | "ACT365F" => Ok(Self::Act365Fixed),
            _ => Err(CoreError::parse_error(format!("unknown day count: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_round_trip_names() {
        for convention in [DayCountConvention::Act360, DayCountConvention::Act365Fixed] {
            let parsed: DayCountConvention = convention.to_string().parse().unwrap();
            assert_eq!(parsed, convention);
            assert_eq!(convention.to_day_count().name(), convention.name());
        }
    }

    #[test]
    fn test_unknown_convention() {
        assert!("30/360".parse::<DayCountConvention>().is_err());
    }

    #[test]
    fn test_default_is_act365f() {
        assert_eq!(DayCountConvention::default(), DayCountConvention::Act365Fixed);
    }
}
