//! What the node values of a curve represent.

use serde::{Deserialize, Serialize};
use std::fmt;

use pillar_math::interpolation::InterpolationMethod;
use pillar_math::solvers::Bracket;

/// First-guess average rate for discount curves.
const AVERAGE_RATE: f64 = 0.05;

/// First-guess average hazard rate for credit curves.
const AVERAGE_HAZARD_RATE: f64 = 0.01;

/// The quantity stored at each node.
///
/// The kind fixes the anchor value at t = 0, the first guess handed to the
/// root finder and the interval it searches in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurveKind {
    /// Discount factors; anchor 1.0.
    #[default]
    Discount,

    /// Survival probabilities; anchor 1.0, non-increasing in the default search.
    SurvivalProbability,

    /// Hazard rates; anchor 0.0. Survival is `exp(-∫h)`.
    HazardRate,
}

impl CurveKind {
    /// Value of the synthetic node at t = 0.
    #[must_use]
    pub fn anchor_value(self) -> f64 {
        match self {
            Self::Discount | Self::SurvivalProbability => 1.0,
            Self::HazardRate => 0.0,
        }
    }

    /// Initial guess for node `index` (1-based) at time `t`.
    ///
    /// The first pillar gets a prescribed guess; later ones start from the
    /// previous node's value.
    #[must_use]
    pub fn initial_guess(self, index: usize, previous: f64, t: f64) -> f64 {
        if index > 1 {
            return previous;
        }
        match self {
            Self::Discount => 1.0 / (1.0 + AVERAGE_RATE * t),
            Self::SurvivalProbability => 1.0 / (1.0 + AVERAGE_HAZARD_RATE * t),
            Self::HazardRate => AVERAGE_HAZARD_RATE,
        }
    }

    /// Default search interval for a node `dt` years after a node with value `previous`.
    #[must_use]
    pub fn search_bracket(self, previous: f64, dt: f64) -> Bracket {
        let bracket = match self {
            // Forwards between -10% and 100%
            Self::Discount => Bracket {
                lower: previous * (-dt).exp(),
                upper: previous * (0.1 * dt).exp(),
            },
            // Hazard between 0% and 100%
            Self::SurvivalProbability => Bracket {
                lower: previous * (-dt).exp(),
                upper: previous,
            },
            Self::HazardRate => Bracket {
                lower: 0.0,
                upper: previous.max(0.5) * 2.0,
            },
        };
        let (min, max) = self.domain();
        bracket.restrict(min, max)
    }

    /// Hard limits no search interval may leave, even after widening.
    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        match self {
            Self::Discount => (1e-12, 10.0),
            Self::SurvivalProbability => (1e-12, 1.0),
            Self::HazardRate => (-1.0, 10.0),
        }
    }

    /// Returns true if node values are discount factors or survival probabilities.
    #[must_use]
    pub fn is_probability_like(self) -> bool {
        matches!(self, Self::Discount | Self::SurvivalProbability)
    }

    /// Returns true if `method` can interpolate this kind's node values.
    ///
    /// Log-linear needs strictly positive values; hazard rates start at 0.
    #[must_use]
    pub fn supports(self, method: InterpolationMethod) -> bool {
        !(self == Self::HazardRate && method == InterpolationMethod::LogLinear)
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discount => "Discount",
            Self::SurvivalProbability => "Survival Probability",
            Self::HazardRate => "Hazard Rate",
        };
        write!(f, "{name}")
    }
}
