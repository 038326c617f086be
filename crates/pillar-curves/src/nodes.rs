//! The Node Store and the curve built over it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use pillar_core::daycounts::DayCount;
use pillar_core::Date;
use pillar_math::interpolation::Interpolator;

use crate::error::{CurveError, CurveResult};
use crate::kind::CurveKind;
use crate::traits::CurveView;

/// A solved `(time, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Time from the reference date in years.
    pub time: f64,
    /// Node value (discount factor, survival probability or hazard rate).
    pub value: f64,
}

/// Ordered nodes backing a curve.
///
/// Index 0 is the synthetic anchor at t = 0; indices `1..=n` match the
/// helpers sorted by pillar time. Times are strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStore {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl NodeStore {
    /// A store holding only the anchor node for `kind`.
    #[must_use]
    pub fn anchor(kind: CurveKind) -> Self {
        Self {
            times: vec![0.0],
            values: vec![kind.anchor_value()],
        }
    }

    /// Builds a store from a complete solution.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidConfig` if the vectors differ in length,
    /// the first time is not zero or the times are not strictly increasing.
    pub fn from_solution(times: Vec<f64>, values: Vec<f64>) -> CurveResult<Self> {
        if times.len() != values.len() || times.is_empty() {
            return Err(CurveError::invalid_config(format!(
                "node store needs matching non-empty vectors: {} times, {} values",
                times.len(),
                values.len()
            )));
        }
        if times[0] != 0.0 {
            return Err(CurveError::invalid_config("first node must sit at t = 0"));
        }
        if let Some(w) = times.windows(2).find(|w| w[1] <= w[0]) {
            return Err(CurveError::DuplicatePillar { time: w[1] });
        }
        Ok(Self { times, values })
    }

    /// Number of nodes, anchor included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false: the anchor is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// True if nothing beyond the anchor has been committed.
    #[must_use]
    pub fn is_anchor_only(&self) -> bool {
        self.times.len() == 1
    }

    /// Node times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Node values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Node at `index`.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<Node> {
        Some(Node {
            time: *self.times.get(index)?,
            value: *self.values.get(index)?,
        })
    }

    /// All nodes in order.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        self.times
            .iter()
            .zip(&self.values)
            .map(|(&time, &value)| Node { time, value })
            .collect()
    }

    /// Time of the last node.
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

/// A continuous curve over a set of nodes.
///
/// Used for bootstrap trials, the global repricing check and the committed
/// curve. Cloning shares the interpolator.
#[derive(Clone)]
pub struct NodeCurve {
    reference_date: Date,
    day_count: Arc<dyn DayCount>,
    kind: CurveKind,
    interpolator: Arc<dyn Interpolator>,
    allow_extrapolation: bool,
}

impl NodeCurve {
    /// Creates a curve that refuses to extrapolate.
    #[must_use]
    pub fn new(
        reference_date: Date,
        day_count: Arc<dyn DayCount>,
        kind: CurveKind,
        interpolator: Box<dyn Interpolator>,
    ) -> Self {
        Self {
            reference_date,
            day_count,
            kind,
            interpolator: Arc::from(interpolator),
            allow_extrapolation: false,
        }
    }

    /// Returns a copy with the given extrapolation policy.
    #[must_use]
    pub fn extrapolating(&self, allow: bool) -> Self {
        Self {
            allow_extrapolation: allow,
            ..self.clone()
        }
    }

    /// The interpolator over the nodes.
    #[must_use]
    pub fn interpolator(&self) -> &dyn Interpolator {
        self.interpolator.as_ref()
    }

    /// Returns true if queries beyond the nodes are answered.
    #[must_use]
    pub fn allows_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    /// Node-space value at `t` under an explicit extrapolation policy.
    pub fn value_with(&self, t: f64, allow_extrapolation: bool) -> CurveResult<f64> {
        Ok(self.interpolator.evaluate(t, allow_extrapolation)?)
    }

    /// Discount factor (or survival probability) under an explicit extrapolation policy.
    pub fn discount_with(&self, t: f64, allow_extrapolation: bool) -> CurveResult<f64> {
        match self.kind {
            CurveKind::Discount | CurveKind::SurvivalProbability => {
                self.value_with(t, allow_extrapolation)
            }
            CurveKind::HazardRate => {
                let cumulative = self.interpolator.integral(0.0, t, allow_extrapolation)?;
                Ok((-cumulative).exp())
            }
        }
    }
}

impl CurveView for NodeCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_count(&self) -> &dyn DayCount {
        self.day_count.as_ref()
    }

    fn kind(&self) -> CurveKind {
        self.kind
    }

    fn value_at(&self, t: f64) -> CurveResult<f64> {
        self.value_with(t, self.allow_extrapolation)
    }

    fn discount(&self, t: f64) -> CurveResult<f64> {
        self.discount_with(t, self.allow_extrapolation)
    }
}

impl fmt::Debug for NodeCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCurve")
            .field("reference_date", &self.reference_date)
            .field("kind", &self.kind)
            .field("times", &self.interpolator.xs())
            .field("values", &self.interpolator.ys())
            .field("allow_extrapolation", &self.allow_extrapolation)
            .finish()
    }
}
