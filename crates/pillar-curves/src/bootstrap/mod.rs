//! The bootstrap engine.
//!
//! Solves one node per helper, in pillar order, so that each helper reprices
//! to its market quote:
//!
//! 1. Validate: at least one helper, pillars on or after the reference date
//!    and strictly increasing.
//! 2. For each pillar, find the node value that zeroes
//!    `implied_quote(trial curve) - market_quote`. The trial curve holds the
//!    nodes already solved in this pass plus the candidate.
//! 3. Reprice every helper against the finished curve. If that fails, run
//!    the pass once more seeded with the first pass's values.
//!
//! Nothing is published until the whole run succeeds.

mod sequential;

pub use sequential::SequentialBootstrapper;

use std::sync::Arc;
use std::time::Duration;

use pillar_core::daycounts::DayCount;
use pillar_core::Date;
use pillar_math::interpolation::Interpolation;

use crate::helpers::Helper;
use crate::kind::CurveKind;
use crate::nodes::{NodeCurve, NodeStore};
use crate::repricing::RepricingReport;

/// Pillars closer than this (in years) count as the same pillar.
pub const MIN_PILLAR_SPACING: f64 = 1e-10;

/// Nodes in the first trial curve: the anchor and the first pillar.
///
/// Interpolation schemes needing more than this cannot be bootstrapped.
pub const MIN_TRIAL_NODES: usize = 2;

/// What a bootstrap run reads.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapInputs<'a> {
    /// Date at which t = 0.
    pub reference_date: Date,
    /// Convention mapping pillar dates to times.
    pub day_count: &'a Arc<dyn DayCount>,
    /// What the nodes hold.
    pub kind: CurveKind,
    /// Interpolation used for trial and final curves.
    pub interpolation: &'a dyn Interpolation,
    /// Calibrating helpers, in any order.
    pub helpers: &'a [Arc<dyn Helper>],
}

/// A successful bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    /// Solved nodes, anchor first.
    pub nodes: NodeStore,
    /// Pillar date of each non-anchor node.
    pub pillar_dates: Vec<Date>,
    /// Curve over `nodes`, with extrapolation disabled.
    pub curve: NodeCurve,
    /// Global repricing report, if the check ran.
    pub report: Option<RepricingReport>,
    /// Full passes run: one, plus one for a global interpolation scheme and
    /// one for a global retry.
    pub passes: u32,
    /// Objective evaluations across all passes.
    pub evaluations: u32,
    /// Wall-clock time of the run.
    pub duration: Duration,
}
