//! The bootstrapped curve and its query surface.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use pillar_core::daycounts::{DayCount, DayCountConvention};
use pillar_core::Date;
use pillar_math::interpolation::{Interpolation, InterpolationMethod};
use pillar_math::solvers::{Brent, RootFinder};

use crate::adjustment::TurnOfYearEffect;
use crate::bootstrap::{BootstrapInputs, BootstrapOutcome, SequentialBootstrapper, MIN_TRIAL_NODES};
use crate::config::{BootstrapConfig, PiecewiseCurveConfig};
use crate::error::{CurveError, CurveResult};
use crate::helpers::Helper;
use crate::kind::CurveKind;
use crate::lazy::{LazyController, Relay};
use crate::nodes::{Node, NodeCurve, NodeStore};
use crate::observer::Observer;
use crate::repricing::RepricingReport;
use crate::traits::CurveView;

/// The result of the last successful solve.
///
/// Immutable; a new solve publishes a new snapshot instead of touching this
/// one, so a snapshot can be queried while the curve recalculates.
#[derive(Debug, Clone)]
pub struct CommittedCurve {
    reference_date: Date,
    nodes: NodeStore,
    pillar_dates: Vec<Date>,
    curve: Option<NodeCurve>,
    report: Option<RepricingReport>,
    passes: u32,
    duration: Duration,
}

impl CommittedCurve {
    fn anchor(reference_date: Date, kind: CurveKind) -> Self {
        Self {
            reference_date,
            nodes: NodeStore::anchor(kind),
            pillar_dates: Vec::new(),
            curve: None,
            report: None,
            passes: 0,
            duration: Duration::ZERO,
        }
    }

    fn from_outcome(reference_date: Date, outcome: BootstrapOutcome) -> Self {
        Self {
            reference_date,
            nodes: outcome.nodes,
            pillar_dates: outcome.pillar_dates,
            curve: Some(outcome.curve),
            report: outcome.report,
            passes: outcome.passes,
            duration: outcome.duration,
        }
    }

    /// Reference date the nodes were solved for.
    #[must_use]
    pub fn reference_date(&self) -> Date {
        self.reference_date
    }

    /// The solved nodes.
    #[must_use]
    pub fn node_store(&self) -> &NodeStore {
        &self.nodes
    }

    /// Node dates, reference date first.
    #[must_use]
    pub fn dates(&self) -> Vec<Date> {
        std::iter::once(self.reference_date)
            .chain(self.pillar_dates.iter().copied())
            .collect()
    }

    /// Last pillar date, or the reference date before any solve.
    #[must_use]
    pub fn max_date(&self) -> Date {
        self.pillar_dates
            .last()
            .copied()
            .unwrap_or(self.reference_date)
    }

    /// Unadjusted curve over the nodes; `None` before the first solve.
    #[must_use]
    pub fn curve(&self) -> Option<&NodeCurve> {
        self.curve.as_ref()
    }

    /// Global repricing report, if the check ran.
    #[must_use]
    pub fn report(&self) -> Option<&RepricingReport> {
        self.report.as_ref()
    }

    /// Passes the solve needed.
    #[must_use]
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Wall-clock time of the solve.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn require_curve(&self) -> CurveResult<&NodeCurve> {
        self.curve.as_ref().ok_or(CurveError::EmptyHelperSet)
    }
}

/// A term structure bootstrapped from helpers.
///
/// Construction is cheap; the first query solves. Quote changes on any
/// helper mark the curve dirty and the next query solves again. A failed
/// solve keeps serving the previous nodes through the inspectors
/// ([`nodes`](Self::nodes), [`times`](Self::times), ...), while every query
/// returns the failure until an input changes.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use pillar_core::prelude::*;
/// use pillar_curves::prelude::*;
///
/// let reference = Date::from_ymd(2025, 1, 1).unwrap();
/// let quote = Arc::new(SimpleQuote::new(0.05));
/// let helper: Arc<dyn Helper> = Arc::new(ZeroRateHelper::new(
///     quote.clone(),
///     Date::from_ymd(2026, 1, 1).unwrap(),
/// ));
///
/// let curve = PiecewiseCurve::builder(reference)
///     .add_helper(helper)
///     .with_day_count(DayCountConvention::Act365Fixed)
///     .build()
///     .unwrap();
///
/// assert!((curve.zero_rate(1.0).unwrap() - 0.05).abs() < 1e-12);
///
/// quote.set_value(0.06);
/// assert!((curve.zero_rate(1.0).unwrap() - 0.06).abs() < 1e-12);
/// assert_eq!(curve.recalculations(), 2);
/// ```
pub struct PiecewiseCurve {
    reference_date: RwLock<Date>,
    config: PiecewiseCurveConfig,
    day_count: Arc<dyn DayCount>,
    interpolation: Arc<dyn Interpolation>,
    solver: Arc<dyn RootFinder>,
    helpers: RwLock<Vec<Arc<dyn Helper>>>,
    controller: Arc<LazyController>,
    committed: RwLock<Arc<CommittedCurve>>,
    allow_extrapolation: AtomicBool,
    turn_of_year: Option<TurnOfYearEffect>,
    /// Subscribed to the turn-of-year quote; kept alive here.
    adjustment_relay: Option<Arc<dyn Observer>>,
}

impl PiecewiseCurve {
    /// Creates a curve from a configuration.
    pub fn new(
        reference_date: Date,
        helpers: Vec<Arc<dyn Helper>>,
        config: PiecewiseCurveConfig,
    ) -> CurveResult<Self> {
        Self::builder(reference_date)
            .with_helpers(helpers)
            .with_config(config)
            .build()
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder(reference_date: Date) -> PiecewiseCurveBuilder {
        PiecewiseCurveBuilder::new(reference_date)
    }

    fn observer(&self) -> Weak<dyn Observer> {
        let controller: Arc<dyn Observer> = self.controller.clone();
        Arc::downgrade(&controller)
    }

    fn bootstrap(&self) -> CurveResult<()> {
        let reference_date = *self.reference_date.read();
        let helpers = self.helpers.read().clone();
        let inputs = BootstrapInputs {
            reference_date,
            day_count: &self.day_count,
            kind: self.config.kind,
            interpolation: self.interpolation.as_ref(),
            helpers: &helpers,
        };

        let outcome =
            SequentialBootstrapper::new(inputs, self.config.bootstrap, self.solver.as_ref())
                .and_then(|bootstrapper| bootstrapper.run())
                .map_err(|e| {
                    tracing::warn!(error = %e, "bootstrap failed");
                    e
                })?;

        tracing::debug!(
            %reference_date,
            nodes = outcome.nodes.len(),
            passes = outcome.passes,
            "curve committed"
        );
        *self.committed.write() = Arc::new(CommittedCurve::from_outcome(reference_date, outcome));
        Ok(())
    }

    /// Brings the nodes up to date.
    ///
    /// # Errors
    ///
    /// Returns the bootstrap failure, memoized until an input changes.
    pub fn ensure_up_to_date(&self) -> CurveResult<()> {
        self.controller.ensure_up_to_date(|| self.bootstrap())
    }

    fn current(&self) -> CurveResult<Arc<CommittedCurve>> {
        self.ensure_up_to_date()?;
        Ok(Arc::clone(&self.committed.read()))
    }

    /// The committed snapshot after a solve attempt. Never fails.
    fn inspect(&self) -> Arc<CommittedCurve> {
        if let Err(e) = self.ensure_up_to_date() {
            tracing::debug!(error = %e, "serving last committed nodes");
        }
        Arc::clone(&self.committed.read())
    }

    fn adjust(&self, t: f64, value: f64, committed: &CommittedCurve) -> CurveResult<f64> {
        match &self.turn_of_year {
            Some(effect) => {
                effect.apply(t, value, committed.reference_date, self.day_count.as_ref())
            }
            None => Ok(value),
        }
    }

    /// Returns true if the committed nodes reflect the current inputs.
    ///
    /// A pure state read: false while dirty and unsolved or after a failed
    /// solve, true once a query has solved successfully. Never solves.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.controller.is_up_to_date()
    }

    // ---------------------------------------------------------------------
    // Inspectors
    // ---------------------------------------------------------------------

    /// Snapshot of the last successful solve, without recalculating.
    #[must_use]
    pub fn committed(&self) -> Arc<CommittedCurve> {
        Arc::clone(&self.committed.read())
    }

    /// Solved nodes, anchor first.
    pub fn nodes(&self) -> Vec<Node> {
        self.inspect().nodes.nodes()
    }

    /// Node times, anchor first.
    pub fn times(&self) -> Vec<f64> {
        self.inspect().nodes.times().to_vec()
    }

    /// Node dates, reference date first.
    pub fn dates(&self) -> Vec<Date> {
        self.inspect().dates()
    }

    /// Node values, anchor first.
    pub fn data(&self) -> Vec<f64> {
        self.inspect().nodes.values().to_vec()
    }

    /// Time of the last pillar.
    pub fn max_time(&self) -> f64 {
        self.inspect().nodes.max_time()
    }

    /// Date of the last pillar.
    pub fn max_date(&self) -> Date {
        self.inspect().max_date()
    }

    /// Repricing report of the last successful solve.
    pub fn last_report(&self) -> Option<RepricingReport> {
        self.inspect().report.clone()
    }

    /// Number of solves attempted so far.
    #[must_use]
    pub fn recalculations(&self) -> u64 {
        self.controller.solves()
    }

    /// The helpers, ordered by pillar date.
    #[must_use]
    pub fn helpers(&self) -> Vec<Arc<dyn Helper>> {
        self.helpers.read().clone()
    }

    /// Curve configuration.
    #[must_use]
    pub fn config(&self) -> &PiecewiseCurveConfig {
        &self.config
    }

    /// The turn-of-year adjustment, if any.
    #[must_use]
    pub fn turn_of_year(&self) -> Option<&TurnOfYearEffect> {
        self.turn_of_year.as_ref()
    }

    // ---------------------------------------------------------------------
    // Inputs
    // ---------------------------------------------------------------------

    /// Moves the curve to a new reference date.
    pub fn set_reference_date(&self, reference_date: Date) {
        {
            let mut current = self.reference_date.write();
            if *current == reference_date {
                return;
            }
            *current = reference_date;
        }
        tracing::debug!(%reference_date, "reference date changed");
        self.controller.mark_dirty();
    }

    /// Replaces the helper set.
    pub fn replace_helpers(&self, helpers: Vec<Arc<dyn Helper>>) {
        let observer = self.observer();
        {
            let mut current = self.helpers.write();
            for helper in current.iter() {
                helper.unregister_observer(&observer);
            }
            *current = sorted(helpers);
            for helper in current.iter() {
                helper.register_observer(observer.clone());
            }
        }
        self.controller.mark_dirty();
    }

    /// Allows queries beyond the last pillar.
    pub fn enable_extrapolation(&self) {
        self.allow_extrapolation.store(true, Ordering::Release);
    }

    /// Rejects queries beyond the last pillar.
    pub fn disable_extrapolation(&self) {
        self.allow_extrapolation.store(false, Ordering::Release);
    }

    /// Returns true if queries beyond the last pillar are answered.
    #[must_use]
    pub fn allows_extrapolation(&self) -> bool {
        self.allow_extrapolation.load(Ordering::Acquire)
    }

    // ---------------------------------------------------------------------
    // Recalculation control
    // ---------------------------------------------------------------------

    /// Solves now, even if nothing changed.
    pub fn recalculate(&self) -> CurveResult<()> {
        self.controller.recalculate(|| self.bootstrap())
    }

    /// Stops quote changes from triggering recalculation.
    pub fn freeze(&self) {
        self.controller.freeze();
    }

    /// Resumes recalculation on quote changes.
    pub fn unfreeze(&self) {
        self.controller.unfreeze();
    }

    /// Returns true while frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.controller.is_frozen()
    }

    /// Subscribes a downstream observer to changes of this curve's inputs.
    pub fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.controller.register_observer(observer);
    }

    /// Cancels a downstream subscription.
    pub fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.controller.unregister_observer(observer);
    }
}

impl CurveView for PiecewiseCurve {
    fn reference_date(&self) -> Date {
        *self.reference_date.read()
    }

    fn day_count(&self) -> &dyn DayCount {
        self.day_count.as_ref()
    }

    fn kind(&self) -> CurveKind {
        self.config.kind
    }

    /// Node-space value at `t`; turn-of-year applied to probability-like kinds.
    fn value_at(&self, t: f64) -> CurveResult<f64> {
        let committed = self.current()?;
        let value = committed
            .require_curve()?
            .value_with(t, self.allows_extrapolation())?;
        if self.config.kind.is_probability_like() {
            self.adjust(t, value, &committed)
        } else {
            Ok(value)
        }
    }

    fn discount(&self, t: f64) -> CurveResult<f64> {
        let committed = self.current()?;
        let value = committed
            .require_curve()?
            .discount_with(t, self.allows_extrapolation())?;
        self.adjust(t, value, &committed)
    }
}

impl Drop for PiecewiseCurve {
    fn drop(&mut self) {
        let observer = self.observer();
        for helper in self.helpers.get_mut().iter() {
            helper.unregister_observer(&observer);
        }
        if let (Some(effect), Some(relay)) = (&self.turn_of_year, &self.adjustment_relay) {
            effect.quote().unregister_observer(&Arc::downgrade(relay));
        }
    }
}

impl fmt::Debug for PiecewiseCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiecewiseCurve")
            .field("reference_date", &*self.reference_date.read())
            .field("kind", &self.config.kind)
            .field("interpolation", &self.interpolation)
            .field("helpers", &self.helpers.read().len())
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

fn sorted(mut helpers: Vec<Arc<dyn Helper>>) -> Vec<Arc<dyn Helper>> {
    helpers.sort_by_key(|h| h.pillar_date());
    helpers
}

/// Builder for [`PiecewiseCurve`].
#[derive(Debug)]
pub struct PiecewiseCurveBuilder {
    reference_date: Date,
    helpers: Vec<Arc<dyn Helper>>,
    config: PiecewiseCurveConfig,
    interpolation: Option<Arc<dyn Interpolation>>,
    solver: Option<Arc<dyn RootFinder>>,
    turn_of_year: Option<TurnOfYearEffect>,
}

impl PiecewiseCurveBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new(reference_date: Date) -> Self {
        Self {
            reference_date,
            helpers: Vec::new(),
            config: PiecewiseCurveConfig::default(),
            interpolation: None,
            solver: None,
            turn_of_year: None,
        }
    }

    /// Adds one helper.
    #[must_use]
    pub fn add_helper(mut self, helper: Arc<dyn Helper>) -> Self {
        self.helpers.push(helper);
        self
    }

    /// Adds several helpers.
    #[must_use]
    pub fn with_helpers(mut self, helpers: impl IntoIterator<Item = Arc<dyn Helper>>) -> Self {
        self.helpers.extend(helpers);
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: PiecewiseCurveConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets what the nodes hold.
    #[must_use]
    pub fn with_kind(mut self, kind: CurveKind) -> Self {
        self.config.kind = kind;
        self
    }

    /// Selects a built-in interpolation.
    #[must_use]
    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.config.interpolation = method;
        self.interpolation = None;
        self
    }

    /// Uses a custom interpolation scheme instead of the configured method.
    #[must_use]
    pub fn with_interpolation_scheme(mut self, scheme: Arc<dyn Interpolation>) -> Self {
        self.interpolation = Some(scheme);
        self
    }

    /// Sets the day count mapping dates to times.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.config.day_count = day_count;
        self
    }

    /// Sets the bootstrap settings.
    #[must_use]
    pub fn with_bootstrap_config(mut self, bootstrap: BootstrapConfig) -> Self {
        self.config.bootstrap = bootstrap;
        self
    }

    /// Sets the default extrapolation policy.
    #[must_use]
    pub fn with_extrapolation(mut self, allow: bool) -> Self {
        self.config.allow_extrapolation = allow;
        self
    }

    /// Uses a custom root finder instead of [`Brent`].
    #[must_use]
    pub fn with_solver(mut self, solver: Arc<dyn RootFinder>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Applies a turn-of-year jump to query results.
    #[must_use]
    pub fn with_turn_of_year(mut self, effect: TurnOfYearEffect) -> Self {
        self.turn_of_year = Some(effect);
        self
    }

    /// Builds the curve and registers it with its helpers. Does not solve.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidConfig` if the configuration is invalid,
    /// including a built-in interpolation the curve kind cannot use or a
    /// scheme needing more than [`MIN_TRIAL_NODES`] nodes.
    pub fn build(self) -> CurveResult<PiecewiseCurve> {
        match self.interpolation {
            Some(_) => self.config.bootstrap.validate()?,
            None => self.config.validate()?,
        }

        let interpolation = self
            .interpolation
            .unwrap_or_else(|| Arc::new(self.config.interpolation) as Arc<dyn Interpolation>);
        if interpolation.min_points() > MIN_TRIAL_NODES {
            return Err(CurveError::invalid_config(format!(
                "{interpolation:?} interpolation needs {} nodes",
                interpolation.min_points()
            )));
        }
        let solver = self
            .solver
            .unwrap_or_else(|| Arc::new(Brent::default()) as Arc<dyn RootFinder>);
        let day_count: Arc<dyn DayCount> = Arc::from(self.config.day_count.to_day_count());
        let controller = Arc::new(LazyController::new());

        let curve = PiecewiseCurve {
            reference_date: RwLock::new(self.reference_date),
            committed: RwLock::new(Arc::new(CommittedCurve::anchor(
                self.reference_date,
                self.config.kind,
            ))),
            config: self.config,
            day_count,
            interpolation,
            solver,
            helpers: RwLock::new(sorted(self.helpers)),
            adjustment_relay: self.turn_of_year.as_ref().map(|_| Relay::new(&controller)),
            controller,
            allow_extrapolation: AtomicBool::new(self.config.allow_extrapolation),
            turn_of_year: self.turn_of_year,
        };

        // Factor changes alter query results but not the nodes
        if let (Some(effect), Some(relay)) = (&curve.turn_of_year, &curve.adjustment_relay) {
            effect.quote().register_observer(Arc::downgrade(relay));
        }

        let observer = curve.observer();
        for helper in curve.helpers.read().iter() {
            helper.register_observer(observer.clone());
        }
        tracing::debug!(
            reference_date = %curve.reference_date(),
            kind = %curve.config.kind,
            helpers = curve.helpers.read().len(),
            "curve created"
        );
        Ok(curve)
    }
}
