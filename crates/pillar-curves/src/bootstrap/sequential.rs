//! Sequential pillar-by-pillar bootstrap.

use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::time::Instant;

use pillar_core::Date;
use pillar_math::solvers::RootFinder;
use pillar_math::MathError;

use super::{BootstrapInputs, BootstrapOutcome, MIN_PILLAR_SPACING, MIN_TRIAL_NODES};
use crate::config::BootstrapConfig;
use crate::error::{CurveError, CurveResult};
use crate::helpers::Helper;
use crate::nodes::{NodeCurve, NodeStore};
use crate::repricing::{RepricingCheck, RepricingReport};

/// A helper with its pillar resolved against the reference date.
#[derive(Debug)]
struct Pillar {
    helper: Arc<dyn Helper>,
    date: Date,
    time: f64,
    latest_time: f64,
}

/// Sequential bootstrapper.
///
/// Construction validates the pillars; [`run`](Self::run) solves them. The
/// bootstrapper borrows everything and owns no curve state, so a failed run
/// has nothing to roll back.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use pillar_core::prelude::*;
/// use pillar_math::prelude::*;
/// use pillar_curves::prelude::*;
/// use pillar_curves::bootstrap::{BootstrapInputs, SequentialBootstrapper};
///
/// let reference = Date::from_ymd(2025, 1, 1).unwrap();
/// let helper: Arc<dyn Helper> = Arc::new(ZeroRateHelper::new(
///     Arc::new(SimpleQuote::new(0.05)),
///     Date::from_ymd(2026, 1, 1).unwrap(),
/// ));
/// let day_count: Arc<dyn DayCount> = Arc::new(Act365Fixed);
/// let helpers = [helper];
///
/// let inputs = BootstrapInputs {
///     reference_date: reference,
///     day_count: &day_count,
///     kind: CurveKind::Discount,
///     interpolation: &InterpolationMethod::LogLinear,
///     helpers: &helpers,
/// };
/// let solver = Brent::default();
/// let outcome = SequentialBootstrapper::new(inputs, BootstrapConfig::default(), &solver)
///     .unwrap()
///     .run()
///     .unwrap();
///
/// assert!((outcome.nodes.values()[1] - (-0.05f64).exp()).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct SequentialBootstrapper<'a> {
    inputs: BootstrapInputs<'a>,
    config: BootstrapConfig,
    solver: &'a dyn RootFinder,
    pillars: Vec<Pillar>,
    /// Node times, anchor included.
    times: Vec<f64>,
    evaluations: Cell<u32>,
}

impl<'a> SequentialBootstrapper<'a> {
    /// Resolves and validates the pillars.
    ///
    /// Helpers are ordered by pillar time; ties keep their input order and
    /// are then rejected.
    ///
    /// # Errors
    ///
    /// - `CurveError::InvalidConfig` if the configuration is out of range or the
    ///   interpolation needs more than [`MIN_TRIAL_NODES`] nodes
    /// - `CurveError::EmptyHelperSet` if there are no helpers
    /// - `CurveError::InvalidPillar` for a pillar before the reference date
    /// - `CurveError::DuplicatePillar` for pillars closer than [`MIN_PILLAR_SPACING`],
    ///   the anchor at t = 0 included
    pub fn new(
        inputs: BootstrapInputs<'a>,
        config: BootstrapConfig,
        solver: &'a dyn RootFinder,
    ) -> CurveResult<Self> {
        config.validate()?;
        let required = inputs.interpolation.min_points();
        if required > MIN_TRIAL_NODES {
            return Err(CurveError::invalid_config(format!(
                "{:?} interpolation needs {required} nodes, trial curves start from {MIN_TRIAL_NODES}",
                inputs.interpolation
            )));
        }
        if inputs.helpers.is_empty() {
            return Err(CurveError::EmptyHelperSet);
        }

        let dc = inputs.day_count.as_ref();
        let mut pillars: Vec<Pillar> = inputs
            .helpers
            .iter()
            .map(|helper| {
                let date = helper.pillar_date();
                let latest = helper.latest_relevant_date().max(date);
                Pillar {
                    helper: Arc::clone(helper),
                    date,
                    time: dc.year_fraction_f64(inputs.reference_date, date),
                    latest_time: dc.year_fraction_f64(inputs.reference_date, latest),
                }
            })
            .collect();
        pillars.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut times = Vec::with_capacity(pillars.len() + 1);
        times.push(0.0);
        for (k, pillar) in pillars.iter().enumerate() {
            if !pillar.time.is_finite() || pillar.time < 0.0 {
                return Err(CurveError::InvalidPillar {
                    index: k + 1,
                    time: pillar.time,
                });
            }
            if pillar.time - times[k] <= MIN_PILLAR_SPACING {
                return Err(CurveError::DuplicatePillar { time: pillar.time });
            }
            times.push(pillar.time);
        }

        Ok(Self {
            inputs,
            config,
            solver,
            pillars,
            times,
            evaluations: Cell::new(0),
        })
    }

    /// Node times, anchor included.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Pillar dates in solve order.
    #[must_use]
    pub fn pillar_dates(&self) -> Vec<Date> {
        self.pillars.iter().map(|p| p.date).collect()
    }

    /// Solves every pillar and runs the global check.
    ///
    /// # Errors
    ///
    /// - `CurveError::PillarFailure` if a pillar has no root, even after widening
    /// - `CurveError::GlobalCheckFailure` if the finished curve misses a quote
    ///   and the seeded retry does not fix it
    /// - `CurveError::Interpolation` if the scheme rejects the trial nodes
    /// - `CurveError::Helper` if a helper cannot be evaluated
    /// - `CurveError::RootFind` for any other solver failure
    pub fn run(&self) -> CurveResult<BootstrapOutcome> {
        let start = Instant::now();
        self.evaluations.set(0);
        tracing::debug!(
            kind = %self.inputs.kind,
            interpolation = ?self.inputs.interpolation,
            pillars = self.pillars.len(),
            "bootstrap started"
        );

        let mut first = self.run_pass(None)?;
        let mut passes = 1;
        if self.inputs.interpolation.is_global() {
            // Early nodes were solved before later ones existed
            tracing::debug!("global interpolation, running seeded pass");
            first = self.run_pass(Some(&first))?;
            passes += 1;
        }

        let (values, curve, report) = if self.config.global_check {
            let (curve, report) = self.global_check(&first)?;
            match report.failure() {
                None => (first, curve, Some(report)),
                Some(failure) if !self.config.global_retry => {
                    tracing::warn!(error = %failure, "global repricing check failed");
                    return Err(failure);
                }
                Some(failure) => {
                    tracing::warn!(
                        error = %failure,
                        "global repricing check failed, retrying with seeded pass"
                    );
                    passes += 1;
                    match self.retry(&first) {
                        Ok((values, curve, report)) if report.all_passed() => {
                            (values, curve, Some(report))
                        }
                        Ok((_, _, report)) => {
                            tracing::warn!(
                                max_error = report.max_error(),
                                "seeded retry still misses quotes"
                            );
                            return Err(failure);
                        }
                        Err(retry_error) => {
                            tracing::warn!(error = %retry_error, "seeded retry failed");
                            return Err(failure);
                        }
                    }
                }
            }
        } else {
            let curve = self.curve_over(self.pillars.len(), &self.times, &first)?;
            (first, curve, None)
        };

        let nodes = NodeStore::from_solution(self.times.clone(), values)?;
        let duration = start.elapsed();
        tracing::debug!(
            passes,
            evaluations = self.evaluations.get(),
            elapsed_us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX),
            "bootstrap finished"
        );

        Ok(BootstrapOutcome {
            nodes,
            pillar_dates: self.pillar_dates(),
            curve,
            report,
            passes,
            evaluations: self.evaluations.get(),
            duration,
        })
    }

    fn retry(&self, seed: &[f64]) -> CurveResult<(Vec<f64>, NodeCurve, RepricingReport)> {
        let values = self.run_pass(Some(seed))?;
        let (curve, report) = self.global_check(&values)?;
        Ok((values, curve, report))
    }

    /// One full pass. With a seed, nodes not yet solved keep their seeded
    /// values in the trial curve and seed the initial guesses.
    fn run_pass(&self, seed: Option<&[f64]>) -> CurveResult<Vec<f64>> {
        let mut values = Vec::with_capacity(self.times.len());
        values.push(self.inputs.kind.anchor_value());

        for index in 1..self.times.len() {
            let tail = seed.map_or(&[][..], |s| &s[index + 1..]);
            let guess = match seed {
                Some(s) => s[index],
                None => self
                    .inputs
                    .kind
                    .initial_guess(index, values[index - 1], self.times[index]),
            };
            let value = self.solve_pillar(index, &values, tail, guess)?;
            tracing::debug!(
                pillar = index,
                time = self.times[index],
                value,
                "pillar solved"
            );
            values.push(value);
        }
        Ok(values)
    }

    /// Solves node `index` given the committed nodes before it.
    fn solve_pillar(
        &self,
        index: usize,
        committed: &[f64],
        tail: &[f64],
        guess: f64,
    ) -> CurveResult<f64> {
        let kind = self.inputs.kind;
        let pillar = &self.pillars[index - 1];
        let previous = committed[index - 1];
        let dt = self.times[index] - self.times[index - 1];
        let (min, max) = kind.domain();
        let solver_config = self.config.solver_config();

        let mut bracket = kind.search_bracket(previous, dt);
        let mut allow_extrapolation = pillar.latest_time > self.times[index];
        let mut widened = false;

        loop {
            let captured: RefCell<Option<CurveError>> = RefCell::new(None);
            let objective = |x: f64| match self.objective(
                pillar,
                index,
                committed,
                tail,
                x,
                allow_extrapolation,
            ) {
                Ok(y) => y,
                Err(e) => {
                    let mut slot = captured.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            };
            let result = self
                .solver
                .find_root(&objective, guess, bracket, &solver_config);
            let helper_error = captured.borrow_mut().take();

            if let Some(error) = helper_error {
                match error {
                    CurveError::ExtrapolationNotAllowed { .. } if !allow_extrapolation => {
                        tracing::warn!(
                            pillar = index,
                            helper = %pillar.helper.description(),
                            "helper reads past the last node, extrapolating for this pillar"
                        );
                        allow_extrapolation = true;
                        continue;
                    }
                    e @ CurveError::Interpolation { .. } => return Err(e),
                    other => return Err(CurveError::helper(index, other)),
                }
            }

            match result {
                Ok(solution) => return Ok(solution.root),
                Err(e) if e.is_search_failure() && !widened => {
                    let wider = bracket
                        .widen(self.config.bracket_widening)
                        .restrict(min, max);
                    tracing::warn!(
                        pillar = index,
                        bracket = %bracket,
                        widened = %wider,
                        error = %e,
                        "pillar did not converge, widening bracket"
                    );
                    bracket = wider;
                    widened = true;
                }
                Err(e) if e.is_search_failure() => {
                    let last_residual = last_residual(&e);
                    tracing::warn!(pillar = index, last_residual, "pillar failed");
                    return Err(CurveError::PillarFailure {
                        index,
                        last_residual,
                    });
                }
                Err(source) => return Err(CurveError::RootFind { index, source }),
            }
        }
    }

    /// `implied - market` for the helper at `index` with node value `x`.
    fn objective(
        &self,
        pillar: &Pillar,
        index: usize,
        committed: &[f64],
        tail: &[f64],
        x: f64,
        allow_extrapolation: bool,
    ) -> CurveResult<f64> {
        self.evaluations.set(self.evaluations.get() + 1);
        let end = index + 1 + tail.len();
        let mut values = Vec::with_capacity(end);
        values.extend_from_slice(&committed[..index]);
        values.push(x);
        values.extend_from_slice(tail);

        let curve = self
            .curve_over(index, &self.times[..end], &values)?
            .extrapolating(allow_extrapolation);
        pillar.helper.quote_error(&curve)
    }

    /// Interpolates `values` over `times`; `index` names the pillar being built.
    fn curve_over(&self, index: usize, times: &[f64], values: &[f64]) -> CurveResult<NodeCurve> {
        let interpolator = self
            .inputs
            .interpolation
            .build(times.to_vec(), values.to_vec())
            .map_err(|source| CurveError::Interpolation { index, source })?;
        Ok(NodeCurve::new(
            self.inputs.reference_date,
            Arc::clone(self.inputs.day_count),
            self.inputs.kind,
            interpolator,
        ))
    }

    /// Reprices every helper against the curve over `values`.
    ///
    /// Helpers reading past the last pillar see an extrapolating curve, as
    /// they did while their pillar was solved.
    fn global_check(&self, values: &[f64]) -> CurveResult<(NodeCurve, RepricingReport)> {
        let curve = self.curve_over(self.pillars.len(), &self.times, values)?;
        let max_time = self.times.last().copied().unwrap_or(0.0);
        let accuracy = self.config.accuracy;

        let checks = self
            .pillars
            .iter()
            .enumerate()
            .map(|(k, pillar)| {
                let helper = pillar.helper.as_ref();
                let declared = pillar.latest_time > max_time;
                let check = |allow: bool| {
                    RepricingCheck::evaluate(k + 1, helper, &curve.extrapolating(allow), accuracy)
                };
                match check(declared) {
                    Err(CurveError::ExtrapolationNotAllowed { .. }) if !declared => check(true),
                    other => other,
                }
                .map_err(|e| CurveError::helper(k + 1, e))
            })
            .collect::<CurveResult<Vec<_>>>()?;

        let report = RepricingReport::new(checks);
        tracing::debug!(
            max_error = report.max_error(),
            rms_error = report.rms_error(),
            passed = report.all_passed(),
            "global repricing check"
        );
        Ok((curve, report))
    }
}

fn last_residual(error: &MathError) -> f64 {
    match *error {
        MathError::ConvergenceFailed { residual, .. } => residual,
        MathError::InvalidBracket { fa, fb, .. } => fa.abs().min(fb.abs()),
        _ => f64::NAN,
    }
}
