//! Integration tests: bootstrap outcomes and failure handling.
//!
//! Every curve here is referenced at 1 January 2025 with ACT/365F, so
//! 1 January 2026 and 1 January 2027 sit at exactly t = 1 and t = 2.

use std::sync::Arc;

use approx::assert_relative_eq;
use pillar_core::daycounts::DayCountConvention;
use pillar_core::Date;
use pillar_curves::prelude::*;
use pillar_math::interpolation::InterpolationMethod;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn reference() -> Date {
    date(2025, 1, 1)
}

fn zero(rate: f64, pillar: Date) -> Arc<dyn Helper> {
    Arc::new(ZeroRateHelper::new(Arc::new(SimpleQuote::new(rate)), pillar))
}

fn curve_with(helpers: Vec<Arc<dyn Helper>>, interpolation: InterpolationMethod) -> PiecewiseCurve {
    PiecewiseCurve::builder(reference())
        .with_helpers(helpers)
        .with_day_count(DayCountConvention::Act365Fixed)
        .with_interpolation(interpolation)
        .build()
        .unwrap()
}

/// Quotes the raw curve value at a read date.
#[derive(Debug)]
struct LookaheadHelper {
    quote: Arc<dyn Quote>,
    pillar: Date,
    read_at: Date,
    /// Whether the read date is reported as the latest relevant date.
    declared: bool,
}

impl LookaheadHelper {
    fn new(value: f64, pillar: Date, read_at: Date, declared: bool) -> Arc<dyn Helper> {
        Arc::new(Self {
            quote: Arc::new(SimpleQuote::new(value)),
            pillar,
            read_at,
            declared,
        })
    }
}

impl Helper for LookaheadHelper {
    fn pillar_date(&self) -> Date {
        self.pillar
    }

    fn latest_relevant_date(&self) -> Date {
        if self.declared {
            self.read_at.max(self.pillar)
        } else {
            self.pillar
        }
    }

    fn quote(&self) -> &dyn Quote {
        self.quote.as_ref()
    }

    fn implied_quote(&self, curve: &dyn CurveView) -> CurveResult<f64> {
        curve.value_at(curve.time_from_reference(self.read_at))
    }

    fn description(&self) -> String {
        format!("Lookahead {} at {}", self.pillar, self.read_at)
    }
}

/// Implies the same value whatever the curve.
#[derive(Debug)]
struct ConstantHelper {
    quote: Arc<dyn Quote>,
    pillar: Date,
    implied: f64,
}

impl Helper for ConstantHelper {
    fn pillar_date(&self) -> Date {
        self.pillar
    }

    fn quote(&self) -> &dyn Quote {
        self.quote.as_ref()
    }

    fn implied_quote(&self, _curve: &dyn CurveView) -> CurveResult<f64> {
        Ok(self.implied)
    }

    fn description(&self) -> String {
        format!("Constant {}", self.implied)
    }
}

// =============================================================================
// SEQUENTIAL SOLVE
// =============================================================================

#[test]
fn test_single_pillar_zero_rate() {
    let curve = curve_with(
        vec![zero(-(0.95f64).ln(), date(2026, 1, 1))],
        InterpolationMethod::LogLinear,
    );

    let nodes = curve.nodes();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0], Node { time: 0.0, value: 1.0 });
    assert_eq!(nodes[1].time, 1.0);
    assert_relative_eq!(nodes[1].value, 0.95, epsilon = 1e-12);
    assert_eq!(curve.max_time(), 1.0);
}

#[test]
fn test_second_pillar_uses_committed_first_node() {
    let rate = 1.0 / 0.95 - 1.0;
    let deposit = DepositHelper::with_day_count(
        Arc::new(SimpleQuote::new(rate)),
        reference(),
        date(2026, 1, 1),
        DayCountConvention::Act365Fixed,
    )
    .unwrap();
    let fra = DepositHelper::with_day_count(
        Arc::new(SimpleQuote::new(rate)),
        date(2026, 1, 1),
        date(2027, 1, 1),
        DayCountConvention::Act365Fixed,
    )
    .unwrap();

    let curve = curve_with(
        vec![Arc::new(fra), Arc::new(deposit)],
        InterpolationMethod::LogLinear,
    );

    let data = curve.data();
    assert_relative_eq!(data[1], 0.95, epsilon = 1e-12);
    assert_relative_eq!(data[2], 0.9025, epsilon = 1e-12);
    assert_eq!(curve.dates(), vec![reference(), date(2026, 1, 1), date(2027, 1, 1)]);
}

#[test]
fn test_swap_curve_reprices_every_helper() {
    let spot = reference();
    let helpers: Vec<Arc<dyn Helper>> = vec![
        Arc::new(DepositHelper::new(Arc::new(SimpleQuote::new(0.0450)), spot, date(2025, 4, 1)).unwrap()),
        Arc::new(DepositHelper::new(Arc::new(SimpleQuote::new(0.0440)), spot, date(2025, 7, 1)).unwrap()),
        Arc::new(SwapHelper::new(Arc::new(SimpleQuote::new(0.0410)), spot, date(2027, 1, 1), 6).unwrap()),
        Arc::new(SwapHelper::new(Arc::new(SimpleQuote::new(0.0395)), spot, date(2030, 1, 1), 6).unwrap()),
        Arc::new(SwapHelper::new(Arc::new(SimpleQuote::new(0.0405)), spot, date(2035, 1, 1), 6).unwrap()),
    ];

    for method in [InterpolationMethod::LogLinear, InterpolationMethod::Linear] {
        let curve = curve_with(helpers.clone(), method);
        let report = curve.last_report().unwrap();
        assert!(report.all_passed(), "{method}: {report}");
        assert_eq!(report.checks().len(), 5);

        for helper in &helpers {
            let implied = helper.implied_quote(&curve).unwrap();
            assert_relative_eq!(implied, helper.market_quote().unwrap(), epsilon = 1e-10);
        }
    }
}

#[test]
fn test_bracket_widening_reaches_distant_root() {
    let curve = curve_with(vec![zero(1.6, date(2026, 1, 1))], InterpolationMethod::LogLinear);
    assert_relative_eq!(curve.data()[1], (-1.6f64).exp(), epsilon = 1e-12);
}

#[test]
fn test_extrapolation_is_relaxed_for_the_solve_only() {
    let helper = LookaheadHelper::new(0.97, date(2026, 1, 1), date(2026, 7, 2), false);
    let curve = curve_with(vec![helper], InterpolationMethod::LogLinear);

    assert!(curve.ensure_up_to_date().is_ok());
    assert!(matches!(
        curve.discount(1.4),
        Err(CurveError::ExtrapolationNotAllowed { .. })
    ));
    curve.enable_extrapolation();
    assert_relative_eq!(
        curve.discount(curve.time_from_reference(date(2026, 7, 2))).unwrap(),
        0.97,
        epsilon = 1e-12
    );
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn test_pillar_without_root_fails_whole_solve() {
    let helpers: Vec<Arc<dyn Helper>> = vec![
        zero(0.03, date(2026, 1, 1)),
        Arc::new(ConstantHelper {
            quote: Arc::new(SimpleQuote::new(0.1)),
            pillar: date(2027, 1, 1),
            implied: 0.5,
        }),
    ];
    let curve = curve_with(helpers, InterpolationMethod::LogLinear);

    match curve.discount(0.5) {
        Err(CurveError::PillarFailure {
            index,
            last_residual,
        }) => {
            assert_eq!(index, 2);
            assert_relative_eq!(last_residual, 0.4, epsilon = 1e-12);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(!curve.is_valid());
    assert_eq!(curve.nodes(), vec![Node { time: 0.0, value: 1.0 }]);
    assert_eq!(curve.recalculations(), 1);
}

#[test]
fn test_failed_solve_keeps_previous_nodes() {
    let quote = Arc::new(SimpleQuote::new(0.03));
    let helpers: Vec<Arc<dyn Helper>> = vec![
        zero(0.03, date(2026, 1, 1)),
        Arc::new(ZeroRateHelper::new(quote.clone(), date(2027, 1, 1))),
    ];
    let curve = curve_with(helpers, InterpolationMethod::LogLinear);
    let before = curve.nodes();

    // A discount factor of e^2 lies outside the widest search interval
    quote.set_value(-1.0);
    let error = curve.discount(1.5).unwrap_err();
    assert!(matches!(error, CurveError::PillarFailure { index: 2, .. }));
    assert_eq!(curve.discount(0.5).unwrap_err(), error);
    assert_eq!(curve.nodes(), before);
    assert_eq!(curve.committed().node_store().nodes(), before);

    quote.set_value(0.035);
    assert_relative_eq!(curve.zero_rate(2.0).unwrap(), 0.035, epsilon = 1e-12);
}

#[test]
fn test_duplicate_pillars_rejected_before_solving() {
    let curve = curve_with(vec![zero(0.03, date(2026, 1, 1))], InterpolationMethod::LogLinear);
    let before = curve.nodes();

    curve.replace_helpers(vec![
        zero(0.03, date(2026, 1, 1)),
        zero(0.031, date(2026, 1, 1)),
    ]);
    assert_eq!(
        curve.ensure_up_to_date().unwrap_err(),
        CurveError::DuplicatePillar { time: 1.0 }
    );
    assert_eq!(curve.nodes(), before);
}

#[test]
fn test_empty_curve() {
    let curve = curve_with(Vec::new(), InterpolationMethod::LogLinear);
    assert_eq!(curve.discount(1.0).unwrap_err(), CurveError::EmptyHelperSet);
    assert_eq!(curve.max_date(), reference());
}

// =============================================================================
// GLOBAL CHECK
// =============================================================================

#[test]
fn test_global_retry_fixes_order_sensitive_set() {
    let read_at = date(2026, 7, 2);
    let helpers = vec![
        LookaheadHelper::new(0.94, date(2026, 1, 1), read_at, true),
        LookaheadHelper::new(0.90, date(2027, 1, 1), date(2027, 1, 1), true),
    ];
    let curve = curve_with(helpers, InterpolationMethod::Linear);

    let tp = 547.0 / 365.0;
    let expected = (0.94 - 0.90 * (tp - 1.0)) / (2.0 - tp);
    let data = curve.data();
    assert_relative_eq!(data[1], expected, epsilon = 1e-10);
    assert_relative_eq!(data[2], 0.90, epsilon = 1e-12);
    assert_eq!(curve.committed().passes(), 2);
    assert!(curve.last_report().unwrap().all_passed());
}

#[test]
fn test_global_check_failure_without_retry() {
    let read_at = date(2026, 7, 2);
    let helpers = vec![
        LookaheadHelper::new(0.94, date(2026, 1, 1), read_at, true),
        LookaheadHelper::new(0.90, date(2027, 1, 1), date(2027, 1, 1), true),
    ];
    let curve = PiecewiseCurve::builder(reference())
        .with_helpers(helpers)
        .with_day_count(DayCountConvention::Act365Fixed)
        .with_interpolation(InterpolationMethod::Linear)
        .with_bootstrap_config(BootstrapConfig::default().with_global_retry(false))
        .build()
        .unwrap();

    assert!(matches!(
        curve.ensure_up_to_date(),
        Err(CurveError::GlobalCheckFailure {
            worst_helper_index: 1,
            ..
        })
    ));
}

#[test]
fn test_global_check_failure_reports_original_residual() {
    let helpers = vec![
        LookaheadHelper::new(0.90, date(2026, 1, 1), date(2027, 1, 1), true),
        LookaheadHelper::new(0.85, date(2027, 1, 1), date(2027, 1, 1), true),
    ];
    let curve = curve_with(helpers, InterpolationMethod::Linear);

    match curve.ensure_up_to_date() {
        Err(CurveError::GlobalCheckFailure {
            worst_helper_index,
            residual,
        }) => {
            assert_eq!(worst_helper_index, 1);
            assert_relative_eq!(residual, -0.05, epsilon = 1e-10);
        }
        other => panic!("unexpected {other:?}"),
    }
}
