//! Integration tests: dirty tracking, memoized failures and concurrent queries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use pillar_core::daycounts::DayCountConvention;
use pillar_core::Date;
use pillar_curves::prelude::*;

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

struct Market {
    short: Arc<SimpleQuote>,
    long: Arc<SimpleQuote>,
    curve: PiecewiseCurve,
}

fn market() -> Market {
    let short = Arc::new(SimpleQuote::new(0.03));
    let long = Arc::new(SimpleQuote::new(0.035));
    let helpers: Vec<Arc<dyn Helper>> = vec![
        Arc::new(ZeroRateHelper::new(short.clone(), date(2026, 1, 1))),
        Arc::new(ZeroRateHelper::new(long.clone(), date(2027, 1, 1))),
    ];
    let curve = PiecewiseCurve::builder(date(2025, 1, 1))
        .with_helpers(helpers)
        .with_day_count(DayCountConvention::Act365Fixed)
        .build()
        .unwrap();
    Market { short, long, curve }
}

#[test]
fn test_repeated_queries_solve_once() {
    let m = market();

    let first = m.curve.nodes();
    let df = m.curve.discount(1.5).unwrap();
    let second = m.curve.nodes();

    assert_eq!(first, second);
    assert_eq!(m.curve.discount(1.5).unwrap(), df);
    assert_eq!(m.curve.recalculations(), 1);
}

#[test]
fn test_quote_change_marks_dirty() {
    let m = market();
    assert_relative_eq!(m.curve.zero_rate(2.0).unwrap(), 0.035, epsilon = 1e-12);

    m.long.set_value(0.04);
    assert_relative_eq!(m.curve.zero_rate(2.0).unwrap(), 0.04, epsilon = 1e-12);
    assert_relative_eq!(m.curve.data()[2], (-0.08f64).exp(), epsilon = 1e-12);
    assert_eq!(m.curve.recalculations(), 2);

    // Same value: no notification, no solve
    m.long.set_value(0.04);
    m.curve.discount(1.0).unwrap();
    assert_eq!(m.curve.recalculations(), 2);
}

#[test]
fn test_failure_memoized_until_input_changes() {
    let m = market();
    m.curve.ensure_up_to_date().unwrap();

    m.short.reset();
    let error = m.curve.discount(0.5).unwrap_err();
    match &error {
        CurveError::Helper { index, source } => {
            assert_eq!(*index, 1);
            assert!(matches!(**source, CurveError::InvalidQuote { .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(m.curve.zero_rate(1.0).unwrap_err(), error);
    assert!(!m.curve.is_valid());
    assert_eq!(m.curve.recalculations(), 2);

    // Inspectors keep serving the last good nodes
    assert_relative_eq!(m.curve.data()[1], (-0.03f64).exp(), epsilon = 1e-12);

    m.short.set_value(0.025);
    assert!(!m.curve.is_valid());
    assert_relative_eq!(m.curve.zero_rate(1.0).unwrap(), 0.025, epsilon = 1e-12);
    assert!(m.curve.is_valid());
    assert_eq!(m.curve.recalculations(), 3);
}

#[test]
fn test_validity_flips_across_query_without_solving() {
    let m = market();
    assert!(!m.curve.is_valid());
    assert_eq!(m.curve.recalculations(), 0);

    m.curve.discount(1.0).unwrap();
    assert!(m.curve.is_valid());
    let before = m.curve.data()[1];

    m.short.set_value(0.032);
    assert!(!m.curve.is_valid());
    assert!(!m.curve.is_valid());
    assert_eq!(m.curve.recalculations(), 1);

    m.curve.zero_rate(1.0).unwrap();
    assert!(m.curve.is_valid());
    assert_eq!(m.curve.recalculations(), 2);
    assert!(m.curve.data()[1] < before);
}

#[test]
fn test_recalculate_forces_solve() {
    let m = market();
    m.curve.ensure_up_to_date().unwrap();
    m.curve.recalculate().unwrap();
    assert_eq!(m.curve.recalculations(), 2);
}

#[test]
fn test_frozen_curve_ignores_quotes_until_unfrozen() {
    let m = market();
    m.curve.ensure_up_to_date().unwrap();

    m.curve.freeze();
    m.short.set_value(0.05);
    assert_relative_eq!(m.curve.zero_rate(1.0).unwrap(), 0.03, epsilon = 1e-12);
    assert_eq!(m.curve.recalculations(), 1);

    m.curve.unfreeze();
    assert_relative_eq!(m.curve.zero_rate(1.0).unwrap(), 0.05, epsilon = 1e-12);
    assert_eq!(m.curve.recalculations(), 2);
}

#[test]
fn test_downstream_observers_notified() {
    struct Counter(AtomicUsize);
    impl Observer for Counter {
        fn update(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let m = market();
    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    let observer: Arc<dyn Observer> = counter.clone();
    m.curve.register_observer(Arc::downgrade(&observer));

    m.short.set_value(0.031);
    m.curve.set_reference_date(date(2025, 1, 2));
    assert_eq!(counter.0.load(Ordering::SeqCst), 2);

    m.curve.unregister_observer(&Arc::downgrade(&observer));
    m.long.set_value(0.036);
    assert_eq!(counter.0.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_queries_share_one_solve() {
    let m = market();

    thread::scope(|scope| {
        for k in 0..8 {
            let curve = &m.curve;
            scope.spawn(move || {
                let t = 0.25 * f64::from(k % 4 + 1);
                let df = curve.discount(t).unwrap();
                assert!(df > 0.9 && df < 1.0);
            });
        }
    });

    assert_eq!(m.curve.recalculations(), 1);
}

#[test]
fn test_snapshot_survives_recalculation() {
    let m = market();
    m.curve.ensure_up_to_date().unwrap();
    let snapshot = m.curve.committed();

    m.short.set_value(0.02);
    m.curve.ensure_up_to_date().unwrap();

    let old = snapshot.curve().unwrap();
    assert_relative_eq!(old.discount(1.0).unwrap(), (-0.03f64).exp(), epsilon = 1e-12);
    assert_relative_eq!(m.curve.discount(1.0).unwrap(), (-0.02f64).exp(), epsilon = 1e-12);
}
