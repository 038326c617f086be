//! Benchmarks for curve bootstrapping and queries.
//!
//! Run with: cargo bench -p pillar-curves

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pillar_core::Date;
use pillar_curves::prelude::*;
use pillar_math::interpolation::InterpolationMethod;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn reference() -> Date {
    Date::from_ymd(2025, 1, 15).unwrap()
}

/// A 6M deposit followed by annual swaps out to `years`.
fn swap_helpers(years: i32) -> (Vec<Arc<SimpleQuote>>, Vec<Arc<dyn Helper>>) {
    let start = reference();
    let mut quotes = Vec::new();
    let mut helpers: Vec<Arc<dyn Helper>> = Vec::new();

    let deposit = Arc::new(SimpleQuote::new(0.0410));
    helpers.push(Arc::new(
        DepositHelper::new(deposit.clone(), start, start.add_months(6).unwrap()).unwrap(),
    ));
    quotes.push(deposit);

    for year in 1..=years {
        let rate = 0.0380 + 0.0004 * f64::from(year);
        let quote = Arc::new(SimpleQuote::new(rate));
        helpers.push(Arc::new(
            SwapHelper::new(quote.clone(), start, start.add_years(year).unwrap(), 12).unwrap(),
        ));
        quotes.push(quote);
    }
    (quotes, helpers)
}

fn build_curve(helpers: Vec<Arc<dyn Helper>>, method: InterpolationMethod) -> PiecewiseCurve {
    PiecewiseCurve::builder(reference())
        .with_helpers(helpers)
        .with_interpolation(method)
        .build()
        .unwrap()
}

// =============================================================================
// BOOTSTRAP BENCHMARKS
// =============================================================================

fn bench_bootstrap_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("bootstrap_swaps");
    group.sample_size(30);

    for years in [5, 10, 20, 30] {
        let (_, helpers) = swap_helpers(years);
        group.throughput(Throughput::Elements(helpers.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(years), &helpers, |b, helpers| {
            b.iter(|| {
                let curve = build_curve(helpers.clone(), InterpolationMethod::LogLinear);
                curve.ensure_up_to_date().unwrap();
                black_box(curve.max_time())
            })
        });
    }
    group.finish();
}

fn bench_bootstrap_by_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("bootstrap_interpolation_10y");
    group.sample_size(30);

    let (_, helpers) = swap_helpers(10);
    for method in [
        InterpolationMethod::Linear,
        InterpolationMethod::LogLinear,
        InterpolationMethod::BackwardFlat,
    ] {
        group.bench_function(method.to_string(), |b| {
            b.iter(|| {
                let curve = build_curve(helpers.clone(), method);
                curve.ensure_up_to_date().unwrap();
                black_box(curve.max_time())
            })
        });
    }
    group.finish();
}

fn bench_requote(c: &mut Criterion) {
    let (quotes, helpers) = swap_helpers(10);
    let curve = build_curve(helpers, InterpolationMethod::LogLinear);
    let mut bump = false;

    c.bench_function("requote_and_query_10y", |b| {
        b.iter(|| {
            bump = !bump;
            quotes[5].set_value(if bump { 0.0405 } else { 0.0404 });
            black_box(curve.discount(black_box(7.5)).unwrap())
        })
    });
}

// =============================================================================
// QUERY BENCHMARKS
// =============================================================================

fn bench_queries(c: &mut Criterion) {
    let (_, helpers) = swap_helpers(30);
    let curve = build_curve(helpers, InterpolationMethod::LogLinear);
    curve.ensure_up_to_date().unwrap();

    let mut group = c.benchmark_group("curve_queries");
    group.bench_function("discount", |b| {
        b.iter(|| curve.discount(black_box(12.3)).unwrap())
    });
    group.bench_function("zero_rate", |b| {
        b.iter(|| curve.zero_rate(black_box(12.3)).unwrap())
    });
    group.bench_function("forward_rate", |b| {
        b.iter(|| curve.forward_rate(black_box(10.0), black_box(12.3)).unwrap())
    });
    group.finish();
}

// =============================================================================
// CRITERION GROUPS
// =============================================================================

criterion_group!(
    bootstrap,
    bench_bootstrap_by_size,
    bench_bootstrap_by_interpolation,
    bench_requote,
);

criterion_group!(queries, bench_queries,);

criterion_main!(bootstrap, queries);
