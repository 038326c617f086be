//! Credit Curve Construction Example
//!
//! This example builds two curves from live quotes:
//!
//! 1. **Discount Curve**: a 6M deposit and annual swaps, log-linear on
//!    discount factors, with a turn-of-year jump applied to queries
//! 2. **Hazard Curve**: average hazard rates at 1Y, 3Y, 5Y and 7Y,
//!    backward-flat on hazard rates, configured from TOML
//!
//! It then moves a quote to show the lazy recalculation: nothing is solved
//! until the next query, and only once.
//!
//! Market Data: January 15, 2025
//!
//! | Instrument | Tenor | Quote   |
//! |------------|-------|---------|
//! | Deposit    | 6M    | 4.300%  |
//! | Swap       | 1Y    | 4.150%  |
//! | Swap       | 2Y    | 3.980%  |
//! | Swap       | 5Y    | 3.850%  |
//! | Swap       | 10Y   | 3.920%  |
//! | Hazard     | 1Y    | 1.100%  |
//! | Hazard     | 3Y    | 1.350%  |
//! | Hazard     | 5Y    | 1.600%  |
//! | Hazard     | 7Y    | 1.750%  |
//!
//! Set `RUST_LOG=pillar_curves=debug` to follow the bootstrap.
//!
//! Run with: cargo run --example credit_curve

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pillar_core::Date;
use pillar_curves::prelude::*;

const HAZARD_CONFIG: &str = r#"
kind = "HazardRate"
interpolation = "BackwardFlat"
day_count = "Act365Fixed"
allow_extrapolation = true

[bootstrap]
accuracy = 1e-12
max_evaluations = 200
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("===========================================");
    println!("  Credit Curve Construction Example");
    println!("  Market Data: January 15, 2025");
    println!("===========================================\n");

    let reference = Date::from_ymd(2025, 1, 15)?;

    // =========================================================================
    // DISCOUNT CURVE
    // =========================================================================

    let deposit = Arc::new(SimpleQuote::new(0.0430));
    let mut helpers: Vec<Arc<dyn Helper>> = vec![Arc::new(DepositHelper::new(
        deposit.clone(),
        reference,
        reference.add_months(6)?,
    )?)];

    let swap_quotes = [(1, 0.0415), (2, 0.0398), (5, 0.0385), (10, 0.0392)];
    let mut two_year = None;
    for (years, rate) in swap_quotes {
        let quote = Arc::new(SimpleQuote::new(rate));
        if years == 2 {
            two_year = Some(quote.clone());
        }
        helpers.push(Arc::new(SwapHelper::new(
            quote,
            reference,
            reference.add_years(years)?,
            12,
        )?));
    }
    let two_year = two_year.context("2Y swap quote missing")?;

    let discount = PiecewiseCurve::builder(reference)
        .with_helpers(helpers)
        .with_turn_of_year(TurnOfYearEffect::new(Arc::new(SimpleQuote::new(0.9995))))
        .build()?;

    println!("Discount curve ({} helpers)", discount.helpers().len());
    println!("-------------------------------------------");
    println!("{:<12} {:>10} {:>12} {:>10}", "Date", "Time", "DF", "Zero");
    for (date, node) in discount.dates().iter().zip(discount.nodes()) {
        let zero = discount.zero_rate(node.time)?;
        println!(
            "{:<12} {:>10.4} {:>12.8} {:>9.4}%",
            date.to_string(),
            node.time,
            node.value,
            zero * 100.0
        );
    }

    if let Some(report) = discount.last_report() {
        println!("\n{report}");
    }

    // =========================================================================
    // LAZY RECALCULATION
    // =========================================================================

    println!("\nMoving the 2Y swap from 3.98% to 4.05%");
    two_year.set_value(0.0405);
    println!(
        "  solves before query: {}",
        discount.recalculations()
    );
    let df = discount.discount(1.75)?;
    let _ = discount.discount(1.80)?;
    println!("  DF(1.75) = {df:.8}");
    println!("  solves after two queries: {}", discount.recalculations());

    // =========================================================================
    // HAZARD CURVE
    // =========================================================================

    let config = PiecewiseCurveConfig::from_toml_str(HAZARD_CONFIG)?;
    let hazard_quotes = [(1, 0.0110), (3, 0.0135), (5, 0.0160), (7, 0.0175)];
    let hazard_helpers = hazard_quotes
        .iter()
        .map(|&(years, rate)| -> anyhow::Result<Arc<dyn Helper>> {
            Ok(Arc::new(ZeroRateHelper::new(
                Arc::new(SimpleQuote::new(rate)),
                reference.add_years(years)?,
            )))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let hazard = PiecewiseCurve::new(reference, hazard_helpers, config)?;
    hazard.ensure_up_to_date()?;

    println!("\nHazard curve ({})", hazard.config().interpolation);
    println!("-------------------------------------------");
    println!("{:<12} {:>10} {:>10} {:>12}", "Date", "Time", "Hazard", "Survival");
    for (date, node) in hazard.dates().iter().zip(hazard.nodes()).skip(1) {
        println!(
            "{:<12} {:>10.4} {:>9.4}% {:>12.8}",
            date.to_string(),
            node.time,
            node.value * 100.0,
            hazard.discount(node.time)?
        );
    }
    println!(
        "\nSurvival to 10Y (extrapolated): {:.8}",
        hazard.discount(10.0)?
    );

    Ok(())
}
