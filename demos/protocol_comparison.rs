//! Protocol Comparison Example
//!
//! Runs the CC-CV baseline and three pulsed protocols on the reference
//! cell, then prints both rankings.
//!
//! Run with: cargo run --example protocol_comparison [-- driver.json]
//!
//! `RUST_LOG=debug` shows every termination check.

use anyhow::{Context, Result};
use cycle_aging::compare::{Comparison, RankBy, SortOrder};
use cycle_aging::config::DriverConfig;
use cycle_aging::driver::{Driver, ProtocolRun};
use cycle_aging::metrics::ChargeWindow;
use cycle_aging::protocol::{CcCvParams, ProtocolSpec, PulsedParams, Termination};
use cycle_aging::simulation::{ParameterSet, ReferenceCell};
use cycle_aging::store::ResultStore;
use tracing::info;

/// Nominal capacity of the reference cell (A.h)
const CAPACITY: f64 = 1.0;

fn pulsed(name: &str, pulse_rate: f64, pulse_seconds: f64, rest_seconds: f64) -> ProtocolRun {
    let params = PulsedParams {
        pulse_rate,
        pulse_seconds,
        rest_seconds,
        ..PulsedParams::default()
    };
    println!(
        "   {name}: {pulse_rate}C pulses, duty cycle {:.2}",
        params.duty_cycle()
    );
    ProtocolRun::pulsed(
        name,
        &params,
        Some(Termination::VoltageCeiling {
            volts: params.voltage_ceiling,
        }),
        CAPACITY,
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    println!("=== cycle-aging Protocol Comparison ===\n");

    // -------------------------------------------------------------------------
    // 1. Configuration
    // -------------------------------------------------------------------------
    let config = match std::env::args().nth(1) {
        Some(path) => DriverConfig::from_json_file(&path)
            .with_context(|| format!("failed to load driver config from {path}"))?,
        None => DriverConfig::default(),
    };
    println!("1. Time unit: {}", config.time_unit);

    // -------------------------------------------------------------------------
    // 2. Protocols
    // -------------------------------------------------------------------------
    println!("\n2. Building protocols...");
    let mut plans = vec![ProtocolRun::cccv(
        "cccv_charging",
        &CcCvParams::default(),
        1,
        CAPACITY,
    )];
    plans.push(pulsed("pulsed_6C_1s_2s", 6.0, 1.0, 2.0));
    plans.push(pulsed("pulsed_4C_1s_1s", 4.0, 1.0, 1.0));
    plans.push(pulsed("pulsed_8C_1s_3s", 8.0, 1.0, 3.0));

    // same CC-CV cycle, written as directives
    let directive_spec = ProtocolSpec::from_directives(
        "cccv_directives",
        &["Charge at 2C until 4.2V"],
        &[
            "Discharge at 2C until 2.1V",
            "Charge at 4C until 3.78V",
            "Hold at 4.1V until 20mA",
            "Rest for 5 minutes",
        ],
        1,
    )
    .context("directive protocol")?;
    for step in directive_spec.steps() {
        println!("   cccv_directives: {step}");
    }
    plans.push(ProtocolRun::new(
        directive_spec,
        ChargeWindow::CcCv {
            cc_current: 4.0 * CAPACITY,
            cv_voltage: 4.1,
        },
    ));

    // -------------------------------------------------------------------------
    // 3. Run the batch
    // -------------------------------------------------------------------------
    println!("\n3. Running {} protocols...", plans.len());
    let mut driver = Driver::from_config(ReferenceCell::new(), ParameterSet::new("reference"), &config)
        .context("failed to set up driver")?;
    let mut store = ResultStore::new();
    let report = driver.run_batch(&plans, &mut store);

    for (name, error) in &report.failed {
        println!("   {name}: no metrics ({error})");
    }
    for run in store.runs() {
        info!(
            protocol = run.protocol_name(),
            status = ?run.status(),
            steps = run.steps_completed(),
            "run summary"
        );
    }

    // -------------------------------------------------------------------------
    // 4. Compare
    // -------------------------------------------------------------------------
    let comparison = Comparison::new(&store, config.time_unit);
    println!("\n4. Results (least degradation per speed first):\n");
    println!("{comparison}");

    println!("Fastest charge first:");
    for (rank, record) in comparison.by_charge_speed().iter().enumerate() {
        println!(
            "   {}. {} ({:.3} A.h/{})",
            rank + 1,
            record.protocol_name(),
            record.charge_speed(),
            comparison.time_unit()
        );
    }

    println!("\nLeast SEI growth first:");
    for (rank, record) in comparison
        .rank(RankBy::DegradationDelta, SortOrder::Ascending)
        .iter()
        .enumerate()
    {
        println!(
            "   {}. {} ({:.3e} m in {:.3} {})",
            rank + 1,
            record.protocol_name(),
            record.degradation_delta(),
            record.charge_time(),
            comparison.time_unit()
        );
    }
    if let Some(shortest) = comparison.rank(RankBy::ChargeTime, SortOrder::Ascending).first() {
        println!("\nShortest charge: {}", shortest.protocol_name());
    }
    if let Some(soc) = driver.simulator().state_of_charge() {
        println!("Reference cell ends at {:.1}% state of charge", soc * 100.0);
    }

    Ok(())
}
