//! Extraction and simulation benchmarks
//!
//! - Metric extraction over long signals (both window locators)
//! - Reference-cell protocol runs
//!
//! Toyota Way: Measure before optimizing (Genchi Genbutsu)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cycle_aging::driver::Driver;
use cycle_aging::metrics::{ChargeWindow, MetricExtractor};
use cycle_aging::protocol::{CcCvParams, ProtocolSpec, PulsedParams, Termination};
use cycle_aging::simulation::{signals, ParameterSet, ReferenceCell, SimulationResult, TimeSeries};

/// Pulse train of `num_samples` samples: -6 A every third sample
#[allow(clippy::cast_precision_loss)]
fn create_pulsed_result(num_samples: usize) -> SimulationResult {
    let times: Vec<f64> = (0..num_samples).map(|i| i as f64).collect();
    let current = times
        .iter()
        .enumerate()
        .map(|(i, &t)| (t, if i % 3 == 0 { -6.0 } else { 0.0 }));
    let capacity = times
        .iter()
        .map(|&t| (t, 1.0 - t / (num_samples as f64 * 2.0)));
    let sei = times.iter().map(|&t| (t, t.mul_add(1e-15, 5e-9)));

    SimulationResult::builder("bench")
        .signal(signals::CURRENT, TimeSeries::from_samples(current))
        .signal(
            signals::VOLTAGE,
            TimeSeries::from_samples(times.iter().map(|&t| (t, 4.1))),
        )
        .signal(signals::DISCHARGE_CAPACITY, TimeSeries::from_samples(capacity))
        .signal(signals::SEI_THICKNESS, TimeSeries::from_samples(sei))
        .build()
}

/// Benchmark metric extraction
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let extractor = MetricExtractor::new();

    for size in [1_000, 10_000, 100_000].iter() {
        let result = create_pulsed_result(*size);

        group.bench_with_input(BenchmarkId::new("pulsed", size), size, |b, _| {
            b.iter(|| {
                let record = extractor
                    .extract(&result, &ChargeWindow::Pulsed { pulse_current: 6.0 })
                    .unwrap();
                black_box(record);
            });
        });

        group.bench_with_input(BenchmarkId::new("cccv", size), size, |b, _| {
            b.iter(|| {
                let record = extractor
                    .extract(
                        &result,
                        &ChargeWindow::CcCv {
                            cc_current: 6.0,
                            cv_voltage: 4.1,
                        },
                    )
                    .unwrap();
                black_box(record);
            });
        });
    }

    group.finish();
}

/// Benchmark full protocol simulation on the reference cell
fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    group.sample_size(10);

    let cccv = ProtocolSpec::cccv("cccv", &CcCvParams::default(), 1);
    let pulsed_params = PulsedParams::default();
    let pulsed = ProtocolSpec::pulsed(
        "pulsed",
        &pulsed_params,
        Some(Termination::VoltageCeiling {
            volts: pulsed_params.voltage_ceiling,
        }),
    );

    for spec in [cccv, pulsed] {
        group.bench_function(spec.name().to_string(), |b| {
            b.iter(|| {
                let mut driver = Driver::new(ReferenceCell::new(), ParameterSet::new("bench"));
                black_box(driver.simulate(&spec).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extraction, bench_simulation);
criterion_main!(benches);
