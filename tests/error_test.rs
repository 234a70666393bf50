//! Tests for error types

use cycle_aging::simulation::TimeSeries;
use cycle_aging::Error;

#[test]
fn test_configuration_error() {
    let error = Error::Configuration {
        protocol: "cccv".to_string(),
        reason: "repeat count must be at least 1".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Configuration error"));
    assert!(error_str.contains("'cccv'"));
    assert!(error_str.contains("repeat count"));
    assert!(!error.is_recoverable());
}

#[test]
fn test_parse_error() {
    let error = Error::ParseError("unknown action 'boost'".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Protocol parse error"));
    assert!(error_str.contains("boost"));
}

#[test]
fn test_solver_divergence_error() {
    let error = Error::SolverDivergence {
        step_index: 4,
        reason: "step size too small".to_string(),
        partial: vec![(
            "Current [A]".to_string(),
            TimeSeries::from_samples([(1.0, -4.0)]),
        )],
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Solver diverged at step 4"));
    assert!(error_str.contains("step size too small"));
    assert!(error.is_recoverable());
}

#[test]
fn test_missing_signal_error() {
    let error = Error::MissingSignal {
        protocol: "pulsed".to_string(),
        signal: "Terminal voltage [V]".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("missing"));
    assert!(error_str.contains("Terminal voltage [V]"));
}

#[test]
fn test_empty_signal_error() {
    let error = Error::EmptySignal {
        protocol: "pulsed".to_string(),
        signal: "Current [A]".to_string(),
    };
    assert!(format!("{error}").contains("has no samples"));
}

#[test]
fn test_signal_not_found_error() {
    let error = Error::SignalNotFound {
        protocol: "cccv".to_string(),
        signal: "Terminal voltage [V]".to_string(),
        target: 4.1,
        tolerance: 1e-6,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("'cccv'"));
    assert!(error_str.contains("Terminal voltage [V]"));
    assert!(error_str.contains("4.1"));
    assert!(!error.is_recoverable());
}

#[test]
fn test_undefined_metric_error() {
    let error = Error::UndefinedMetric {
        protocol: "inverted".to_string(),
        reason: "charge end precedes start".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Undefined metric"));
    assert!(error_str.contains("precedes"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_serialization_error_conversion() {
    let json_error = serde_json::from_str::<TimeSeries>("not json").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("Serialization error"));
}

#[test]
fn test_error_debug_format() {
    let error = Error::ParseError("debug test".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("ParseError"));
}
