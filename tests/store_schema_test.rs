//! Result Store Schema Tests
//!
//! Records kept per protocol name: run handles, raw results, metric
//! records and artifacts.

use cycle_aging::metrics::{MetricRecord, TimeUnit};
use cycle_aging::simulation::{SimulationResult, TimeSeries};
use cycle_aging::store::{
    load_simulation, ArtifactRecord, ArtifactSink, JsonArtifactSink, ResultStore, RunRecord,
    RunStatus,
};

fn metric(name: &str, charge_time: f64) -> MetricRecord {
    MetricRecord::from_measurements(name, charge_time, 0.9, 3e-10, TimeUnit::Hours, true)
        .expect("valid measurements")
}

// =============================================================================
// RunRecord Tests
// =============================================================================

#[test]
fn test_run_record_creation() {
    let run = RunRecord::new("cccv", 9);

    assert_eq!(run.protocol_name(), "cccv");
    assert_eq!(run.status(), RunStatus::Pending);
    assert_eq!(run.steps_planned(), 9);
    assert_eq!(run.steps_completed(), 0);
    assert!(run.started_at().is_none());
    assert!(run.ended_at().is_none());
    assert!(run.failure().is_none());
}

#[test]
fn test_run_record_start() {
    let mut run = RunRecord::new("cccv", 9);
    run.start();

    assert_eq!(run.status(), RunStatus::Running);
    assert!(run.started_at().is_some());
    assert!(run.ended_at().is_none());
}

#[test]
fn test_run_record_finish_complete() {
    let mut run = RunRecord::new("cccv", 5);
    run.start();
    run.finish(&SimulationResult::builder("cccv").steps(5, 5).build());

    assert_eq!(run.status(), RunStatus::Complete);
    assert_eq!(run.steps_completed(), 5);
    assert!(run.ended_at().unwrap() >= run.started_at().unwrap());
}

#[test]
fn test_run_record_finish_partial() {
    let mut run = RunRecord::new("cccv", 9);
    run.start();
    run.finish(
        &SimulationResult::builder("cccv")
            .steps(5, 9)
            .failed("solver diverged")
            .build(),
    );

    assert_eq!(run.status(), RunStatus::Partial);
    assert_eq!(run.failure(), Some("solver diverged"));
}

#[test]
fn test_run_record_fail() {
    let mut run = RunRecord::new("broken", 0);
    run.start();
    run.fail("step list is empty");

    assert_eq!(run.status(), RunStatus::Failed);
    assert!(run.ended_at().is_some());
}

#[test]
fn test_run_record_serialization() {
    let mut run = RunRecord::new("pulsed", 3202);
    run.start();

    let json = serde_json::to_string(&run).expect("serialization failed");
    let deserialized: RunRecord = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(run, deserialized);
}

#[test]
fn test_run_status_variants() {
    assert_eq!(format!("{:?}", RunStatus::Pending), "Pending");
    assert_eq!(format!("{:?}", RunStatus::Running), "Running");
    assert_eq!(format!("{:?}", RunStatus::Complete), "Complete");
    assert_eq!(format!("{:?}", RunStatus::Partial), "Partial");
    assert_eq!(format!("{:?}", RunStatus::Failed), "Failed");
}

// =============================================================================
// MetricRecord Tests
// =============================================================================

#[test]
fn test_metric_record_serialization() {
    let record = metric("cccv", 0.5);

    let json = serde_json::to_string(&record).expect("serialization failed");
    let deserialized: MetricRecord = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(record, deserialized);
}

#[test]
fn test_metric_record_invariants() {
    let record = metric("cccv", 0.5);

    assert!(record.charge_time() > 0.0);
    assert!(record.charge_capacity() >= 0.0);
    assert!(record.degradation_delta() >= 0.0);
    assert!(
        (record.charge_speed() - record.charge_capacity() / record.charge_time()).abs() < 1e-12
    );
}

// =============================================================================
// ArtifactRecord Tests
// =============================================================================

#[test]
fn test_artifact_record_creation() {
    let artifact = ArtifactRecord::new("cccv", "results/cccv.json", 2048);

    assert_eq!(artifact.protocol_name(), "cccv");
    assert_eq!(artifact.location(), "results/cccv.json");
    assert_eq!(artifact.size_bytes(), 2048);
    assert!(artifact.created_at().timestamp() > 0);
}

#[test]
fn test_json_sink_overwrites_per_protocol() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = JsonArtifactSink::new(dir.path()).expect("sink");

    let first = SimulationResult::builder("cccv")
        .signal("Current [A]", TimeSeries::from_samples([(1.0, -4.0)]))
        .build();
    let second = SimulationResult::builder("cccv")
        .signal("Current [A]", TimeSeries::from_samples([(1.0, -2.0), (2.0, -2.0)]))
        .build();

    let a = sink.persist(&first).expect("persist");
    let b = sink.persist(&second).expect("persist");

    assert_eq!(a.location(), b.location());
    assert_eq!(load_simulation(b.location()).expect("load"), second);
    assert_eq!(std::fs::read_dir(dir.path()).expect("read_dir").count(), 1);
}

#[test]
fn test_load_simulation_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_simulation(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, cycle_aging::Error::Io(_)));
}

// =============================================================================
// ResultStore Tests
// =============================================================================

#[test]
fn test_store_record_and_get() {
    let mut store = ResultStore::new();
    store.record("cccv", metric("cccv", 0.5));

    assert_eq!(store.len(), 1);
    assert!(store.get("cccv").is_some());
    assert!(store.get("pulsed").is_none());
}

#[test]
fn test_store_overwrite_on_rerun() {
    let mut store = ResultStore::new();
    store.record("cccv", metric("cccv", 0.5));
    store.record("cccv", metric("cccv", 0.7));

    assert_eq!(store.len(), 1);
    assert!((store.get("cccv").unwrap().charge_time() - 0.7).abs() < f64::EPSILON);
}

#[test]
fn test_store_keeps_run_without_metrics() {
    let mut store = ResultStore::new();
    let mut run = RunRecord::new("broken", 0);
    run.fail("rejected");
    store.record_run(run);

    assert!(!store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(store.run("broken").map(RunRecord::status), Some(RunStatus::Failed));
}

#[test]
fn test_store_simulation_and_artifact() {
    let mut store = ResultStore::new();
    store.record_simulation(SimulationResult::new("pulsed", 4));
    store.record_artifact(ArtifactRecord::new("pulsed", "out/pulsed.json", 10));

    assert_eq!(store.simulation("pulsed").unwrap().steps_planned(), 4);
    assert_eq!(store.artifact("pulsed").unwrap().size_bytes(), 10);
}

#[test]
fn test_store_merge() {
    let mut a = ResultStore::new();
    a.record("cccv", metric("cccv", 0.5));
    let mut b = ResultStore::new();
    b.record("cccv", metric("cccv", 0.9));
    b.record("pulsed", metric("pulsed", 0.4));

    a.merge(b);
    let names: Vec<&str> = a.names().collect();
    assert_eq!(names, vec!["cccv", "pulsed"]);
    assert!((a.get("cccv").unwrap().charge_time() - 0.9).abs() < f64::EPSILON);
}
