//! End-to-end tests against the orchestrator, exercising its lifecycle
//! rules and cross-domain behavior through a small in-memory fake
//! `Provider` (see `tests/common/mod.rs`).

use std::sync::Arc;

use platform_io::config::Config;
use platform_io::orchestrator::{Error, Orchestrator};
use platform_io::provider::AggregationKind;
use platform_io::topology::{Domain, StaticTopology};

mod common;

use common::FakeProvider;

/// 1 package, 2 cores/package, 2 cpus/core -> 4 cpus.
fn topology() -> Arc<StaticTopology> {
    Arc::new(StaticTopology::new(1, 2, 2, 0, 0))
}

#[test]
fn direct_push_and_sample() {
    let provider = FakeProvider::new("p1").with_signal(
        "FREQ",
        Domain::Cpu,
        AggregationKind::Average,
        vec![1.0e9, 2.0e9, 3.0e9, 4.0e9],
    );
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let handle = orch.push_signal("FREQ", Domain::Cpu, 2).unwrap();
    orch.read_batch().unwrap();
    assert_eq!(orch.sample(handle).unwrap(), 3.0e9);
}

#[test]
fn cross_domain_average_aggregation() {
    let provider = FakeProvider::new("p1").with_signal(
        "FREQ",
        Domain::Cpu,
        AggregationKind::Average,
        vec![1.0e9, 2.0e9, 3.0e9, 4.0e9],
    );
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let handle = orch.push_signal("FREQ", Domain::Package, 0).unwrap();
    orch.read_batch().unwrap();
    assert_eq!(orch.sample(handle).unwrap(), 2.5e9);
}

#[test]
fn sum_control_disaggregates_one_shot_write() {
    let provider = FakeProvider::new("p1").with_control(
        "POWER",
        Domain::Cpu,
        AggregationKind::Sum,
        vec![0.0, 0.0, 0.0, 0.0],
    );
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    orch.write_control("POWER", Domain::Package, 0, 100.0).unwrap();
    for idx in 0..4 {
        assert_eq!(orch.read_signal("POWER", Domain::Cpu, idx).unwrap(), 25.0);
    }
}

#[test]
fn non_sum_control_keeps_setting_unscaled() {
    let provider = FakeProvider::new("p1").with_control(
        "LIMIT",
        Domain::Cpu,
        AggregationKind::ExpectSame,
        vec![0.0, 0.0, 0.0, 0.0],
    );
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    orch.write_control("LIMIT", Domain::Package, 0, 42.0).unwrap();
    for idx in 0..4 {
        assert_eq!(orch.read_signal("LIMIT", Domain::Cpu, idx).unwrap(), 42.0);
    }
}

#[test]
fn sum_control_push_and_adjust_disaggregates() {
    let provider = FakeProvider::new("p1").with_control(
        "POWER",
        Domain::Cpu,
        AggregationKind::Sum,
        vec![0.0, 0.0, 0.0, 0.0],
    );
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let handle = orch.push_control("POWER", Domain::Package, 0).unwrap();
    orch.adjust(handle, 100.0).unwrap();
    orch.write_batch().unwrap();
    for idx in 0..4 {
        assert_eq!(orch.read_signal("POWER", Domain::Cpu, idx).unwrap(), 25.0);
    }
}

#[test]
fn fallback_on_io_error_is_transparent() {
    let overriding = FakeProvider::new("override")
        .with_signal("TEMP", Domain::Board, AggregationKind::SelectFirst, vec![0.0])
        .failing_on("TEMP");
    let base = FakeProvider::new("base").with_signal("TEMP", Domain::Board, AggregationKind::SelectFirst, vec![42.0]);

    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(overriding)).unwrap();
    orch.register_provider(Box::new(base)).unwrap();

    assert_eq!(orch.read_signal("TEMP", Domain::Board, 0).unwrap(), 42.0);
}

#[test]
fn repeated_push_of_memoized_fingerprint_succeeds_even_after_freeze() {
    let provider = FakeProvider::new("p1").with_signal("FREQ", Domain::Cpu, AggregationKind::Average, vec![1.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let h1 = orch.push_signal("FREQ", Domain::Cpu, 0).unwrap();
    orch.read_batch().unwrap();

    // The memoization lookup happens before the freeze check, so a
    // repeated push of the same fingerprint still returns its handle.
    let h2 = orch.push_signal("FREQ", Domain::Cpu, 0).unwrap();
    assert_eq!(h1, h2);
}

#[test]
fn push_of_new_fingerprint_after_freeze_fails() {
    let provider =
        FakeProvider::new("p1").with_signal("FREQ", Domain::Cpu, AggregationKind::Average, vec![1.0, 2.0, 3.0, 4.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let _ = orch.push_signal("FREQ", Domain::Cpu, 0).unwrap();
    orch.read_batch().unwrap();

    let err = orch.push_signal("FREQ", Domain::Cpu, 1).unwrap_err();
    assert!(matches!(err, Error::BatchFrozen { .. }));
}

#[test]
fn repeated_push_returns_same_handle() {
    let provider = FakeProvider::new("p1").with_signal("FREQ", Domain::Cpu, AggregationKind::Average, vec![1.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let h1 = orch.push_signal("FREQ", Domain::Cpu, 0).unwrap();
    let h2 = orch.push_signal("FREQ", Domain::Cpu, 0).unwrap();
    assert_eq!(h1, h2);
}

#[test]
fn sample_before_read_batch_fails_not_ready() {
    let provider = FakeProvider::new("p1").with_signal("FREQ", Domain::Cpu, AggregationKind::Average, vec![1.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let handle = orch.push_signal("FREQ", Domain::Cpu, 0).unwrap();
    let err = orch.sample(handle).unwrap_err();
    assert!(matches!(err, Error::NotReady { .. }));
}

#[test]
fn restore_without_save_fails_not_saved() {
    let provider = FakeProvider::new("p1").with_control("POWER", Domain::Cpu, AggregationKind::Sum, vec![0.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let err = orch.restore_controls().unwrap_err();
    assert!(matches!(err, Error::NotSaved { .. }));
}

#[test]
fn save_restore_round_trip() {
    let provider = FakeProvider::new("p1").with_control(
        "POWER",
        Domain::Cpu,
        AggregationKind::Sum,
        vec![10.0, 20.0, 30.0, 40.0],
    );
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    orch.save_controls().unwrap();
    orch.write_control("POWER", Domain::Cpu, 0, 99.0).unwrap();
    assert_eq!(orch.read_signal("POWER", Domain::Cpu, 0).unwrap(), 99.0);

    orch.restore_controls().unwrap();
    assert_eq!(orch.read_signal("POWER", Domain::Cpu, 0).unwrap(), 10.0);
}

#[test]
fn adjust_with_non_finite_setting_fails_invalid_argument() {
    let provider = FakeProvider::new("p1").with_control("POWER", Domain::Cpu, AggregationKind::Sum, vec![0.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let handle = orch.push_control("POWER", Domain::Cpu, 0).unwrap();
    let err = orch.adjust(handle, f64::NAN).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn unknown_name_is_reported() {
    let provider = FakeProvider::new("p1").with_signal("FREQ", Domain::Cpu, AggregationKind::Average, vec![1.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let err = orch.signal_domain("NOT_A_SIGNAL").unwrap_err();
    assert!(matches!(err, Error::UnknownName { .. }));
}

#[test]
fn out_of_range_domain_index_is_invalid_argument() {
    let provider = FakeProvider::new("p1").with_signal("FREQ", Domain::Cpu, AggregationKind::Average, vec![1.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let err = orch.push_signal("FREQ", Domain::Cpu, 99).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn is_adjust_same_is_false_for_sum_controls() {
    let provider = FakeProvider::new("p1")
        .with_control("POWER", Domain::Cpu, AggregationKind::Sum, vec![0.0])
        .with_control("LIMIT", Domain::Cpu, AggregationKind::ExpectSame, vec![0.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    assert!(!orch.is_adjust_same("POWER").unwrap());
    assert!(orch.is_adjust_same("LIMIT").unwrap());
}

#[test]
fn most_recently_registered_provider_wins_domain_classification() {
    let older = FakeProvider::new("older").with_signal("TEMP", Domain::Board, AggregationKind::SelectFirst, vec![1.0]);
    let newer = FakeProvider::new("newer").with_signal("TEMP", Domain::Cpu, AggregationKind::Average, vec![2.0]);

    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(older)).unwrap();
    orch.register_provider(Box::new(newer)).unwrap();

    assert_eq!(orch.signal_domain("TEMP").unwrap(), Domain::Cpu);
}

#[test]
fn register_provider_after_save_controls_fails() {
    let provider = FakeProvider::new("p1").with_control("POWER", Domain::Cpu, AggregationKind::Sum, vec![0.0]);
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();
    orch.save_controls().unwrap();

    let late = FakeProvider::new("late").with_signal("FREQ", Domain::Cpu, AggregationKind::Average, vec![1.0]);
    let err = orch.register_provider(Box::new(late)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn save_restore_to_directory_round_trips() {
    let provider = FakeProvider::new("demo").with_control(
        "demo::POWER",
        Domain::Cpu,
        AggregationKind::Sum,
        vec![10.0, 20.0, 30.0, 40.0],
    );
    let mut orch = Orchestrator::new(topology(), Config::new());
    orch.register_provider(Box::new(provider)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    orch.save_controls_to(dir.path()).unwrap();

    orch.write_control("demo::POWER", Domain::Cpu, 0, 999.0).unwrap();
    assert_eq!(orch.read_signal("demo::POWER", Domain::Cpu, 0).unwrap(), 999.0);

    orch.restore_controls_from(dir.path()).unwrap();
    assert_eq!(orch.read_signal("demo::POWER", Domain::Cpu, 0).unwrap(), 10.0);
}
