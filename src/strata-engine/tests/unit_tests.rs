//! Unit tests for the strata-engine public API.
//!
//! These tests focus on component behavior that is reachable from outside the
//! crate, without duplicating the integration tests.

use std::sync::Arc;

use common_error::StrataError;
use strata_engine::{
    executor::RuntimeConfig,
    memory::{MemoryManager, MemoryReservation, TrackingMemoryManager},
    metrics::{MetricsSink, OperatorMetrics},
    physical::{OperatorCaps, PhysicalSchema},
};

#[test]
fn test_physical_schema() {
    let schema = PhysicalSchema::empty();
    assert_eq!(schema.num_columns(), 0);
    assert!(matches!(
        schema.index_of("id"),
        Err(StrataError::ColumnNotFound(_))
    ));
}

#[test]
fn test_operator_capabilities() {
    let filter_caps = OperatorCaps::streaming();
    assert!(!filter_caps.blocking);
    assert!(!filter_caps.source);

    let join_caps = OperatorCaps::blocking();
    assert!(join_caps.blocking);

    assert!(OperatorCaps::source().source);
}

#[test]
fn test_memory_manager() {
    let memory_manager: Arc<dyn MemoryManager> =
        Arc::new(TrackingMemoryManager::new(Some(1000)));

    let reservation1 = MemoryReservation::try_new(Arc::clone(&memory_manager), 100).unwrap();
    assert_eq!(memory_manager.used(), 100);

    {
        let _reservation2 = MemoryReservation::try_new(Arc::clone(&memory_manager), 200).unwrap();
        assert_eq!(memory_manager.used(), 300);
    }
    assert_eq!(memory_manager.used(), 100);

    drop(reservation1);
    assert_eq!(memory_manager.used(), 0);

    let _reservation3 = MemoryReservation::try_new(Arc::clone(&memory_manager), 800).unwrap();
    assert_eq!(memory_manager.used(), 800);

    // Exceeds the limit; nothing is reserved.
    let result = MemoryReservation::try_new(Arc::clone(&memory_manager), 300);
    assert!(matches!(result, Err(StrataError::ExecutionError(_))));
    assert_eq!(memory_manager.used(), 800);
}

#[test]
fn test_metrics_collection() {
    let metrics = MetricsSink::new();

    let mut op_metrics = OperatorMetrics::new();
    op_metrics.add_rows_in(100);
    op_metrics.add_output(80);
    metrics.record("FilterExec(x)", &op_metrics);
    metrics.record("FilterExec(x)", &op_metrics);

    let recorded = metrics.get("FilterExec(x)").unwrap();
    assert_eq!(recorded.rows_in, 200);
    assert_eq!(recorded.rows_out, 160);
    assert_eq!(recorded.batches, 2);
    assert!(metrics.format_analyze().contains("FilterExec(x)"));
}

#[test]
fn test_runtime_config() {
    let config = RuntimeConfig::default();
    assert!(config.batch_size > 0);
    assert_eq!(config.memory_limit, None);

    let custom_config = RuntimeConfig::default().with_batch_size(4096);
    assert_eq!(custom_config.batch_size, 4096);
}
