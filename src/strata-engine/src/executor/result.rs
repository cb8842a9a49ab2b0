//! Collected output of one plan execution.

use std::fmt;
use std::time::Duration;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::metrics::MetricsSink;

/// Every non-empty batch a plan produced, with the metrics gathered while
/// producing them.
#[derive(Debug)]
pub struct ExecutionResult {
    pub batches: Vec<RecordBatch>,
    /// Schema of the plan root; holds even when `batches` is empty.
    pub schema: SchemaRef,
    pub metrics: MetricsSink,
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub const fn new(
        batches: Vec<RecordBatch>,
        schema: SchemaRef,
        metrics: MetricsSink,
        elapsed: Duration,
    ) -> Self {
        Self {
            batches,
            schema,
            metrics,
            elapsed,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    pub const fn num_batches(&self) -> usize {
        self.batches.len()
    }

    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows in {} batch(es), {:?}",
            self.total_rows(),
            self.num_batches(),
            self.elapsed
        )
    }
}
