//! Filter execution operator.

use std::sync::Arc;

use arrow::compute::filter_record_batch;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_error::StrataResult;
use strata_logical::LogicalExpr;

use crate::executor::ExecutionContext;
use crate::expr::ExprEvaluator;
use crate::metrics::{ExecutionTimer, OperatorMetrics};
use crate::operators::PhysicalOperator;
use crate::physical::{OperatorCaps, PhysicalSchema};

/// Filter execution operator.
///
/// Keeps the rows for which the predicate is true; null counts as false.
#[derive(Debug)]
pub struct FilterExec {
    /// Input operator.
    input: Arc<dyn PhysicalOperator>,
    /// Filter predicate.
    predicate: LogicalExpr,
    /// Output schema (same as input).
    schema: PhysicalSchema,
    /// Accumulated metrics.
    metrics: tokio::sync::Mutex<OperatorMetrics>,
}

impl FilterExec {
    /// Create a filter, checking that the predicate is boolean over the
    /// input's columns.
    pub fn try_new(input: Arc<dyn PhysicalOperator>, predicate: LogicalExpr) -> StrataResult<Self> {
        let schema = input.schema().clone();
        let empty = RecordBatch::new_empty(Arc::clone(schema.arrow_schema()));
        ExprEvaluator::new().evaluate_predicate(&predicate, &empty)?;

        Ok(Self {
            input,
            predicate,
            schema,
            metrics: tokio::sync::Mutex::new(OperatorMetrics::default()),
        })
    }

    /// Get the predicate expression.
    pub fn predicate(&self) -> &LogicalExpr {
        &self.predicate
    }
}

#[async_trait]
impl PhysicalOperator for FilterExec {
    fn name(&self) -> &'static str {
        "FilterExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn capabilities(&self) -> OperatorCaps {
        OperatorCaps::streaming()
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![&self.input]
    }

    async fn open(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        self.input.open(ctx).await
    }

    async fn next(&self) -> StrataResult<Option<RecordBatch>> {
        let evaluator = ExprEvaluator::new();

        while let Some(batch) = self.input.next().await? {
            let timer = ExecutionTimer::start();
            let mask = evaluator.evaluate_predicate(&self.predicate, &batch)?;
            let filtered = filter_record_batch(&batch, &mask)?;

            {
                let mut metrics = self.metrics.lock().await;
                metrics.add_rows_in(batch.num_rows());
                metrics.add_time(timer.elapsed());
                if filtered.num_rows() > 0 {
                    metrics.add_output(filtered.num_rows());
                }
            }

            // Skip batches where every row was filtered out
            if filtered.num_rows() > 0 {
                return Ok(Some(filtered));
            }
        }
        Ok(None)
    }

    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        let metrics = std::mem::take(&mut *self.metrics.lock().await);
        ctx.record_metrics(&self.display(), &metrics);
        self.input.close(ctx).await
    }

    fn display(&self) -> String {
        format!("FilterExec({})", self.predicate)
    }
}
