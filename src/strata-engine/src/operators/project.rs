//! Projection execution operator.

use std::sync::Arc;

use arrow::datatypes::Field;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use async_trait::async_trait;

use common_error::StrataResult;
use strata_logical::LogicalExpr;

use crate::executor::ExecutionContext;
use crate::expr::ExprEvaluator;
use crate::metrics::{ExecutionTimer, OperatorMetrics};
use crate::operators::PhysicalOperator;
use crate::physical::{OperatorCaps, PhysicalSchema};

/// Projection execution operator.
///
/// Evaluates one expression per output column. Output names come from
/// `LogicalExpr::output_name`.
#[derive(Debug)]
pub struct ProjectExec {
    input: Arc<dyn PhysicalOperator>,
    expressions: Vec<LogicalExpr>,
    schema: PhysicalSchema,
    metrics: tokio::sync::Mutex<OperatorMetrics>,
}

impl ProjectExec {
    /// Create a projection, resolving output types against the input schema.
    pub fn try_new(
        input: Arc<dyn PhysicalOperator>,
        expressions: Vec<LogicalExpr>,
    ) -> StrataResult<Self> {
        let input_schema = input.schema();
        let empty = RecordBatch::new_empty(Arc::clone(input_schema.arrow_schema()));
        let evaluator = ExprEvaluator::new();

        let mut fields = Vec::with_capacity(expressions.len());
        for expr in &expressions {
            let array = evaluator.evaluate(expr, &empty)?;
            let nullable = match Self::passthrough_column(expr) {
                Some(name) => input_schema.field(name).map_or(true, Field::is_nullable),
                None => true,
            };
            fields.push(Arc::new(Field::new(
                expr.output_name(),
                array.data_type().clone(),
                nullable,
            )));
        }

        Ok(Self {
            input,
            expressions,
            schema: PhysicalSchema::try_from_fields(fields)?,
            metrics: tokio::sync::Mutex::new(OperatorMetrics::default()),
        })
    }

    /// The input column an expression copies unchanged, if any.
    fn passthrough_column(expr: &LogicalExpr) -> Option<&str> {
        match expr {
            LogicalExpr::Column(name) => Some(name.as_str()),
            LogicalExpr::Alias { expr, .. } => Self::passthrough_column(expr),
            _ => None,
        }
    }

    fn project_batch(&self, batch: &RecordBatch) -> StrataResult<RecordBatch> {
        let evaluator = ExprEvaluator::new();
        let columns = self
            .expressions
            .iter()
            .map(|expr| evaluator.evaluate(expr, batch))
            .collect::<StrataResult<Vec<_>>>()?;

        // An empty projection still has to carry the row count.
        let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
        Ok(RecordBatch::try_new_with_options(
            Arc::clone(self.schema.arrow_schema()),
            columns,
            &options,
        )?)
    }
}

#[async_trait]
impl PhysicalOperator for ProjectExec {
    fn name(&self) -> &'static str {
        "ProjectExec"
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
        let Some(batch) = self.input.next().await? else {
            return Ok(None);
        };
        let timer = ExecutionTimer::start();
        let projected = self.project_batch(&batch)?;

        let mut metrics = self.metrics.lock().await;
        metrics.add_rows_in(batch.num_rows());
        metrics.add_output(projected.num_rows());
        metrics.add_time(timer.elapsed());
        Ok(Some(projected))
    }

    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        let metrics = std::mem::take(&mut *self.metrics.lock().await);
        ctx.record_metrics(&self.display(), &metrics);
        self.input.close(ctx).await
    }

    fn display(&self) -> String {
        let exprs = self
            .expressions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("ProjectExec({exprs})")
    }
}
