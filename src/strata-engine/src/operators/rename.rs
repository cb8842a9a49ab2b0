//! Rename execution operator.

use std::sync::Arc;

use arrow::datatypes::Field;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use async_trait::async_trait;

use common_error::StrataResult;
use strata_logical::RenameOp;

use crate::executor::ExecutionContext;
use crate::operators::PhysicalOperator;
use crate::physical::{OperatorCaps, PhysicalSchema};

/// Rename execution operator.
///
/// Relabels columns without touching the arrays.
#[derive(Debug)]
pub struct RenameExec {
    /// Input operator.
    input: Arc<dyn PhysicalOperator>,
    /// Rename definition.
    rename: RenameOp,
    /// Output schema with renamed columns.
    schema: PhysicalSchema,
}

impl RenameExec {
    /// Create a rename, failing if two columns end up with the same name.
    pub fn try_new(input: Arc<dyn PhysicalOperator>, rename: RenameOp) -> StrataResult<Self> {
        let fields = input
            .schema()
            .arrow_schema()
            .fields()
            .iter()
            .map(|f| {
                Arc::new(Field::new(
                    rename.new_name(f.name()),
                    f.data_type().clone(),
                    f.is_nullable(),
                ))
            })
            .collect();
        let schema = PhysicalSchema::try_from_fields(fields)?;
        Ok(Self {
            input,
            rename,
            schema,
        })
    }
}

#[async_trait]
impl PhysicalOperator for RenameExec {
    fn name(&self) -> &'static str {
        "RenameExec"
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
        let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
        Ok(Some(RecordBatch::try_new_with_options(
            Arc::clone(self.schema.arrow_schema()),
            batch.columns().to_vec(),
            &options,
        )?))
    }

    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        self.input.close(ctx).await
    }

    fn display(&self) -> String {
        format!("RenameExec({})", self.rename)
    }
}
