//! Union execution operator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arrow::datatypes::Field;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use async_trait::async_trait;

use common_error::{StrataError, StrataResult};

use crate::executor::ExecutionContext;
use crate::expr::{coerce_array, common_arrow_type};
use crate::operators::PhysicalOperator;
use crate::physical::{OperatorCaps, PhysicalSchema};

/// Union execution operator (bag semantics).
///
/// Streams the left input, then the right. Columns are matched by position
/// and take the left side's names; each pair is widened to a common type.
#[derive(Debug)]
pub struct UnionExec {
    left: Arc<dyn PhysicalOperator>,
    right: Arc<dyn PhysicalOperator>,
    schema: PhysicalSchema,
    /// Whether left input is exhausted.
    left_exhausted: AtomicBool,
}

impl UnionExec {
    /// Create a union, failing when column counts or types disagree.
    pub fn try_new(
        left: Arc<dyn PhysicalOperator>,
        right: Arc<dyn PhysicalOperator>,
    ) -> StrataResult<Self> {
        let l = left.schema().arrow_schema();
        let r = right.schema().arrow_schema();
        if l.fields().len() != r.fields().len() {
            return Err(StrataError::schema_error(format!(
                "union inputs have {} and {} columns",
                l.fields().len(),
                r.fields().len()
            )));
        }

        let fields = l
            .fields()
            .iter()
            .zip(r.fields().iter())
            .map(|(lf, rf)| {
                let data_type = common_arrow_type(lf.data_type(), rf.data_type())?;
                Ok(Arc::new(Field::new(
                    lf.name(),
                    data_type,
                    lf.is_nullable() || rf.is_nullable(),
                )))
            })
            .collect::<StrataResult<Vec<_>>>()?;

        Ok(Self {
            left,
            right,
            schema: PhysicalSchema::try_from_fields(fields)?,
            left_exhausted: AtomicBool::new(false),
        })
    }

    fn conform(&self, batch: RecordBatch) -> StrataResult<RecordBatch> {
        let columns = batch
            .columns()
            .iter()
            .zip(self.schema.arrow_schema().fields().iter())
            .map(|(column, field)| coerce_array(column, field.data_type()))
            .collect::<StrataResult<Vec<_>>>()?;
        let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
        Ok(RecordBatch::try_new_with_options(
            Arc::clone(self.schema.arrow_schema()),
            columns,
            &options,
        )?)
    }
}

#[async_trait]
impl PhysicalOperator for UnionExec {
    fn name(&self) -> &'static str {
        "UnionExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn capabilities(&self) -> OperatorCaps {
        OperatorCaps::streaming()
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![&self.left, &self.right]
    }

    async fn open(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        self.left_exhausted.store(false, Ordering::SeqCst);
        self.left.open(ctx).await?;
        self.right.open(ctx).await
    }

    async fn next(&self) -> StrataResult<Option<RecordBatch>> {
        // First exhaust left, then right
        if !self.left_exhausted.load(Ordering::SeqCst) {
            match self.left.next().await? {
                Some(batch) => return self.conform(batch).map(Some),
                None => self.left_exhausted.store(true, Ordering::SeqCst),
            }
        }
        match self.right.next().await? {
            Some(batch) => self.conform(batch).map(Some),
            None => Ok(None),
        }
    }

    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        self.left.close(ctx).await?;
        self.right.close(ctx).await
    }

    fn display(&self) -> String {
        "UnionExec(all)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::MemoryScanExec;
    use arrow::array::{ArrayRef, AsArray, Float64Array, Int64Array};
    use arrow::datatypes::{DataType, Float64Type, Schema};

    fn scan(name: &str, data_type: DataType, column: ArrayRef) -> Arc<dyn PhysicalOperator> {
        let schema = Arc::new(Schema::new(vec![Field::new(name, data_type, false)]));
        let batch = RecordBatch::try_new(schema.clone(), vec![column]).unwrap();
        Arc::new(MemoryScanExec::new(
            name,
            PhysicalSchema::new(schema),
            vec![batch].into(),
            16,
        ))
    }

    #[tokio::test]
    async fn test_union_widens_and_keeps_duplicates() {
        let left = scan("x", DataType::Int64, Arc::new(Int64Array::from(vec![1, 2])));
        let right = scan("y", DataType::Float64, Arc::new(Float64Array::from(vec![2.0, 2.5])));
        let union = UnionExec::try_new(left, right).unwrap();
        assert_eq!(union.schema().field_names(), vec!["x"]);

        let ctx = ExecutionContext::default();
        union.open(&ctx).await.unwrap();
        let mut values = Vec::new();
        while let Some(batch) = union.next().await.unwrap() {
            assert_eq!(batch.schema(), *union.schema().arrow_schema());
            values.extend(batch.column(0).as_primitive::<Float64Type>().values().iter().copied());
        }
        union.close(&ctx).await.unwrap();
        assert_eq!(values, vec![1.0, 2.0, 2.0, 2.5]);
    }

    #[test]
    fn test_union_column_count_mismatch() {
        let left = scan("x", DataType::Int64, Arc::new(Int64Array::from(vec![1])));
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int64, false),
            Field::new("b", DataType::Int64, false),
        ]));
        let right = Arc::new(MemoryScanExec::new(
            "r",
            PhysicalSchema::new(schema),
            Vec::new().into(),
            16,
        ));
        assert!(matches!(
            UnionExec::try_new(left, right),
            Err(StrataError::SchemaError(_))
        ));
    }

    #[test]
    fn test_union_incompatible_types() {
        let left = scan("x", DataType::Int64, Arc::new(Int64Array::from(vec![1])));
        let right = scan(
            "x",
            DataType::Utf8,
            Arc::new(arrow::array::StringArray::from(vec!["a"])),
        );
        assert!(matches!(
            UnionExec::try_new(left, right),
            Err(StrataError::TypeError(_))
        ));
    }
}
