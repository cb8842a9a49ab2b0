//! Hash equi-join execution operator.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, UInt32Array};
use arrow::compute::{concat_batches, take};
use arrow::datatypes::{DataType as ArrowDataType, FieldRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::row::{OwnedRow, RowConverter, SortField};
use async_trait::async_trait;

use common_error::StrataResult;
use strata_logical::{JoinOp, JoinType};

use crate::executor::ExecutionContext;
use crate::expr::{coerce_array, common_arrow_type};
use crate::metrics::{ExecutionTimer, OperatorMetrics};
use crate::operators::PhysicalOperator;
use crate::physical::{OperatorCaps, PhysicalSchema};

/// Materialized right-hand side with its key index.
#[derive(Debug)]
struct BuildSide {
    batch: RecordBatch,
    converter: RowConverter,
    table: HashMap<OwnedRow, Vec<u32>>,
}

#[derive(Debug, Default)]
struct JoinState {
    build: Option<BuildSide>,
    metrics: OperatorMetrics,
}

/// Hash join over equality keys.
///
/// The right input is drained into a hash table on the first `next` call;
/// left batches are then probed one at a time, so output follows left row
/// order. Rows with a null in any key column never match.
#[derive(Debug)]
pub struct HashJoinExec {
    left: Arc<dyn PhysicalOperator>,
    right: Arc<dyn PhysicalOperator>,
    join: JoinOp,
    left_keys: Vec<usize>,
    right_keys: Vec<usize>,
    key_types: Vec<ArrowDataType>,
    /// Right columns carried into the output.
    right_output: Vec<usize>,
    schema: PhysicalSchema,
    state: tokio::sync::Mutex<JoinState>,
}

impl HashJoinExec {
    /// Create a join, resolving key columns on each side.
    pub fn try_new(
        left: Arc<dyn PhysicalOperator>,
        right: Arc<dyn PhysicalOperator>,
        join: JoinOp,
    ) -> StrataResult<Self> {
        let left_schema = left.schema();
        let right_schema = right.schema();

        let mut left_keys = Vec::with_capacity(join.on.len());
        let mut right_keys = Vec::with_capacity(join.on.len());
        let mut key_types = Vec::with_capacity(join.on.len());
        for (l, r) in &join.on {
            let li = left_schema.index_of(l)?;
            let ri = right_schema.index_of(r)?;
            key_types.push(common_arrow_type(
                left_schema.arrow_schema().field(li).data_type(),
                right_schema.arrow_schema().field(ri).data_type(),
            )?);
            left_keys.push(li);
            right_keys.push(ri);
        }

        let right_output: Vec<usize> = match join.join_type {
            JoinType::LeftSemi => Vec::new(),
            _ => (0..right_schema.num_columns())
                .filter(|i| !(join.drop_right_keys && right_keys.contains(i)))
                .collect(),
        };

        let mut fields: Vec<FieldRef> =
            left_schema.arrow_schema().fields().iter().cloned().collect();
        for &i in &right_output {
            let field = right_schema.arrow_schema().field(i);
            if join.join_type == JoinType::LeftOuter {
                fields.push(Arc::new(field.clone().with_nullable(true)));
            } else {
                fields.push(Arc::new(field.clone()));
            }
        }

        Ok(Self {
            left,
            right,
            join,
            left_keys,
            right_keys,
            key_types,
            right_output,
            schema: PhysicalSchema::try_from_fields(fields)?,
            state: tokio::sync::Mutex::new(JoinState::default()),
        })
    }

    fn key_columns(&self, batch: &RecordBatch, indices: &[usize]) -> StrataResult<Vec<ArrayRef>> {
        indices
            .iter()
            .zip(&self.key_types)
            .map(|(&i, target)| coerce_array(batch.column(i), target))
            .collect()
    }

    fn has_null_key(keys: &[ArrayRef], row: usize) -> bool {
        keys.iter().any(|k| k.is_null(row))
    }

    async fn build(&self, metrics: &mut OperatorMetrics) -> StrataResult<BuildSide> {
        let mut batches = Vec::new();
        while let Some(batch) = self.right.next().await? {
            metrics.add_rows_in(batch.num_rows());
            batches.push(batch);
        }
        let batch = concat_batches(self.right.schema().arrow_schema(), &batches)?;

        let converter = RowConverter::new(
            self.key_types
                .iter()
                .map(|t| SortField::new(t.clone()))
                .collect(),
        )?;
        let keys = self.key_columns(&batch, &self.right_keys)?;
        let rows = converter.convert_columns(&keys)?;

        let mut table: HashMap<OwnedRow, Vec<u32>> = HashMap::new();
        for row in 0..batch.num_rows() {
            if Self::has_null_key(&keys, row) {
                continue;
            }
            table
                .entry(rows.row(row).owned())
                .or_default()
                .push(row as u32);
        }
        log::trace!(
            "{}: built {} distinct keys from {} rows",
            self.display(),
            table.len(),
            batch.num_rows()
        );

        Ok(BuildSide {
            batch,
            converter,
            table,
        })
    }

    fn probe(&self, build: &BuildSide, batch: &RecordBatch) -> StrataResult<RecordBatch> {
        let keys = self.key_columns(batch, &self.left_keys)?;
        let rows = build.converter.convert_columns(&keys)?;

        let mut left_idx: Vec<u32> = Vec::new();
        let mut right_idx: Vec<Option<u32>> = Vec::new();
        for row in 0..batch.num_rows() {
            let matches = if Self::has_null_key(&keys, row) {
                None
            } else {
                build.table.get(&rows.row(row).owned())
            };
            match (self.join.join_type, matches) {
                (JoinType::LeftSemi, Some(_)) => left_idx.push(row as u32),
                (JoinType::LeftSemi, None) | (JoinType::Inner, None) => {}
                (JoinType::LeftOuter, None) => {
                    left_idx.push(row as u32);
                    right_idx.push(None);
                }
                (_, Some(hits)) => {
                    for &hit in hits {
                        left_idx.push(row as u32);
                        right_idx.push(Some(hit));
                    }
                }
            }
        }

        let left_idx = UInt32Array::from(left_idx);
        let right_idx = UInt32Array::from(right_idx);
        let mut columns = Vec::with_capacity(self.schema.num_columns());
        for column in batch.columns() {
            columns.push(take(column.as_ref(), &left_idx, None)?);
        }
        for &i in &self.right_output {
            columns.push(take(build.batch.column(i).as_ref(), &right_idx, None)?);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(left_idx.len()));
        Ok(RecordBatch::try_new_with_options(
            Arc::clone(self.schema.arrow_schema()),
            columns,
            &options,
        )?)
    }
}

#[async_trait]
impl PhysicalOperator for HashJoinExec {
    fn name(&self) -> &'static str {
        "HashJoinExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn capabilities(&self) -> OperatorCaps {
        OperatorCaps::blocking()
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![&self.left, &self.right]
    }

    async fn open(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        *self.state.lock().await = JoinState::default();
        self.left.open(ctx).await?;
        self.right.open(ctx).await
    }

    async fn next(&self) -> StrataResult<Option<RecordBatch>> {
        let mut state = self.state.lock().await;
        if state.build.is_none() {
            let timer = ExecutionTimer::start();
            let build = self.build(&mut state.metrics).await?;
            state.build = Some(build);
            state.metrics.add_time(timer.elapsed());
        }

        while let Some(batch) = self.left.next().await? {
            let timer = ExecutionTimer::start();
            let JoinState { build, metrics } = &mut *state;
            let Some(build) = build.as_ref() else {
                return Ok(None);
            };
            let joined = self.probe(build, &batch)?;
            metrics.add_rows_in(batch.num_rows());
            metrics.add_time(timer.elapsed());
            if joined.num_rows() > 0 {
                metrics.add_output(joined.num_rows());
                return Ok(Some(joined));
            }
        }
        Ok(None)
    }

    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        let metrics = std::mem::take(&mut *self.state.lock().await).metrics;
        ctx.record_metrics(&self.display(), &metrics);
        self.left.close(ctx).await?;
        self.right.close(ctx).await
    }

    fn display(&self) -> String {
        format!("HashJoinExec({})", self.join)
    }
}
