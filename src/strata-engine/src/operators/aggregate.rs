//! Hash aggregate execution operator.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{
    new_null_array, Array, ArrayRef, AsArray, Float64Array, Int64Array, UInt32Array,
};
use arrow::compute::{concat_batches, take};
use arrow::datatypes::{DataType as ArrowDataType, Field, Float64Type, Int64Type};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::row::{OwnedRow, RowConverter, SortField};
use async_trait::async_trait;

use common_error::{StrataError, StrataResult};
use strata_logical::{AggExpr, AggFunc, AggregateOp};

use crate::executor::ExecutionContext;
use crate::expr::{coerce_array, from_arrow_type, to_arrow_type, ExprEvaluator};
use crate::metrics::{ExecutionTimer, OperatorMetrics};
use crate::operators::PhysicalOperator;
use crate::physical::{OperatorCaps, PhysicalSchema};

/// Row indices of each group, in order of first appearance.
type Groups = Vec<Vec<u32>>;

#[derive(Debug, Default)]
enum AggregateState {
    #[default]
    Accumulating,
    Exhausted,
}

/// Hash aggregate execution operator.
///
/// Drains its input, groups rows by the key expressions and reduces every
/// group with the aggregate expressions. Groups are emitted in order of
/// first appearance. Without keys the whole input forms one group, so an
/// empty input still produces one row.
#[derive(Debug)]
pub struct HashAggregateExec {
    input: Arc<dyn PhysicalOperator>,
    aggregate: AggregateOp,
    /// Arrow type each aggregate input is coerced to before reduction.
    input_types: Vec<ArrowDataType>,
    schema: PhysicalSchema,
    state: tokio::sync::Mutex<AggregateState>,
    metrics: tokio::sync::Mutex<OperatorMetrics>,
}

impl HashAggregateExec {
    /// Create an aggregate, checking every function against its input type.
    pub fn try_new(input: Arc<dyn PhysicalOperator>, aggregate: AggregateOp) -> StrataResult<Self> {
        let empty = RecordBatch::new_empty(Arc::clone(input.schema().arrow_schema()));
        let evaluator = ExprEvaluator::new();

        let mut fields = Vec::with_capacity(aggregate.keys.len() + aggregate.aggs.len());
        for key in &aggregate.keys {
            let array = evaluator.evaluate(key, &empty)?;
            fields.push(Arc::new(Field::new(
                key.output_name(),
                array.data_type().clone(),
                true,
            )));
        }

        let mut input_types = Vec::with_capacity(aggregate.aggs.len());
        for agg in &aggregate.aggs {
            let array = evaluator.evaluate(&agg.expr, &empty)?;
            let input_type = from_arrow_type(array.data_type())
                .and_then(|t| agg.result_type(&t).map(|r| (t, r)));
            let Some((input_type, result_type)) = input_type else {
                return Err(StrataError::type_error(format!(
                    "{} cannot aggregate values of type {}",
                    agg.func,
                    array.data_type()
                )));
            };
            input_types.push(to_arrow_type(input_type));
            fields.push(Arc::new(Field::new(
                agg.output_name(),
                to_arrow_type(result_type),
                true,
            )));
        }

        Ok(Self {
            input,
            aggregate,
            input_types,
            schema: PhysicalSchema::try_from_fields(fields)?,
            state: tokio::sync::Mutex::new(AggregateState::Accumulating),
            metrics: tokio::sync::Mutex::new(OperatorMetrics::default()),
        })
    }

    fn group(&self, keys: &[ArrayRef], num_rows: usize) -> StrataResult<Groups> {
        if keys.is_empty() {
            return Ok(vec![(0..num_rows as u32).collect()]);
        }
        let converter = RowConverter::new(
            keys.iter()
                .map(|k| SortField::new(k.data_type().clone()))
                .collect(),
        )?;
        let rows = converter.convert_columns(keys)?;

        let mut ids: HashMap<OwnedRow, usize> = HashMap::new();
        let mut groups: Groups = Vec::new();
        for row in 0..num_rows {
            let next_id = groups.len();
            let id = *ids.entry(rows.row(row).owned()).or_insert(next_id);
            if id == next_id {
                groups.push(Vec::new());
            }
            groups[id].push(row as u32);
        }
        Ok(groups)
    }

    fn aggregate_batch(&self, batch: &RecordBatch) -> StrataResult<RecordBatch> {
        let evaluator = ExprEvaluator::new();
        let keys = self
            .aggregate
            .keys
            .iter()
            .map(|k| evaluator.evaluate(k, batch))
            .collect::<StrataResult<Vec<_>>>()?;
        let groups = self.group(&keys, batch.num_rows())?;

        let mut columns = Vec::with_capacity(self.schema.num_columns());
        let firsts = UInt32Array::from_iter(groups.iter().map(|rows| rows.first().copied()));
        for key in &keys {
            columns.push(take(key.as_ref(), &firsts, None)?);
        }
        for (agg, input_type) in self.aggregate.aggs.iter().zip(&self.input_types) {
            let values = coerce_array(&evaluator.evaluate(&agg.expr, batch)?, input_type)?;
            columns.push(reduce(agg, &values, &groups)?);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(groups.len()));
        Ok(RecordBatch::try_new_with_options(
            Arc::clone(self.schema.arrow_schema()),
            columns,
            &options,
        )?)
    }
}

/// Reduce every group of `values` with one aggregate function.
fn reduce(agg: &AggExpr, values: &ArrayRef, groups: &Groups) -> StrataResult<ArrayRef> {
    let valid = |rows: &Vec<u32>| {
        rows.iter()
            .copied()
            .filter(|&r| values.is_valid(r as usize))
            .collect::<Vec<_>>()
    };

    match agg.func {
        AggFunc::Count => Ok(Arc::new(Int64Array::from_iter_values(
            groups.iter().map(|rows| valid(rows).len() as i64),
        ))),
        AggFunc::First => pick(values, groups.iter().map(|rows| valid(rows).first().copied())),
        AggFunc::Last => pick(values, groups.iter().map(|rows| valid(rows).last().copied())),
        AggFunc::Min | AggFunc::Max => {
            let want = if agg.func == AggFunc::Min {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            let picks = groups
                .iter()
                .map(|rows| {
                    let mut best: Option<u32> = None;
                    for row in valid(rows) {
                        match best {
                            Some(b) if compare(values, row, b)? != want => {}
                            _ => best = Some(row),
                        }
                    }
                    Ok(best)
                })
                .collect::<StrataResult<Vec<_>>>()?;
            pick(values, picks.into_iter())
        }
        AggFunc::Sum => match values.data_type() {
            ArrowDataType::Int64 => {
                let ints = values.as_primitive::<Int64Type>();
                let sums = groups
                    .iter()
                    .map(|rows| {
                        let rows = valid(rows);
                        if rows.is_empty() {
                            return Ok(None);
                        }
                        rows.iter()
                            .try_fold(0i64, |acc, &r| acc.checked_add(ints.value(r as usize)))
                            .map(Some)
                            .ok_or_else(|| {
                                StrataError::execution(format!("integer overflow in {agg}"))
                            })
                    })
                    .collect::<StrataResult<Vec<_>>>()?;
                Ok(Arc::new(Int64Array::from(sums)))
            }
            ArrowDataType::Float64 => {
                let floats = values.as_primitive::<Float64Type>();
                Ok(Arc::new(Float64Array::from_iter(groups.iter().map(|rows| {
                    let rows = valid(rows);
                    (!rows.is_empty())
                        .then(|| rows.iter().map(|&r| floats.value(r as usize)).sum::<f64>())
                }))))
            }
            other => Ok(new_null_array(other, groups.len())),
        },
        AggFunc::Avg => {
            let as_float = coerce_array(values, &ArrowDataType::Float64)?;
            let floats = as_float.as_primitive::<Float64Type>();
            Ok(Arc::new(Float64Array::from_iter(groups.iter().map(|rows| {
                let rows = valid(rows);
                (!rows.is_empty()).then(|| {
                    rows.iter().map(|&r| floats.value(r as usize)).sum::<f64>() / rows.len() as f64
                })
            }))))
        }
    }
}

/// Gather one value per group; `None` yields null.
fn pick(values: &ArrayRef, rows: impl Iterator<Item = Option<u32>>) -> StrataResult<ArrayRef> {
    let indices = UInt32Array::from_iter(rows);
    Ok(take(values.as_ref(), &indices, None)?)
}

fn compare(values: &ArrayRef, a: u32, b: u32) -> StrataResult<Ordering> {
    let (a, b) = (a as usize, b as usize);
    match values.data_type() {
        ArrowDataType::Int64 => {
            let ints = values.as_primitive::<Int64Type>();
            Ok(ints.value(a).cmp(&ints.value(b)))
        }
        ArrowDataType::Float64 => {
            let floats = values.as_primitive::<Float64Type>();
            Ok(floats.value(a).total_cmp(&floats.value(b)))
        }
        ArrowDataType::Utf8 => {
            let strings = values.as_string::<i32>();
            Ok(strings.value(a).cmp(strings.value(b)))
        }
        other => Err(StrataError::type_error(format!(
            "cannot order values of type {other}"
        ))),
    }
}

#[async_trait]
impl PhysicalOperator for HashAggregateExec {
    fn name(&self) -> &'static str {
        "HashAggregateExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn capabilities(&self) -> OperatorCaps {
        OperatorCaps::blocking()
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![&self.input]
    }

    async fn open(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        *self.state.lock().await = AggregateState::Accumulating;
        self.input.open(ctx).await
    }

    async fn next(&self) -> StrataResult<Option<RecordBatch>> {
        let mut state = self.state.lock().await;
        if matches!(*state, AggregateState::Exhausted) {
            return Ok(None);
        }

        let mut batches = Vec::new();
        while let Some(batch) = self.input.next().await? {
            batches.push(batch);
        }
        *state = AggregateState::Exhausted;

        let timer = ExecutionTimer::start();
        let input = concat_batches(self.input.schema().arrow_schema(), &batches)?;
        let result = self.aggregate_batch(&input)?;

        let mut metrics = self.metrics.lock().await;
        metrics.add_rows_in(input.num_rows());
        metrics.add_time(timer.elapsed());
        if result.num_rows() == 0 {
            return Ok(None);
        }
        metrics.add_output(result.num_rows());
        Ok(Some(result))
    }

    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        *self.state.lock().await = AggregateState::Exhausted;
        let metrics = std::mem::take(&mut *self.metrics.lock().await);
        ctx.record_metrics(&self.display(), &metrics);
        self.input.close(ctx).await
    }

    fn display(&self) -> String {
        format!("HashAggregateExec({})", self.aggregate)
    }
}
