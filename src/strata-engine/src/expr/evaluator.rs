//! Expression evaluator implementation.

use std::sync::Arc;

use arrow::array::{
    new_null_array, Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray,
};
use arrow::compute::kernels::{boolean, cmp, concat_elements, numeric, zip};
use arrow::compute::{self, prep_null_mask_filter};
use arrow::datatypes::{DataType as ArrowDataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;

use common_error::{StrataError, StrataResult};
use strata_core::{DataType, Value};
use strata_logical::expr::{BinaryOp, BuiltinFunc, FuncExpr, UnaryOp};
use strata_logical::LogicalExpr;

/// Map a logical type onto its Arrow representation.
pub fn to_arrow_type(data_type: DataType) -> ArrowDataType {
    match data_type {
        DataType::Null => ArrowDataType::Null,
        DataType::Bool => ArrowDataType::Boolean,
        DataType::Int64 => ArrowDataType::Int64,
        DataType::Float64 => ArrowDataType::Float64,
        DataType::String => ArrowDataType::Utf8,
    }
}

/// Map an Arrow type onto the logical type it is evaluated as.
///
/// Narrower integer and float widths widen to 64 bits.
pub fn from_arrow_type(data_type: &ArrowDataType) -> Option<DataType> {
    match data_type {
        ArrowDataType::Null => Some(DataType::Null),
        ArrowDataType::Boolean => Some(DataType::Bool),
        ArrowDataType::Int8
        | ArrowDataType::Int16
        | ArrowDataType::Int32
        | ArrowDataType::Int64
        | ArrowDataType::UInt8
        | ArrowDataType::UInt16
        | ArrowDataType::UInt32 => Some(DataType::Int64),
        ArrowDataType::Float16 | ArrowDataType::Float32 | ArrowDataType::Float64 => {
            Some(DataType::Float64)
        }
        ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 => Some(DataType::String),
        _ => None,
    }
}

/// Common Arrow type two columns are coerced to before a binary kernel.
pub fn common_arrow_type(
    left: &ArrowDataType,
    right: &ArrowDataType,
) -> StrataResult<ArrowDataType> {
    if left == right {
        return Ok(left.clone());
    }
    let unify = |l: &ArrowDataType, r: &ArrowDataType| {
        let l = from_arrow_type(l)?;
        let r = from_arrow_type(r)?;
        l.common_supertype(&r)
    };
    unify(left, right).map(to_arrow_type).ok_or_else(|| {
        StrataError::type_error(format!("incompatible types: {left} and {right}"))
    })
}

/// Cast `array` to `target` unless it already has that type.
pub fn coerce_array(array: &ArrayRef, target: &ArrowDataType) -> StrataResult<ArrayRef> {
    if array.data_type() == target {
        Ok(Arc::clone(array))
    } else {
        Ok(compute::cast(array, target)?)
    }
}

/// Evaluates logical expressions against Arrow record batches.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExprEvaluator;

impl ExprEvaluator {
    /// Create a new expression evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluate an expression against a record batch.
    ///
    /// The result always has one value per row of `batch`.
    pub fn evaluate(&self, expr: &LogicalExpr, batch: &RecordBatch) -> StrataResult<ArrayRef> {
        match expr {
            LogicalExpr::Literal(value) => Ok(Self::eval_literal(value, batch.num_rows())),

            LogicalExpr::Column(name) => Self::eval_column(name, batch),

            LogicalExpr::QualifiedColumn { qualifier, name } => {
                Self::eval_column(&format!("{qualifier}.{name}"), batch)
            }

            LogicalExpr::Binary { left, op, right } => {
                let left = self.evaluate(left, batch)?;
                let right = self.evaluate(right, batch)?;
                Self::eval_binary(&left, *op, &right)
            }

            LogicalExpr::Unary { op, expr } => {
                let array = self.evaluate(expr, batch)?;
                Self::eval_unary(*op, &array)
            }

            LogicalExpr::Function(func) => self.eval_function(func, batch),

            LogicalExpr::Case {
                when_clauses,
                else_result,
            } => self.eval_case(when_clauses, else_result.as_deref(), batch),

            LogicalExpr::InList {
                expr,
                list,
                negated,
            } => {
                let value = self.evaluate(expr, batch)?;
                let mut matched = BooleanArray::from(vec![false; batch.num_rows()]);
                for item in list {
                    let item = self.evaluate(item, batch)?;
                    let eq = Self::eval_comparison(&value, BinaryOp::Eq, &item)?;
                    matched = boolean::or_kleene(&matched, &eq)?;
                }
                Ok(Arc::new(Self::negate_if(matched, *negated)?))
            }

            LogicalExpr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let value = self.evaluate(expr, batch)?;
                let low = self.evaluate(low, batch)?;
                let high = self.evaluate(high, batch)?;
                let above = Self::eval_comparison(&value, BinaryOp::GtEq, &low)?;
                let below = Self::eval_comparison(&value, BinaryOp::LtEq, &high)?;
                let within = boolean::and_kleene(&above, &below)?;
                Ok(Arc::new(Self::negate_if(within, *negated)?))
            }

            LogicalExpr::Cast { expr, data_type } => {
                let array = self.evaluate(expr, batch)?;
                coerce_array(&array, &to_arrow_type(*data_type))
            }

            LogicalExpr::Alias { expr, .. } => self.evaluate(expr, batch),
        }
    }

    /// Evaluate a predicate. Null results are kept as nulls; callers that
    /// filter treat them as false.
    pub fn evaluate_predicate(
        &self,
        expr: &LogicalExpr,
        batch: &RecordBatch,
    ) -> StrataResult<BooleanArray> {
        let result = self.evaluate(expr, batch)?;
        Self::to_boolean(&result, "predicate")
    }

    fn eval_literal(value: &Value, num_rows: usize) -> ArrayRef {
        match value {
            Value::Null => new_null_array(&ArrowDataType::Null, num_rows),
            Value::Bool(b) => Arc::new(BooleanArray::from(vec![*b; num_rows])),
            Value::Int64(i) => Arc::new(Int64Array::from_value(*i, num_rows)),
            Value::Float64(f) => Arc::new(Float64Array::from_value(*f, num_rows)),
            Value::String(s) => Arc::new(StringArray::from_iter_values(
                std::iter::repeat(s.as_str()).take(num_rows),
            )),
        }
    }

    fn eval_column(name: &str, batch: &RecordBatch) -> StrataResult<ArrayRef> {
        batch.column_by_name(name).cloned().ok_or_else(|| {
            StrataError::column_not_found(format!(
                "'{}' (available: {})",
                name,
                batch
                    .schema()
                    .fields()
                    .iter()
                    .map(|f| f.name().as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }

    fn to_boolean(array: &ArrayRef, context: &str) -> StrataResult<BooleanArray> {
        match array.data_type() {
            ArrowDataType::Boolean => Ok(array.as_boolean().clone()),
            ArrowDataType::Null => Ok(BooleanArray::new_null(array.len())),
            other => Err(StrataError::type_error(format!(
                "{context} must be boolean, got {other}"
            ))),
        }
    }

    fn negate_if(array: BooleanArray, negated: bool) -> StrataResult<BooleanArray> {
        if negated {
            Ok(boolean::not(&array)?)
        } else {
            Ok(array)
        }
    }

    /// Coerce both operands to their common type.
    fn coerce_pair(left: &ArrayRef, right: &ArrayRef) -> StrataResult<(ArrayRef, ArrayRef)> {
        let target = common_arrow_type(left.data_type(), right.data_type())?;
        Ok((coerce_array(left, &target)?, coerce_array(right, &target)?))
    }

    fn eval_binary(left: &ArrayRef, op: BinaryOp, right: &ArrayRef) -> StrataResult<ArrayRef> {
        if op.is_comparison() {
            return Ok(Arc::new(Self::eval_comparison(left, op, right)?));
        }

        match op {
            BinaryOp::And | BinaryOp::Or => {
                let l = Self::to_boolean(left, op.symbol())?;
                let r = Self::to_boolean(right, op.symbol())?;
                let result = if op == BinaryOp::And {
                    boolean::and_kleene(&l, &r)?
                } else {
                    boolean::or_kleene(&l, &r)?
                };
                Ok(Arc::new(result))
            }

            BinaryOp::Concat => {
                let l = coerce_array(left, &ArrowDataType::Utf8)?;
                let r = coerce_array(right, &ArrowDataType::Utf8)?;
                let result =
                    concat_elements::concat_elements_utf8(l.as_string::<i32>(), r.as_string::<i32>())?;
                Ok(Arc::new(result))
            }

            _ => {
                let (l, r) = Self::coerce_pair(left, right)?;
                if l.data_type() == &ArrowDataType::Null {
                    return Ok(new_null_array(&ArrowDataType::Null, l.len()));
                }
                if !from_arrow_type(l.data_type()).is_some_and(|t| t.is_numeric()) {
                    return Err(StrataError::type_error(format!(
                        "operator {} requires numeric operands, got {}",
                        op.symbol(),
                        l.data_type()
                    )));
                }
                let result = match op {
                    BinaryOp::Add => numeric::add(&l, &r)?,
                    BinaryOp::Subtract => numeric::sub(&l, &r)?,
                    BinaryOp::Multiply => numeric::mul(&l, &r)?,
                    BinaryOp::Divide => numeric::div(&l, &r)?,
                    BinaryOp::Modulo => numeric::rem(&l, &r)?,
                    other => {
                        return Err(StrataError::internal(format!(
                            "unexpected binary operator {other:?}"
                        )))
                    }
                };
                Ok(result)
            }
        }
    }

    fn eval_comparison(
        left: &ArrayRef,
        op: BinaryOp,
        right: &ArrayRef,
    ) -> StrataResult<BooleanArray> {
        let (l, r) = Self::coerce_pair(left, right)?;
        if l.data_type() == &ArrowDataType::Null {
            return Ok(BooleanArray::new_null(l.len()));
        }
        let result = match op {
            BinaryOp::Eq => cmp::eq(&l, &r)?,
            BinaryOp::NotEq => cmp::neq(&l, &r)?,
            BinaryOp::Lt => cmp::lt(&l, &r)?,
            BinaryOp::LtEq => cmp::lt_eq(&l, &r)?,
            BinaryOp::Gt => cmp::gt(&l, &r)?,
            BinaryOp::GtEq => cmp::gt_eq(&l, &r)?,
            other => {
                return Err(StrataError::internal(format!(
                    "{other:?} is not a comparison"
                )))
            }
        };
        Ok(result)
    }

    fn eval_unary(op: UnaryOp, array: &ArrayRef) -> StrataResult<ArrayRef> {
        let is_null_type = array.data_type() == &ArrowDataType::Null;
        match op {
            UnaryOp::Not => {
                let bools = Self::to_boolean(array, "NOT operand")?;
                Ok(Arc::new(boolean::not(&bools)?))
            }
            UnaryOp::Neg if is_null_type => Ok(Arc::clone(array)),
            UnaryOp::Neg => Ok(numeric::neg(array)?),
            UnaryOp::IsNull if is_null_type => {
                Ok(Arc::new(BooleanArray::from(vec![true; array.len()])))
            }
            UnaryOp::IsNull => Ok(Arc::new(compute::is_null(array)?)),
            UnaryOp::IsNotNull if is_null_type => {
                Ok(Arc::new(BooleanArray::from(vec![false; array.len()])))
            }
            UnaryOp::IsNotNull => Ok(Arc::new(compute::is_not_null(array)?)),
        }
    }

    fn eval_function(&self, func: &FuncExpr, batch: &RecordBatch) -> StrataResult<ArrayRef> {
        let (min_args, max_args) = func.func.arity();
        if func.args.len() < min_args || max_args.is_some_and(|max| func.args.len() > max) {
            return Err(StrataError::invalid_parameter(format!(
                "{} called with {} argument(s)",
                func.func.name(),
                func.args.len()
            )));
        }

        let args = func
            .args
            .iter()
            .map(|arg| self.evaluate(arg, batch))
            .collect::<StrataResult<Vec<_>>>()?;

        match func.func {
            BuiltinFunc::Coalesce => Self::fold_common(args, |acc, next| {
                let keep = compute::is_not_null(&acc)?;
                Ok(zip::zip(&keep, &acc, &next)?)
            }),
            BuiltinFunc::Greatest => Self::fold_common(args, |acc, next| {
                Self::pick_extreme(acc, next, BinaryOp::Gt)
            }),
            BuiltinFunc::Least => Self::fold_common(args, |acc, next| {
                Self::pick_extreme(acc, next, BinaryOp::Lt)
            }),
            BuiltinFunc::Abs => {
                let array = &args[0];
                match array.data_type() {
                    ArrowDataType::Null => Ok(Arc::clone(array)),
                    ArrowDataType::Float64 => Ok(Arc::new(
                        array.as_primitive::<Float64Type>().unary::<_, Float64Type>(f64::abs),
                    )),
                    t if from_arrow_type(t) == Some(DataType::Int64) => {
                        let ints = coerce_array(array, &ArrowDataType::Int64)?;
                        Ok(Arc::new(
                            ints.as_primitive::<Int64Type>()
                                .unary::<_, Int64Type>(i64::wrapping_abs),
                        ))
                    }
                    other => Err(StrataError::type_error(format!(
                        "abs requires a numeric argument, got {other}"
                    ))),
                }
            }
        }
    }

    /// Cast every argument to their common type, then fold left to right.
    fn fold_common<F>(args: Vec<ArrayRef>, step: F) -> StrataResult<ArrayRef>
    where
        F: Fn(ArrayRef, ArrayRef) -> StrataResult<ArrayRef>,
    {
        let target = args.iter().try_fold(ArrowDataType::Null, |acc, a| {
            common_arrow_type(&acc, a.data_type())
        })?;
        let mut args = args.iter().map(|a| coerce_array(a, &target));
        let first = args
            .next()
            .ok_or_else(|| StrataError::internal("function called without arguments"))??;
        if target == ArrowDataType::Null {
            return Ok(first);
        }
        args.try_fold(first, |acc, next| step(acc, next?))
    }

    /// Null-skipping pairwise pick: take `next` where `acc` is null, or
    /// where both are present and `next op acc` holds.
    fn pick_extreme(acc: ArrayRef, next: ArrayRef, op: BinaryOp) -> StrataResult<ArrayRef> {
        let better = Self::eval_comparison(&next, op, &acc)?;
        let next_present = compute::is_not_null(&next)?;
        let acc_missing = compute::is_null(&acc)?;
        let take_next = boolean::or_kleene(
            &acc_missing,
            &boolean::and_kleene(&next_present, &better)?,
        )?;
        Ok(zip::zip(&null_as_false(&take_next), &next, &acc)?)
    }

    fn eval_case(
        &self,
        when_clauses: &[(LogicalExpr, LogicalExpr)],
        else_result: Option<&LogicalExpr>,
        batch: &RecordBatch,
    ) -> StrataResult<ArrayRef> {
        let num_rows = batch.num_rows();

        let mut branches = Vec::with_capacity(when_clauses.len());
        for (condition, result) in when_clauses {
            let condition = self.evaluate_predicate(condition, batch)?;
            let result = self.evaluate(result, batch)?;
            branches.push((null_as_false(&condition), result));
        }
        let otherwise = match else_result {
            Some(expr) => self.evaluate(expr, batch)?,
            None => new_null_array(&ArrowDataType::Null, num_rows),
        };

        let target = branches
            .iter()
            .map(|(_, r)| r)
            .chain(std::iter::once(&otherwise))
            .try_fold(ArrowDataType::Null, |acc, r| {
                common_arrow_type(&acc, r.data_type())
            })?;

        // Earlier WHEN clauses take precedence, so fold from the last one.
        let mut result = coerce_array(&otherwise, &target)?;
        if target == ArrowDataType::Null {
            return Ok(result);
        }
        for (condition, then) in branches.iter().rev() {
            let then = coerce_array(then, &target)?;
            result = zip::zip(condition, &then, &result)?;
        }
        Ok(result)
    }
}

/// A selection mask where null slots read as false.
fn null_as_false(mask: &BooleanArray) -> BooleanArray {
    if mask.nulls().is_none() {
        mask.clone()
    } else {
        prep_null_mask_filter(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{Field, Schema};
    use strata_logical::expr::{coalesce, col, greatest, least, lit, qualified_col, when};

    fn create_test_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", ArrowDataType::Int64, false),
            Field::new("score", ArrowDataType::Float64, true),
            Field::new("msg", ArrowDataType::Int64, true),
            Field::new("src.value", ArrowDataType::Int64, false),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
                Arc::new(Float64Array::from(vec![Some(0.5), None, Some(2.5), Some(1.0)])),
                Arc::new(Int64Array::from(vec![Some(10), None, Some(30), None])),
                Arc::new(Int64Array::from(vec![7, 8, 9, 10])),
            ],
        )
        .unwrap()
    }

    fn ints(array: &ArrayRef) -> Vec<Option<i64>> {
        array.as_primitive::<Int64Type>().iter().collect()
    }

    fn floats(array: &ArrayRef) -> Vec<Option<f64>> {
        array.as_primitive::<Float64Type>().iter().collect()
    }

    #[test]
    fn test_column_and_qualified_column() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let ids = evaluator.evaluate(&col("id"), &batch).unwrap();
        assert_eq!(ints(&ids), vec![Some(1), Some(2), Some(3), Some(4)]);

        let values = evaluator
            .evaluate(&qualified_col("src", "value"), &batch)
            .unwrap();
        assert_eq!(ints(&values), vec![Some(7), Some(8), Some(9), Some(10)]);

        let missing = evaluator.evaluate(&col("nope"), &batch);
        assert!(matches!(missing, Err(StrataError::ColumnNotFound(_))));
    }

    #[test]
    fn test_mixed_arithmetic_widens_to_float() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let result = evaluator
            .evaluate(&col("id").add_expr(col("score")), &batch)
            .unwrap();
        assert_eq!(result.data_type(), &ArrowDataType::Float64);
        assert_eq!(floats(&result), vec![Some(1.5), None, Some(5.5), Some(5.0)]);

        let result = evaluator
            .evaluate(&col("id").mul_expr(lit(2i64)), &batch)
            .unwrap();
        assert_eq!(ints(&result), vec![Some(2), Some(4), Some(6), Some(8)]);
    }

    #[test]
    fn test_subtract_modulo_and_not() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let result = evaluator
            .evaluate(&qualified_col("src", "value").sub_expr(col("id")), &batch)
            .unwrap();
        assert_eq!(ints(&result), vec![Some(6); 4]);

        let result = evaluator
            .evaluate(&qualified_col("src", "value").mod_expr(lit(3i64)), &batch)
            .unwrap();
        assert_eq!(ints(&result), vec![Some(1), Some(2), Some(0), Some(1)]);

        // NOT keeps unknown comparisons unknown.
        let result = evaluator
            .evaluate(&col("msg").gt(lit(15i64)).logical_not(), &batch)
            .unwrap();
        let result: Vec<_> = result.as_boolean().iter().collect();
        assert_eq!(result, vec![Some(true), None, Some(false), None]);
    }

    #[test]
    fn test_null_literal_arithmetic_is_null() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let result = evaluator
            .evaluate(&col("id").add_expr(LogicalExpr::null()), &batch)
            .unwrap();
        assert_eq!(result.null_count(), 4);
    }

    #[test]
    fn test_comparison_and_logic() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let predicate = col("id").gt(lit(1i64)).and(col("msg").is_not_null());
        let result = evaluator.evaluate_predicate(&predicate, &batch).unwrap();
        let values: Vec<_> = result.iter().collect();
        assert_eq!(values, vec![Some(false), Some(false), Some(true), Some(false)]);

        let null_cmp = evaluator
            .evaluate_predicate(&col("msg").eq(lit(10i64)), &batch)
            .unwrap();
        assert!(null_cmp.is_null(1));
        assert!(null_cmp.value(0));
    }

    #[test]
    fn test_coalesce_skips_nulls() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let result = evaluator
            .evaluate(&coalesce(vec![col("msg"), lit(0i64)]), &batch)
            .unwrap();
        assert_eq!(ints(&result), vec![Some(10), Some(0), Some(30), Some(0)]);
    }

    #[test]
    fn test_greatest_and_least_ignore_nulls() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let result = evaluator
            .evaluate(&greatest(vec![col("msg"), col("src.value")]), &batch)
            .unwrap();
        assert_eq!(ints(&result), vec![Some(10), Some(8), Some(30), Some(10)]);

        let result = evaluator
            .evaluate(&least(vec![col("msg"), col("id")]), &batch)
            .unwrap();
        assert_eq!(ints(&result), vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_case_without_else_yields_null() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let expr = when(col("id").lt_eq(lit(2i64)), col("id").mul_expr(lit(10i64))).end();
        let result = evaluator.evaluate(&expr, &batch).unwrap();
        assert_eq!(ints(&result), vec![Some(10), Some(20), None, None]);

        let expr = when(col("msg").is_null(), lit(-1i64))
            .when(col("id").eq(lit(1i64)), lit(100i64))
            .otherwise(col("msg"));
        let result = evaluator.evaluate(&expr, &batch).unwrap();
        assert_eq!(ints(&result), vec![Some(100), Some(-1), Some(30), Some(-1)]);
    }

    #[test]
    fn test_masks_without_null_buffer() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let expr = when(col("id").eq(lit(1i64)), lit(1i64)).otherwise(lit(0i64));
        let result = evaluator.evaluate(&expr, &batch).unwrap();
        assert_eq!(ints(&result), vec![Some(1), Some(0), Some(0), Some(0)]);

        let result = evaluator
            .evaluate(&greatest(vec![col("src.value"), lit(8i64)]), &batch)
            .unwrap();
        assert_eq!(ints(&result), vec![Some(8), Some(8), Some(9), Some(10)]);

        let dense = BooleanArray::from(vec![true, false]);
        assert_eq!(null_as_false(&dense), dense);
        let sparse = BooleanArray::from(vec![Some(true), None, Some(false)]);
        assert_eq!(
            null_as_false(&sparse),
            BooleanArray::from(vec![true, false, false])
        );
    }

    #[test]
    fn test_in_list_between_and_cast() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let result = evaluator
            .evaluate_predicate(&col("id").in_list(vec![lit(2i64), lit(4i64)], false), &batch)
            .unwrap();
        assert_eq!(
            result.iter().collect::<Vec<_>>(),
            vec![Some(false), Some(true), Some(false), Some(true)]
        );

        let result = evaluator
            .evaluate_predicate(&col("id").between(lit(2i64), lit(3i64)), &batch)
            .unwrap();
        assert_eq!(
            result.iter().collect::<Vec<_>>(),
            vec![Some(false), Some(true), Some(true), Some(false)]
        );

        let result = evaluator
            .evaluate(&col("id").cast(DataType::Float64), &batch)
            .unwrap();
        assert_eq!(result.data_type(), &ArrowDataType::Float64);
    }

    #[test]
    fn test_type_errors() {
        let batch = create_test_batch();
        let evaluator = ExprEvaluator::new();

        let result = evaluator.evaluate_predicate(&col("id"), &batch);
        assert!(matches!(result, Err(StrataError::TypeError(_))));

        let result = evaluator.evaluate(&col("id").add_expr(lit("x")), &batch);
        assert!(matches!(result, Err(StrataError::TypeError(_))));
    }
}
