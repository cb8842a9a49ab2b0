//! Expression evaluation for physical execution.
//!
//! `ExprEvaluator` turns a `LogicalExpr` into Arrow compute calls over a
//! `RecordBatch`. Numeric operands are widened to a common type first
//! (`Int64` with `Float64` gives `Float64`; a null literal takes the other
//! side's type).
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_engine::expr::ExprEvaluator;
//! use strata_logical::expr::{col, lit};
//!
//! let expr = col("age").gt(lit(18i64));
//! let mask = ExprEvaluator::new().evaluate_predicate(&expr, &batch)?;
//! ```

mod evaluator;

pub use evaluator::{
    coerce_array, common_arrow_type, from_arrow_type, to_arrow_type, ExprEvaluator,
};
