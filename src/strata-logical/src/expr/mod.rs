//! Expression trees for logical plans.

mod agg;
mod binary;
mod expression;
mod func;
mod unary;

pub use agg::{AggExpr, AggFunc};
pub use binary::BinaryOp;
pub use expression::{CaseBuilder, LogicalExpr};
pub use func::{BuiltinFunc, FuncExpr};
pub use unary::UnaryOp;

use strata_core::Value;

/// Create a column reference.
pub fn col(name: impl Into<String>) -> LogicalExpr {
    LogicalExpr::column(name)
}

/// Create a qualified column reference (`qualifier.name`).
pub fn qualified_col(qualifier: impl Into<String>, name: impl Into<String>) -> LogicalExpr {
    LogicalExpr::qualified_column(qualifier, name)
}

/// Create a literal.
pub fn lit(value: impl Into<Value>) -> LogicalExpr {
    LogicalExpr::literal(value)
}

/// Start a searched CASE expression.
pub fn when(condition: LogicalExpr, result: LogicalExpr) -> CaseBuilder {
    CaseBuilder::new(condition, result)
}

/// First non-null argument.
pub fn coalesce(args: Vec<LogicalExpr>) -> LogicalExpr {
    LogicalExpr::function(FuncExpr::new(BuiltinFunc::Coalesce, args))
}

/// Largest non-null argument.
pub fn greatest(args: Vec<LogicalExpr>) -> LogicalExpr {
    LogicalExpr::function(FuncExpr::new(BuiltinFunc::Greatest, args))
}

/// Smallest non-null argument.
pub fn least(args: Vec<LogicalExpr>) -> LogicalExpr {
    LogicalExpr::function(FuncExpr::new(BuiltinFunc::Least, args))
}

/// Absolute value.
pub fn abs(expr: LogicalExpr) -> LogicalExpr {
    LogicalExpr::function(FuncExpr::new(BuiltinFunc::Abs, vec![expr]))
}

/// SUM aggregate.
pub fn sum(expr: LogicalExpr) -> AggExpr {
    AggExpr::sum(expr)
}

/// MIN aggregate.
pub fn min(expr: LogicalExpr) -> AggExpr {
    AggExpr::min(expr)
}

/// MAX aggregate.
pub fn max(expr: LogicalExpr) -> AggExpr {
    AggExpr::max(expr)
}

/// AVG aggregate.
pub fn avg(expr: LogicalExpr) -> AggExpr {
    AggExpr::avg(expr)
}

/// COUNT aggregate over non-null values.
pub fn count(expr: LogicalExpr) -> AggExpr {
    AggExpr::count(expr)
}

/// COUNT(*) aggregate.
pub fn count_star() -> AggExpr {
    AggExpr::count_star()
}
