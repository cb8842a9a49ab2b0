//! Aggregate functions for logical expressions.

use serde::{Deserialize, Serialize};
use strata_core::DataType;

use super::LogicalExpr;

/// Aggregate function types.
///
/// Aggregate functions reduce a group of rows to a single value. All of them
/// ignore null inputs; a group whose inputs are all null aggregates to null
/// (COUNT aggregates to zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggFunc {
    /// Count non-null values
    Count,
    /// Sum of values
    Sum,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Average value
    Avg,
    /// First non-null value in input order
    First,
    /// Last non-null value in input order
    Last,
}

impl AggFunc {
    /// Get the result type of this aggregate function given the input type.
    ///
    /// Returns `None` if the operation is not valid for the given type.
    pub fn result_type(&self, input: &DataType) -> Option<DataType> {
        match self {
            Self::Count => Some(DataType::Int64),

            Self::Sum => match input {
                DataType::Int64 | DataType::Float64 | DataType::Null => Some(*input),
                _ => None,
            },

            Self::Min | Self::Max => match input {
                DataType::Int64 | DataType::Float64 | DataType::String | DataType::Null => {
                    Some(*input)
                }
                _ => None,
            },

            Self::Avg => match input {
                DataType::Int64 | DataType::Float64 | DataType::Null => Some(DataType::Float64),
                _ => None,
            },

            Self::First | Self::Last => Some(*input),
        }
    }

    /// Get the function name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Avg => "AVG",
            Self::First => "FIRST",
            Self::Last => "LAST",
        }
    }
}

impl std::fmt::Display for AggFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An aggregate expression with function and input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggExpr {
    /// The aggregate function.
    pub func: AggFunc,
    /// The input expression.
    pub expr: Box<LogicalExpr>,
    /// Optional alias for the result column.
    pub alias: Option<String>,
}

impl AggExpr {
    /// Create a new aggregate expression.
    pub fn new(func: AggFunc, expr: LogicalExpr) -> Self {
        Self {
            func,
            expr: Box::new(expr),
            alias: None,
        }
    }

    /// Set alias for the result.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Get the result type given the input expression type.
    pub fn result_type(&self, input_type: &DataType) -> Option<DataType> {
        self.func.result_type(input_type)
    }

    /// Get the effective output name.
    pub fn output_name(&self) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| format!("{}({})", self.func.name(), self.expr))
    }
}

impl std::fmt::Display for AggExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.func, self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

// Helper functions for creating common aggregates
impl AggExpr {
    /// Create COUNT(*), counting every row.
    pub fn count_star() -> Self {
        Self::new(AggFunc::Count, LogicalExpr::literal(1i64))
    }

    /// Create COUNT(expr).
    pub fn count(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Count, expr)
    }

    /// Create SUM(expr).
    pub fn sum(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Sum, expr)
    }

    /// Create MIN(expr).
    pub fn min(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Min, expr)
    }

    /// Create MAX(expr).
    pub fn max(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Max, expr)
    }

    /// Create AVG(expr).
    pub fn avg(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Avg, expr)
    }

    /// Create FIRST(expr).
    pub fn first(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::First, expr)
    }

    /// Create LAST(expr).
    pub fn last(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Last, expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_type() {
        assert_eq!(AggFunc::Count.result_type(&DataType::String), Some(DataType::Int64));
    }

    #[test]
    fn test_sum_type() {
        assert_eq!(AggFunc::Sum.result_type(&DataType::Int64), Some(DataType::Int64));
        assert_eq!(AggFunc::Sum.result_type(&DataType::Float64), Some(DataType::Float64));
        assert_eq!(AggFunc::Sum.result_type(&DataType::String), None);
    }

    #[test]
    fn test_avg_type() {
        assert_eq!(AggFunc::Avg.result_type(&DataType::Int64), Some(DataType::Float64));
    }

    #[test]
    fn test_agg_expr_display() {
        let agg = AggExpr::sum(LogicalExpr::column("amount"));
        assert_eq!(agg.to_string(), "SUM(amount)");
        assert_eq!(agg.output_name(), "SUM(amount)");

        let aliased = AggExpr::max(LogicalExpr::column("msg")).with_alias("best");
        assert_eq!(aliased.to_string(), "MAX(msg) AS best");
        assert_eq!(aliased.output_name(), "best");
    }
}
