//! Logical expression trees.
//!
//! Expressions are pure, deterministic computations over the columns of a
//! single row. They are used in predicates, projections and join keys, and
//! as the inputs of aggregates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strata_core::{DataType, Value};

use super::{BinaryOp, FuncExpr, UnaryOp};

/// A logical expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalExpr {
    /// A literal constant value.
    Literal(Value),

    /// A column reference.
    Column(String),

    /// A qualified column reference, resolved against a column named
    /// `qualifier.name`.
    QualifiedColumn {
        /// Qualifier (role prefix).
        qualifier: String,
        /// Column name.
        name: String,
    },

    /// A binary operation.
    Binary {
        /// Left operand.
        left: Box<Self>,
        /// Binary operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Self>,
    },

    /// A unary operation.
    Unary {
        /// Unary operator.
        op: UnaryOp,
        /// Operand.
        expr: Box<Self>,
    },

    /// A built-in function call.
    Function(FuncExpr),

    /// A searched CASE WHEN expression. Without an ELSE branch unmatched rows are null.
    Case {
        /// WHEN clauses: (condition, result).
        when_clauses: Vec<(Self, Self)>,
        /// ELSE clause.
        else_result: Option<Box<Self>>,
    },

    /// An IN expression.
    InList {
        /// Expression to check.
        expr: Box<Self>,
        /// List of values.
        list: Vec<Self>,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// A BETWEEN expression (inclusive bounds).
    Between {
        /// Expression to check.
        expr: Box<Self>,
        /// Lower bound.
        low: Box<Self>,
        /// Upper bound.
        high: Box<Self>,
        /// Whether this is NOT BETWEEN.
        negated: bool,
    },

    /// A type conversion.
    Cast {
        /// Expression to convert.
        expr: Box<Self>,
        /// Target type.
        data_type: DataType,
    },

    /// An aliased expression.
    Alias {
        /// Original expression.
        expr: Box<Self>,
        /// Alias name.
        alias: String,
    },
}

impl LogicalExpr {
    // ========== Constructors ==========

    /// Create a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a null literal.
    pub const fn null() -> Self {
        Self::Literal(Value::Null)
    }

    /// Create a column reference.
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    /// Create a qualified column reference.
    pub fn qualified_column(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self::QualifiedColumn {
            qualifier: qualifier.into(),
            name: name.into(),
        }
    }

    /// Create a binary expression.
    pub fn binary(left: Self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression.
    pub fn unary(op: UnaryOp, expr: Self) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    /// Create a function call expression.
    pub const fn function(func: FuncExpr) -> Self {
        Self::Function(func)
    }

    /// Create an aliased expression.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        Self::Alias {
            expr: Box::new(self.unalias()),
            alias: alias.into(),
        }
    }

    /// Strip any top-level aliases.
    #[must_use]
    pub fn unalias(self) -> Self {
        match self {
            Self::Alias { expr, .. } => expr.unalias(),
            other => other,
        }
    }

    /// Create a CAST expression.
    #[must_use]
    pub fn cast(self, data_type: DataType) -> Self {
        Self::Cast {
            expr: Box::new(self),
            data_type,
        }
    }

    // ========== Convenience builders ==========

    /// Create an AND expression.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::And, other)
    }

    /// Create an OR expression.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Or, other)
    }

    /// Create a NOT expression.
    #[must_use]
    pub fn logical_not(self) -> Self {
        Self::unary(UnaryOp::Not, self)
    }

    /// Create an equality expression.
    #[must_use]
    pub fn eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    /// Create an inequality expression.
    #[must_use]
    pub fn not_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::NotEq, other)
    }

    /// Create a less than expression.
    #[must_use]
    pub fn lt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Lt, other)
    }

    /// Create a less than or equal expression.
    #[must_use]
    pub fn lt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::LtEq, other)
    }

    /// Create a greater than expression.
    #[must_use]
    pub fn gt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Gt, other)
    }

    /// Create a greater than or equal expression.
    #[must_use]
    pub fn gt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::GtEq, other)
    }

    /// Create an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::unary(UnaryOp::IsNull, self)
    }

    /// Create an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::unary(UnaryOp::IsNotNull, self)
    }

    /// Create a negation expression.
    #[must_use]
    pub fn neg(self) -> Self {
        Self::unary(UnaryOp::Neg, self)
    }

    /// Create an addition expression.
    #[must_use]
    pub fn add_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Add, other)
    }

    /// Create a subtraction expression.
    #[must_use]
    pub fn sub_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Subtract, other)
    }

    /// Create a multiplication expression.
    #[must_use]
    pub fn mul_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Multiply, other)
    }

    /// Create a division expression.
    #[must_use]
    pub fn div_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Divide, other)
    }

    /// Create a modulo expression.
    #[must_use]
    pub fn mod_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Modulo, other)
    }

    /// Create an IN list expression.
    #[must_use]
    pub fn in_list(self, list: Vec<Self>, negated: bool) -> Self {
        Self::InList {
            expr: Box::new(self),
            list,
            negated,
        }
    }

    /// Create a BETWEEN expression.
    #[must_use]
    pub fn between(self, low: Self, high: Self) -> Self {
        Self::Between {
            expr: Box::new(self),
            low: Box::new(low),
            high: Box::new(high),
            negated: false,
        }
    }

    // ========== Analysis methods ==========

    /// Get all column references in this expression, qualified references
    /// rendered as `qualifier.name`.
    pub fn column_refs(&self) -> HashSet<String> {
        let mut refs = HashSet::new();
        self.collect_column_refs(&mut refs);
        refs
    }

    fn collect_column_refs(&self, refs: &mut HashSet<String>) {
        match self {
            Self::Column(name) => {
                refs.insert(name.clone());
            }
            Self::QualifiedColumn { qualifier, name } => {
                refs.insert(format!("{qualifier}.{name}"));
            }
            Self::Binary { left, right, .. } => {
                left.collect_column_refs(refs);
                right.collect_column_refs(refs);
            }
            Self::Unary { expr, .. } | Self::Alias { expr, .. } | Self::Cast { expr, .. } => {
                expr.collect_column_refs(refs);
            }
            Self::Function(func) => {
                for arg in &func.args {
                    arg.collect_column_refs(refs);
                }
            }
            Self::Case {
                when_clauses,
                else_result,
            } => {
                for (cond, result) in when_clauses {
                    cond.collect_column_refs(refs);
                    result.collect_column_refs(refs);
                }
                if let Some(else_expr) = else_result {
                    else_expr.collect_column_refs(refs);
                }
            }
            Self::InList { expr, list, .. } => {
                expr.collect_column_refs(refs);
                for item in list {
                    item.collect_column_refs(refs);
                }
            }
            Self::Between {
                expr, low, high, ..
            } => {
                expr.collect_column_refs(refs);
                low.collect_column_refs(refs);
                high.collect_column_refs(refs);
            }
            Self::Literal(_) => {}
        }
    }

    /// Get the output column name for this expression.
    pub fn output_name(&self) -> String {
        match self {
            Self::Column(name) => name.clone(),
            Self::QualifiedColumn { qualifier, name } => format!("{qualifier}.{name}"),
            Self::Alias { alias, .. } => alias.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Column(name) => write!(f, "{name}"),
            Self::QualifiedColumn { qualifier, name } => write!(f, "{qualifier}.{name}"),
            Self::Binary { left, op, right } => write!(f, "({left} {op} {right})"),
            Self::Unary { op, expr } => {
                if matches!(op, UnaryOp::Not | UnaryOp::Neg) {
                    write!(f, "{op} {expr}")
                } else {
                    write!(f, "{expr} {op}")
                }
            }
            Self::Function(func) => write!(f, "{func}"),
            Self::Case {
                when_clauses,
                else_result,
            } => {
                write!(f, "CASE")?;
                for (cond, result) in when_clauses {
                    write!(f, " WHEN {cond} THEN {result}")?;
                }
                if let Some(else_expr) = else_result {
                    write!(f, " ELSE {else_expr}")?;
                }
                write!(f, " END")
            }
            Self::InList {
                expr,
                list,
                negated,
            } => {
                let not = if *negated { " NOT" } else { "" };
                let items = list
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{expr}{not} IN ({items})")
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "{expr}{not} BETWEEN {low} AND {high}")
            }
            Self::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Self::Alias { expr, alias } => write!(f, "{expr} AS {alias}"),
        }
    }
}

/// Builder for searched CASE expressions, started with [`when`](super::when).
#[derive(Debug, Clone)]
pub struct CaseBuilder {
    when_clauses: Vec<(LogicalExpr, LogicalExpr)>,
}

impl CaseBuilder {
    pub(crate) fn new(condition: LogicalExpr, result: LogicalExpr) -> Self {
        Self {
            when_clauses: vec![(condition, result)],
        }
    }

    /// Add another WHEN branch.
    #[must_use]
    pub fn when(mut self, condition: LogicalExpr, result: LogicalExpr) -> Self {
        self.when_clauses.push((condition, result));
        self
    }

    /// Finish with an ELSE branch.
    pub fn otherwise(self, result: LogicalExpr) -> LogicalExpr {
        LogicalExpr::Case {
            when_clauses: self.when_clauses,
            else_result: Some(Box::new(result)),
        }
    }

    /// Finish without an ELSE branch; unmatched rows evaluate to null.
    pub fn end(self) -> LogicalExpr {
        LogicalExpr::Case {
            when_clauses: self.when_clauses,
            else_result: None,
        }
    }
}
