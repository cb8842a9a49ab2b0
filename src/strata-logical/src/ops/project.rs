//! Project operator for logical planning.
//!
//! Project computes a new column set from expressions over its input.

use serde::{Deserialize, Serialize};

use crate::expr::LogicalExpr;

/// Project operator - column selection and computation.
///
/// Preserves cardinality. Output columns are named by
/// [`LogicalExpr::output_name`], so computed columns are usually aliased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectOp {
    /// Expressions to project (column refs or computed expressions).
    pub expressions: Vec<LogicalExpr>,
}

impl ProjectOp {
    /// Create a new projection with column names.
    pub fn columns(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            expressions: names
                .into_iter()
                .map(|n| LogicalExpr::column(n.into()))
                .collect(),
        }
    }

    /// Create a new projection with expressions.
    pub const fn new(expressions: Vec<LogicalExpr>) -> Self {
        Self { expressions }
    }

    /// Add an expression to the projection.
    #[must_use]
    pub fn with_expr(mut self, expr: LogicalExpr) -> Self {
        self.expressions.push(expr);
        self
    }

    /// Add a column to the projection.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>) -> Self {
        self.expressions.push(LogicalExpr::column(name.into()));
        self
    }

    /// Get the output column names.
    pub fn output_names(&self) -> Vec<String> {
        self.expressions
            .iter()
            .map(LogicalExpr::output_name)
            .collect()
    }

    /// Get all column references from projection expressions.
    pub fn column_refs(&self) -> std::collections::HashSet<String> {
        self.expressions
            .iter()
            .flat_map(LogicalExpr::column_refs)
            .collect()
    }
}

impl std::fmt::Display for ProjectOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cols = self.output_names().join(", ");
        write!(f, "Project({cols})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, lit};

    #[test]
    fn test_project_columns() {
        let project = ProjectOp::columns(["id", "rank"]);
        assert_eq!(project.expressions.len(), 2);
        assert_eq!(project.output_names(), vec!["id", "rank"]);
    }

    #[test]
    fn test_project_expressions() {
        let project = ProjectOp::columns(["id"])
            .with_expr(col("rank").mul_expr(lit(0.85)).alias("rank"))
            .with_column("deg");

        assert_eq!(project.output_names(), vec!["id", "rank", "deg"]);
        assert_eq!(project.column_refs().len(), 3);
        assert_eq!(project.to_string(), "Project(id, rank, deg)");
    }
}
