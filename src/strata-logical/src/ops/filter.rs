//! Filter operator for predicate-based filtering.

use serde::{Deserialize, Serialize};

use crate::expr::LogicalExpr;

/// Filter operator - keeps rows whose predicate evaluates to true.
///
/// Rows where the predicate is false or null are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOp {
    /// Filter predicate (must evaluate to bool).
    pub predicate: LogicalExpr,
}

impl FilterOp {
    /// Create a new filter operation.
    pub const fn new(predicate: LogicalExpr) -> Self {
        Self { predicate }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter({})", self.predicate)
    }
}
