//! Union operator.

use serde::{Deserialize, Serialize};

/// Union operator - multiset union (UNION ALL).
///
/// Inputs must have the same column count; columns are matched by position
/// and widened to a common type, taking names from the left input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct UnionOp;

impl UnionOp {
    /// Create a UNION ALL (preserves duplicates).
    pub const fn all() -> Self {
        Self
    }
}

impl std::fmt::Display for UnionOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Union(ALL)")
    }
}
