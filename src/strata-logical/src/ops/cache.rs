//! Cache operator marking a pinned intermediate result.

use serde::{Deserialize, Serialize};

/// Identifier of a pinned table slot held by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheId(pub u64);

impl std::fmt::Display for CacheId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cache#{}", self.0)
    }
}

/// Cache operator.
///
/// While the slot is pinned, the first execution stores the input's rows and
/// later executions read them back instead of recomputing the input. Once
/// released the operator is a pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheOp {
    /// Slot the result is stored under.
    pub id: CacheId,
}

impl CacheOp {
    /// Create a cache marker for a slot.
    pub const fn new(id: CacheId) -> Self {
        Self { id }
    }
}

impl std::fmt::Display for CacheOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cache({})", self.id)
    }
}
