//! Scan operator: the leaves of every plan.

use serde::{Deserialize, Serialize};

/// Identifier of a lineage-truncating checkpoint held by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckpointId(pub u64);

impl std::fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "checkpoint#{}", self.0)
    }
}

/// Where a scan reads its rows from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanSource {
    /// A table registered with the engine catalog.
    Table(String),
    /// A materialized checkpoint.
    Checkpoint(CheckpointId),
}

/// Scan operator - entry point of all plans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanOp {
    /// Source of the rows.
    pub source: ScanSource,
}

impl ScanOp {
    /// Scan a registered table.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            source: ScanSource::Table(name.into()),
        }
    }

    /// Scan a checkpoint.
    pub const fn checkpoint(id: CheckpointId) -> Self {
        Self {
            source: ScanSource::Checkpoint(id),
        }
    }

    /// The checkpoint this scan reads, if any.
    pub const fn checkpoint_id(&self) -> Option<CheckpointId> {
        match self.source {
            ScanSource::Checkpoint(id) => Some(id),
            ScanSource::Table(_) => None,
        }
    }
}

impl std::fmt::Display for ScanOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            ScanSource::Table(name) => write!(f, "Scan(table={name})"),
            ScanSource::Checkpoint(id) => write!(f, "Scan({id})"),
        }
    }
}
