//! Logical operators for query plans.
//!
//! Operators reference their inputs through `Arc`, so a lineage that reads
//! the same intermediate table several times is a DAG rather than a copy
//! per use.

mod aggregate;
mod cache;
mod filter;
mod join;
mod project;
mod rename;
mod scan;
mod union;

use std::sync::Arc;

pub use aggregate::AggregateOp;
pub use cache::{CacheId, CacheOp};
pub use filter::FilterOp;
pub use join::{JoinOp, JoinType};
pub use project::ProjectOp;
pub use rename::RenameOp;
pub use scan::{CheckpointId, ScanOp, ScanSource};
pub use union::UnionOp;

use serde::{Deserialize, Serialize};

/// Logical operator in a query plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalOp {
    /// Read a registered table or checkpoint.
    Scan(ScanOp),
    /// Filter rows based on a predicate.
    Filter {
        /// Input operator.
        input: Arc<LogicalOp>,
        /// Filter definition.
        filter: FilterOp,
    },
    /// Project columns.
    Project {
        /// Input operator.
        input: Arc<LogicalOp>,
        /// Projection definition.
        project: ProjectOp,
    },
    /// Rename columns.
    Rename {
        /// Input operator.
        input: Arc<LogicalOp>,
        /// Rename definition.
        rename: RenameOp,
    },
    /// Equi-join two inputs.
    Join {
        /// Left input.
        left: Arc<LogicalOp>,
        /// Right input.
        right: Arc<LogicalOp>,
        /// Join definition.
        join: JoinOp,
    },
    /// Group and aggregate rows.
    Aggregate {
        /// Input operator.
        input: Arc<LogicalOp>,
        /// Aggregate definition.
        aggregate: AggregateOp,
    },
    /// Multiset union of two inputs.
    Union {
        /// Left input.
        left: Arc<LogicalOp>,
        /// Right input.
        right: Arc<LogicalOp>,
        /// Union definition.
        union: UnionOp,
    },
    /// Pinned intermediate result.
    Cache {
        /// Input operator.
        input: Arc<LogicalOp>,
        /// Cache slot.
        cache: CacheOp,
    },
}

impl LogicalOp {
    /// Create a scan.
    pub const fn scan(scan: ScanOp) -> Self {
        Self::Scan(scan)
    }

    /// Create a filter over `input`.
    pub fn filter(input: impl Into<Arc<Self>>, filter: FilterOp) -> Self {
        Self::Filter {
            input: input.into(),
            filter,
        }
    }

    /// Create a projection over `input`.
    pub fn project(input: impl Into<Arc<Self>>, project: ProjectOp) -> Self {
        Self::Project {
            input: input.into(),
            project,
        }
    }

    /// Create a rename over `input`.
    pub fn rename(input: impl Into<Arc<Self>>, rename: RenameOp) -> Self {
        Self::Rename {
            input: input.into(),
            rename,
        }
    }

    /// Create a join.
    pub fn join(left: impl Into<Arc<Self>>, right: impl Into<Arc<Self>>, join: JoinOp) -> Self {
        Self::Join {
            left: left.into(),
            right: right.into(),
            join,
        }
    }

    /// Create an aggregate over `input`.
    pub fn aggregate(input: impl Into<Arc<Self>>, aggregate: AggregateOp) -> Self {
        Self::Aggregate {
            input: input.into(),
            aggregate,
        }
    }

    /// Create a union.
    pub fn union(left: impl Into<Arc<Self>>, right: impl Into<Arc<Self>>, union: UnionOp) -> Self {
        Self::Union {
            left: left.into(),
            right: right.into(),
            union,
        }
    }

    /// Create a cache marker over `input`.
    pub fn cache(input: impl Into<Arc<Self>>, cache: CacheOp) -> Self {
        Self::Cache {
            input: input.into(),
            cache,
        }
    }

    /// Get the input operators.
    pub fn inputs(&self) -> Vec<&Arc<Self>> {
        match self {
            Self::Scan(_) => vec![],
            Self::Filter { input, .. }
            | Self::Project { input, .. }
            | Self::Rename { input, .. }
            | Self::Aggregate { input, .. }
            | Self::Cache { input, .. } => vec![input],
            Self::Join { left, right, .. } | Self::Union { left, right, .. } => {
                vec![left, right]
            }
        }
    }

    /// Number of inputs.
    pub fn input_count(&self) -> usize {
        self.inputs().len()
    }

    /// Get the name of this operator.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Scan(_) => "Scan",
            Self::Filter { .. } => "Filter",
            Self::Project { .. } => "Project",
            Self::Rename { .. } => "Rename",
            Self::Join { .. } => "Join",
            Self::Aggregate { .. } => "Aggregate",
            Self::Union { .. } => "Union",
            Self::Cache { .. } => "Cache",
        }
    }

    /// Explain this operator and its inputs as an indented tree.
    pub fn explain(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let mut result = format!("{prefix}{self}");

        for input in self.inputs() {
            result.push('\n');
            result.push_str(&input.explain(indent + 1));
        }

        result
    }
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan(scan) => write!(f, "{scan}"),
            Self::Filter { filter, .. } => write!(f, "{filter}"),
            Self::Project { project, .. } => write!(f, "{project}"),
            Self::Rename { rename, .. } => write!(f, "{rename}"),
            Self::Join { join, .. } => write!(f, "{join}"),
            Self::Aggregate { aggregate, .. } => write!(f, "{aggregate}"),
            Self::Union { union, .. } => write!(f, "{union}"),
            Self::Cache { cache, .. } => write!(f, "{cache}"),
        }
    }
}
