//! Logical plan structure.
//!
//! A `LogicalPlan` is a lazily evaluated DAG of logical operators. Nothing
//! runs until an engine collects or counts it, so the plan doubles as the
//! lineage of the table it describes: everything needed to recompute it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ops::{
    AggregateOp, CacheId, CacheOp, CheckpointId, FilterOp, JoinOp, LogicalOp, ProjectOp, RenameOp,
    ScanOp, UnionOp,
};

/// A logical plan rooted at one operator.
///
/// Cloning is cheap: operators are shared, not copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalPlan {
    root: Arc<LogicalOp>,
}

impl LogicalPlan {
    /// Create a new logical plan with the given root operator.
    pub fn new(root: impl Into<Arc<LogicalOp>>) -> Self {
        Self { root: root.into() }
    }

    /// Get a reference to the root operator.
    pub fn root(&self) -> &LogicalOp {
        &self.root
    }

    /// Get the shared root operator.
    pub fn root_arc(&self) -> &Arc<LogicalOp> {
        &self.root
    }

    /// Generate a tree-formatted explanation of the plan.
    pub fn explain(&self) -> String {
        let mut output = String::new();
        output.push_str("Logical Plan:\n");
        output.push_str(&self.root.explain(1));
        output
    }

    /// Count the distinct operators in the plan. Shared operators count once.
    pub fn operator_count(&self) -> usize {
        fn visit(op: &Arc<LogicalOp>, seen: &mut HashSet<*const LogicalOp>) {
            if seen.insert(Arc::as_ptr(op)) {
                for input in op.inputs() {
                    visit(input, seen);
                }
            }
        }
        let mut seen = HashSet::new();
        visit(&self.root, &mut seen);
        seen.len()
    }

    /// Length of the longest operator chain from the root to a leaf.
    ///
    /// This is the lineage depth: the number of dependent steps needed to
    /// recompute the plan from its sources.
    pub fn depth(&self) -> usize {
        fn max_depth(op: &Arc<LogicalOp>, memo: &mut HashMap<*const LogicalOp, usize>) -> usize {
            if let Some(&d) = memo.get(&Arc::as_ptr(op)) {
                return d;
            }
            let d = 1 + op
                .inputs()
                .into_iter()
                .map(|i| max_depth(i, memo))
                .max()
                .unwrap_or(0);
            memo.insert(Arc::as_ptr(op), d);
            d
        }
        max_depth(&self.root, &mut HashMap::new())
    }

    /// Check if the plan contains an operator matching `predicate`.
    pub fn contains_op<F>(&self, predicate: F) -> bool
    where
        F: Fn(&LogicalOp) -> bool,
    {
        fn check<F>(op: &Arc<LogicalOp>, predicate: &F, seen: &mut HashSet<*const LogicalOp>) -> bool
        where
            F: Fn(&LogicalOp) -> bool,
        {
            if !seen.insert(Arc::as_ptr(op)) {
                return false;
            }
            if predicate(op) {
                return true;
            }
            op.inputs().into_iter().any(|i| check(i, predicate, seen))
        }
        check(&self.root, &predicate, &mut HashSet::new())
    }

    /// The cache slot this plan's root pins, if any.
    pub fn cache_id(&self) -> Option<CacheId> {
        match self.root() {
            LogicalOp::Cache { cache, .. } => Some(cache.id),
            _ => None,
        }
    }

    /// The checkpoint this plan reads directly, looking through cache markers.
    pub fn checkpoint_id(&self) -> Option<CheckpointId> {
        let mut op = self.root();
        loop {
            match op {
                LogicalOp::Scan(scan) => return scan.checkpoint_id(),
                LogicalOp::Cache { input, .. } => op = &**input,
                _ => return None,
            }
        }
    }
}

impl std::fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl From<LogicalOp> for LogicalPlan {
    fn from(op: LogicalOp) -> Self {
        Self::new(op)
    }
}

/// Builder for constructing logical plans fluently.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    op: Arc<LogicalOp>,
}

impl PlanBuilder {
    /// Start building from a scan.
    pub fn scan(scan: ScanOp) -> Self {
        Self {
            op: Arc::new(LogicalOp::scan(scan)),
        }
    }

    /// Continue building on top of an existing plan.
    pub fn from_plan(plan: &LogicalPlan) -> Self {
        Self {
            op: Arc::clone(plan.root_arc()),
        }
    }

    fn wrap(op: LogicalOp) -> Self {
        Self { op: Arc::new(op) }
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(self, filter: FilterOp) -> Self {
        Self::wrap(LogicalOp::filter(self.op, filter))
    }

    /// Add a project.
    #[must_use]
    pub fn project(self, project: ProjectOp) -> Self {
        Self::wrap(LogicalOp::project(self.op, project))
    }

    /// Add a rename.
    #[must_use]
    pub fn rename(self, rename: RenameOp) -> Self {
        Self::wrap(LogicalOp::rename(self.op, rename))
    }

    /// Join with another plan on the right.
    #[must_use]
    pub fn join(self, right: &LogicalPlan, join: JoinOp) -> Self {
        Self::wrap(LogicalOp::join(self.op, Arc::clone(right.root_arc()), join))
    }

    /// Add an aggregate.
    #[must_use]
    pub fn aggregate(self, aggregate: AggregateOp) -> Self {
        Self::wrap(LogicalOp::aggregate(self.op, aggregate))
    }

    /// Union with another plan.
    #[must_use]
    pub fn union(self, other: &LogicalPlan, union: UnionOp) -> Self {
        Self::wrap(LogicalOp::union(self.op, Arc::clone(other.root_arc()), union))
    }

    /// Mark the current plan as a pinned result.
    #[must_use]
    pub fn cache(self, cache: CacheOp) -> Self {
        Self::wrap(LogicalOp::cache(self.op, cache))
    }

    /// Build the final plan.
    pub fn build(self) -> LogicalPlan {
        LogicalPlan { root: self.op }
    }
}
