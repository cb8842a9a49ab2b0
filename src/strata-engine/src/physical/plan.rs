//! Physical plan structure.

use std::sync::Arc;

use crate::operators::PhysicalOperator;
use crate::physical::PhysicalSchema;

/// An executable operator tree.
#[derive(Debug, Clone)]
pub struct PhysicalPlan {
    root: Arc<dyn PhysicalOperator>,
}

impl PhysicalPlan {
    /// Create a new physical plan with the given root operator.
    pub fn new(root: Arc<dyn PhysicalOperator>) -> Self {
        Self { root }
    }

    /// Get the root operator.
    pub fn root(&self) -> &Arc<dyn PhysicalOperator> {
        &self.root
    }

    /// Get output schema from the root operator.
    pub fn schema(&self) -> &PhysicalSchema {
        self.root.schema()
    }

    /// Generate EXPLAIN output.
    pub fn explain(&self) -> String {
        let mut output = String::from("Physical Plan:\n");
        output.push_str(&self.root.explain(1));
        output
    }

    /// Count the number of operators in the plan.
    pub fn operator_count(&self) -> usize {
        fn count(op: &dyn PhysicalOperator) -> usize {
            1 + op
                .children()
                .iter()
                .map(|c| count(c.as_ref()))
                .sum::<usize>()
        }
        count(self.root.as_ref())
    }
}

impl std::fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.explain())
    }
}
