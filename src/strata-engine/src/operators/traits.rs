//! Physical operator trait.

use std::fmt::Debug;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_error::StrataResult;

use crate::executor::ExecutionContext;
use crate::physical::{OperatorCaps, PhysicalSchema};

/// A node of an executable plan.
///
/// Operators are pulled: the consumer calls `next()` until it returns
/// `None`.
///
/// ```text
/// create → open → next* → close
/// ```
///
/// `open` and `close` recurse into children. `close` reports the
/// operator's counters to the context's metrics sink and must be safe to
/// call more than once.
#[async_trait]
pub trait PhysicalOperator: Send + Sync + Debug {
    /// Get the operator name for display.
    fn name(&self) -> &'static str;

    /// Get the output schema.
    fn schema(&self) -> &PhysicalSchema;

    /// Get operator capabilities.
    fn capabilities(&self) -> OperatorCaps;

    /// Get child operators.
    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>>;

    /// Initialize the operator and its children.
    async fn open(&self, ctx: &ExecutionContext) -> StrataResult<()>;

    /// Next batch, or `None` once exhausted.
    async fn next(&self) -> StrataResult<Option<RecordBatch>>;

    /// Release resources and report metrics.
    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()>;

    /// Generate EXPLAIN output at given indentation level. Operators that
    /// drain an input before emitting are marked `[blocking]`.
    fn explain(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let marker = if self.capabilities().blocking {
            " [blocking]"
        } else {
            ""
        };
        let mut output = format!("{}{}{}\n", prefix, self.display(), marker);
        for child in self.children() {
            output.push_str(&child.explain(indent + 1));
        }
        output
    }

    /// Display string for EXPLAIN.
    fn display(&self) -> String {
        self.name().to_string()
    }
}

/// Shared physical operator handle.
pub type BoxedPhysicalOperator = Arc<dyn PhysicalOperator>;
