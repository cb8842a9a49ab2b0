//! Query execution module.
//!
//! - [`ExecutionContext`]: per-run memory, metrics and configuration
//! - [`LocalExecutor`]: single-machine pull-based executor
//! - [`ExecutionResult`]: collected batches with their metrics

mod context;
mod local;
mod result;

pub use context::{ExecutionContext, RuntimeConfig};
pub use local::LocalExecutor;
pub use result::ExecutionResult;
