//! Local single-node executor implementation.

use std::sync::Arc;
use std::time::Instant;

use common_error::StrataResult;

use crate::executor::{ExecutionContext, ExecutionResult, RuntimeConfig};
use crate::memory::{MemoryManager, TrackingMemoryManager};
use crate::physical::PhysicalPlan;

/// Local single-node executor.
///
/// Executes physical plans using a pull-based pipeline model: open the
/// root, pull batches until it is exhausted, close it.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    config: RuntimeConfig,
    memory: Arc<dyn MemoryManager>,
}

impl LocalExecutor {
    /// Create an executor with its own memory manager.
    pub fn new(config: RuntimeConfig) -> Self {
        let memory: Arc<dyn MemoryManager> =
            Arc::new(TrackingMemoryManager::new(config.memory_limit));
        Self { config, memory }
    }

    /// Account execution against a shared memory manager.
    #[must_use]
    pub fn with_memory(mut self, memory: Arc<dyn MemoryManager>) -> Self {
        self.memory = memory;
        self
    }

    /// Get the executor configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Execute a physical plan to completion.
    pub async fn execute(&self, plan: &PhysicalPlan) -> StrataResult<ExecutionResult> {
        let ctx = ExecutionContext::new(self.config.clone()).with_memory(Arc::clone(&self.memory));
        let root = plan.root();
        let start = Instant::now();

        root.open(&ctx).await?;
        let mut batches = Vec::new();
        let drained = async {
            while let Some(batch) = root.next().await? {
                if batch.num_rows() > 0 {
                    batches.push(batch);
                }
            }
            StrataResult::Ok(())
        }
        .await;
        // Close even when a pull failed; the pull error wins.
        let closed = root.close(&ctx).await;
        drained?;
        closed?;

        let elapsed = start.elapsed();
        log::trace!(
            "executed {} operators in {elapsed:?}",
            plan.operator_count()
        );
        Ok(ExecutionResult::new(
            batches,
            Arc::clone(plan.schema().arrow_schema()),
            ctx.metrics.unwrap_or_default(),
            elapsed,
        ))
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
