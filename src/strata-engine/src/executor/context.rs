//! Execution context shared by the operators of one pipeline.

use std::sync::Arc;

use common_config::ExecutionConfig;

use crate::memory::{MemoryManager, TrackingMemoryManager};
use crate::metrics::{MetricsSink, OperatorMetrics};

/// Runtime configuration for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum rows per emitted batch at scans.
    pub batch_size: usize,
    /// Memory limit in bytes for pinned results.
    pub memory_limit: Option<usize>,
    /// Enable metrics collection.
    pub collect_metrics: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from(&ExecutionConfig::default())
    }
}

impl From<&ExecutionConfig> for RuntimeConfig {
    fn from(config: &ExecutionConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            memory_limit: config.memory_limit,
            collect_metrics: config.collect_metrics,
        }
    }
}

impl RuntimeConfig {
    /// Set the scan batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable or disable metrics collection.
    #[must_use]
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.collect_metrics = enabled;
        self
    }
}

/// Read-only context handed to every operator.
#[derive(Clone)]
pub struct ExecutionContext {
    /// Memory manager for accounting.
    pub memory: Arc<dyn MemoryManager>,
    /// Metrics sink, absent when collection is disabled.
    pub metrics: Option<MetricsSink>,
    /// Runtime configuration.
    pub config: RuntimeConfig,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("config", &self.config)
            .field("memory_used", &self.memory.used())
            .field("metrics_enabled", &self.metrics.is_some())
            .finish()
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl ExecutionContext {
    /// Create a context with its own memory manager.
    pub fn new(config: RuntimeConfig) -> Self {
        let memory: Arc<dyn MemoryManager> =
            Arc::new(TrackingMemoryManager::new(config.memory_limit));
        let metrics = config.collect_metrics.then(MetricsSink::new);
        Self {
            memory,
            metrics,
            config,
        }
    }

    /// Share an existing memory manager.
    #[must_use]
    pub fn with_memory(mut self, memory: Arc<dyn MemoryManager>) -> Self {
        self.memory = memory;
        self
    }

    /// Configured scan batch size.
    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    /// Record operator metrics if enabled.
    pub fn record_metrics(&self, operator: &str, metrics: &OperatorMetrics) {
        if let Some(sink) = &self.metrics {
            sink.record(operator, metrics);
        }
    }
}
