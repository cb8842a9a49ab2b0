//! Configuration management for Strata.
//!
//! Provides runtime configuration for the table engine, its checkpoint
//! store, and the defaults applied to new Pregel plans.

use std::path::{Path, PathBuf};

use common_error::{StrataError, StrataResult};
use serde::{Deserialize, Serialize};

/// Global Strata configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    /// Execution configuration.
    pub execution: ExecutionConfig,
    /// Checkpoint storage configuration.
    pub checkpoint: CheckpointConfig,
    /// Defaults for vertex-centric iteration.
    pub pregel: PregelConfig,
}

impl StrataConfig {
    /// Parse a configuration from a JSON document. Missing sections take their defaults.
    pub fn from_json_str(json: &str) -> StrataResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> StrataResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> StrataResult<()> {
        if self.execution.batch_size == 0 {
            return Err(StrataError::config("execution.batch_size must be positive"));
        }
        if self.pregel.max_iter == 0 {
            return Err(StrataError::config("pregel.max_iter must be at least 1"));
        }
        if self.checkpoint.mode == CheckpointMode::Reliable
            && self.checkpoint.dir.is_none()
            && self.pregel.checkpoint_interval > 0
        {
            return Err(StrataError::config(
                "reliable checkpointing requires checkpoint.dir to be set",
            ));
        }
        Ok(())
    }
}

/// Execution configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Maximum rows per batch emitted by scans.
    pub batch_size: usize,
    /// Memory limit in bytes for pinned tables.
    pub memory_limit: Option<usize>,
    /// Whether to collect per-operator metrics.
    pub collect_metrics: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            memory_limit: None,
            collect_metrics: true,
        }
    }
}

/// How lineage-truncating checkpoints are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CheckpointMode {
    /// Write Arrow IPC files under [`CheckpointConfig::dir`].
    Reliable,
    /// Memoize the materialized batches in the engine catalog.
    #[default]
    Local,
}

/// Checkpoint storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Directory for reliable checkpoint files.
    pub dir: Option<PathBuf>,
    /// Materialization mode.
    pub mode: CheckpointMode,
    /// Number of checkpoints a run keeps alive before deleting older ones.
    pub retain: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            dir: None,
            mode: CheckpointMode::Local,
            retain: 1,
        }
    }
}

impl CheckpointConfig {
    /// Reliable checkpoints written under `dir`.
    pub fn reliable(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            mode: CheckpointMode::Reliable,
            ..Self::default()
        }
    }
}

/// Defaults for new Pregel plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PregelConfig {
    /// Maximum number of rounds.
    pub max_iter: usize,
    /// Checkpoint every this many rounds; 0 disables checkpointing.
    pub checkpoint_interval: usize,
}

impl Default for PregelConfig {
    fn default() -> Self {
        Self {
            max_iter: 10,
            checkpoint_interval: 2,
        }
    }
}
