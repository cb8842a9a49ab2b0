//! When to checkpoint, and which checkpoints may go.

use std::collections::VecDeque;

use common_error::StrataResult;
use strata_engine::TableEngine;
use strata_logical::CheckpointId;

/// Checkpoints the running vertex updates every `interval` rounds and keeps
/// at most `retain` of the checkpoints it created alive.
#[derive(Debug, Clone)]
pub struct CheckpointPolicy {
    interval: usize,
    retain: usize,
    live: VecDeque<CheckpointId>,
}

impl CheckpointPolicy {
    pub fn new(interval: usize, retain: usize) -> Self {
        Self {
            interval,
            retain: retain.max(1),
            live: VecDeque::new(),
        }
    }

    pub fn should_checkpoint(&self, round: usize) -> bool {
        self.interval > 0 && round % self.interval == 0
    }

    /// Record a checkpoint created by the run, newest last.
    pub fn track(&mut self, id: CheckpointId) {
        self.live.push_back(id);
    }

    /// Checkpoints currently owned by the run, oldest first.
    pub fn live(&self) -> impl Iterator<Item = &CheckpointId> {
        self.live.iter()
    }

    /// Delete the oldest checkpoints beyond the retention limit.
    pub async fn release_stale(&mut self, engine: &dyn TableEngine) -> StrataResult<usize> {
        let mut removed = 0;
        while self.live.len() > self.retain {
            let Some(id) = self.live.pop_front() else {
                break;
            };
            if engine.remove_checkpoint(id).await? {
                removed += 1;
            }
            log::debug!("released stale {id}");
        }
        Ok(removed)
    }

    /// Delete every checkpoint the run created.
    pub async fn release_all(&mut self, engine: &dyn TableEngine) -> StrataResult<usize> {
        let mut removed = 0;
        while let Some(id) = self.live.pop_front() {
            if engine.remove_checkpoint(id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
