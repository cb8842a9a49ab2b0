//! Catalog of registered tables, pinned caches and checkpoints.
//!
//! Scans resolve their source here at planning time. Materialized caches
//! and local checkpoints hold their batches in the catalog and account the
//! bytes against the engine's memory manager until released.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use common_error::{StrataError, StrataResult};
use strata_logical::{CacheId, CheckpointId};

use crate::memory::{MemoryManager, MemoryReservation};

/// Immutable batches with their schema. Cloning shares the batches.
#[derive(Debug, Clone)]
pub struct TableData {
    /// Schema of every batch.
    pub schema: SchemaRef,
    /// Row data.
    pub batches: Arc<[RecordBatch]>,
}

impl TableData {
    /// Bundle batches with their schema.
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self {
            schema,
            batches: batches.into(),
        }
    }

    /// Total rows across batches.
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Arrow buffer memory held by the batches.
    pub fn memory_size(&self) -> usize {
        self.batches
            .iter()
            .map(RecordBatch::get_array_memory_size)
            .sum()
    }
}

/// State of a cache slot as seen by the planner.
#[derive(Debug, Clone)]
pub enum CacheState {
    /// Pinned but not yet computed.
    Pending,
    /// Computed; scans read the stored batches.
    Materialized(TableData),
    /// Never pinned, or released.
    Released,
}

/// Where a checkpoint's rows live.
#[derive(Debug, Clone)]
pub enum CheckpointData {
    /// Memoized in the catalog.
    Memory(TableData),
    /// Arrow IPC file written by the checkpoint store.
    File {
        /// Schema of the stored rows.
        schema: SchemaRef,
        /// File location.
        path: PathBuf,
    },
}

impl CheckpointData {
    /// Schema of the checkpointed rows.
    pub fn schema(&self) -> &SchemaRef {
        match self {
            Self::Memory(data) => &data.schema,
            Self::File { schema, .. } => schema,
        }
    }
}

#[derive(Debug)]
enum CacheSlot {
    Pending,
    Materialized {
        data: TableData,
        _reservation: MemoryReservation,
    },
}

#[derive(Debug)]
struct CheckpointSlot {
    data: CheckpointData,
    _reservation: Option<MemoryReservation>,
}

/// Name and id resolution for everything a scan can read.
#[derive(Debug)]
pub struct Catalog {
    memory: Arc<dyn MemoryManager>,
    tables: RwLock<HashMap<String, TableData>>,
    caches: RwLock<HashMap<CacheId, CacheSlot>>,
    checkpoints: RwLock<HashMap<CheckpointId, CheckpointSlot>>,
}

fn read<T>(lock: &RwLock<T>) -> StrataResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StrataError::internal("catalog lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> StrataResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StrataError::internal("catalog lock poisoned"))
}

impl Catalog {
    /// Create an empty catalog accounting against `memory`.
    pub fn new(memory: Arc<dyn MemoryManager>) -> Self {
        Self {
            memory,
            tables: RwLock::new(HashMap::new()),
            caches: RwLock::new(HashMap::new()),
            checkpoints: RwLock::new(HashMap::new()),
        }
    }

    /// The memory manager pinned results are accounted against.
    pub fn memory(&self) -> &Arc<dyn MemoryManager> {
        &self.memory
    }

    // ========== Tables ==========

    /// Register a table, replacing any table with the same name.
    pub fn register_table(&self, name: impl Into<String>, data: TableData) -> StrataResult<()> {
        let name = name.into();
        if let Some(batch) = data.batches.iter().find(|b| b.schema() != data.schema) {
            return Err(StrataError::schema_error(format!(
                "batch schema {:?} does not match table '{name}' schema {:?}",
                batch.schema(),
                data.schema
            )));
        }
        if write(&self.tables)?.insert(name.clone(), data).is_some() {
            log::debug!("replaced table '{name}'");
        }
        Ok(())
    }

    /// Look up a registered table.
    pub fn table(&self, name: &str) -> StrataResult<TableData> {
        read(&self.tables)?
            .get(name)
            .cloned()
            .ok_or_else(|| StrataError::value_error(format!("table '{name}' is not registered")))
    }

    /// Remove a table. Returns whether it existed.
    pub fn drop_table(&self, name: &str) -> StrataResult<bool> {
        Ok(write(&self.tables)?.remove(name).is_some())
    }

    // ========== Caches ==========

    /// Pin a cache slot; it is filled by the first execution that reaches it.
    pub fn pin_cache(&self, id: CacheId) -> StrataResult<()> {
        write(&self.caches)?.entry(id).or_insert(CacheSlot::Pending);
        Ok(())
    }

    /// Current state of a cache slot.
    pub fn cache_state(&self, id: CacheId) -> StrataResult<CacheState> {
        Ok(match read(&self.caches)?.get(&id) {
            None => CacheState::Released,
            Some(CacheSlot::Pending) => CacheState::Pending,
            Some(CacheSlot::Materialized { data, .. }) => CacheState::Materialized(data.clone()),
        })
    }

    /// Store the computed rows of a pending slot.
    ///
    /// Does nothing if the slot was released or filled in the meantime.
    pub fn fill_cache(&self, id: CacheId, data: TableData) -> StrataResult<()> {
        let mut caches = write(&self.caches)?;
        let Some(slot) = caches.get_mut(&id) else {
            return Ok(());
        };
        if matches!(slot, CacheSlot::Pending) {
            let reservation =
                MemoryReservation::try_new(Arc::clone(&self.memory), data.memory_size())?;
            log::debug!(
                "materialized {id}: {} rows, {} bytes",
                data.num_rows(),
                reservation.size()
            );
            *slot = CacheSlot::Materialized {
                data,
                _reservation: reservation,
            };
        }
        Ok(())
    }

    /// Release a cache slot and its memory. Returns whether it was pinned.
    pub fn release_cache(&self, id: CacheId) -> StrataResult<bool> {
        Ok(write(&self.caches)?.remove(&id).is_some())
    }

    /// Number of pinned slots, pending or materialized.
    pub fn cache_count(&self) -> StrataResult<usize> {
        Ok(read(&self.caches)?.len())
    }

    // ========== Checkpoints ==========

    /// Record a checkpoint. In-memory checkpoints reserve their bytes.
    pub fn put_checkpoint(&self, id: CheckpointId, data: CheckpointData) -> StrataResult<()> {
        let reservation = match &data {
            CheckpointData::Memory(table) => Some(MemoryReservation::try_new(
                Arc::clone(&self.memory),
                table.memory_size(),
            )?),
            CheckpointData::File { .. } => None,
        };
        write(&self.checkpoints)?.insert(
            id,
            CheckpointSlot {
                data,
                _reservation: reservation,
            },
        );
        Ok(())
    }

    /// Look up a checkpoint.
    pub fn checkpoint(&self, id: CheckpointId) -> StrataResult<CheckpointData> {
        read(&self.checkpoints)?
            .get(&id)
            .map(|slot| slot.data.clone())
            .ok_or_else(|| StrataError::checkpoint(format!("{id} does not exist")))
    }

    /// Forget a checkpoint, returning where its rows lived.
    pub fn remove_checkpoint(&self, id: CheckpointId) -> StrataResult<Option<CheckpointData>> {
        Ok(write(&self.checkpoints)?.remove(&id).map(|slot| slot.data))
    }

    /// Number of live checkpoints.
    pub fn checkpoint_count(&self) -> StrataResult<usize> {
        Ok(read(&self.checkpoints)?.len())
    }
}
