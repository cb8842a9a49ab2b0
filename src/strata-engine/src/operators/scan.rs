//! Scan execution operators.
//!
//! `MemoryScanExec` replays batches held in the catalog (registered tables,
//! materialized caches, local checkpoints). `FileScanExec` streams a
//! checkpoint file back from disk.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::ipc::reader::FileReader;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_error::{StrataError, StrataResult};

use crate::checkpoint::open_checkpoint_file;
use crate::executor::ExecutionContext;
use crate::metrics::{ExecutionTimer, OperatorMetrics};
use crate::operators::PhysicalOperator;
use crate::physical::{OperatorCaps, PhysicalSchema};

/// Cursor over in-memory batches. Oversized batches are sliced to
/// `batch_size` rows.
#[derive(Debug, Default)]
struct MemoryCursor {
    batch: usize,
    offset: usize,
    metrics: OperatorMetrics,
}

/// Scan over batches already in memory.
#[derive(Debug)]
pub struct MemoryScanExec {
    label: String,
    schema: PhysicalSchema,
    batches: Arc<[RecordBatch]>,
    batch_size: usize,
    cursor: tokio::sync::Mutex<MemoryCursor>,
}

impl MemoryScanExec {
    /// Scan `batches`, emitting at most `batch_size` rows at a time.
    pub fn new(
        label: impl Into<String>,
        schema: PhysicalSchema,
        batches: Arc<[RecordBatch]>,
        batch_size: usize,
    ) -> Self {
        Self {
            label: label.into(),
            schema,
            batches,
            batch_size: batch_size.max(1),
            cursor: tokio::sync::Mutex::new(MemoryCursor::default()),
        }
    }
}

#[async_trait]
impl PhysicalOperator for MemoryScanExec {
    fn name(&self) -> &'static str {
        "MemoryScanExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn capabilities(&self) -> OperatorCaps {
        OperatorCaps::source()
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![]
    }

    async fn open(&self, _ctx: &ExecutionContext) -> StrataResult<()> {
        *self.cursor.lock().await = MemoryCursor::default();
        Ok(())
    }

    async fn next(&self) -> StrataResult<Option<RecordBatch>> {
        let mut cursor = self.cursor.lock().await;
        loop {
            let Some(batch) = self.batches.get(cursor.batch) else {
                return Ok(None);
            };
            if cursor.offset >= batch.num_rows() {
                cursor.batch += 1;
                cursor.offset = 0;
                continue;
            }
            let len = self.batch_size.min(batch.num_rows() - cursor.offset);
            let slice = batch.slice(cursor.offset, len);
            cursor.offset += len;
            cursor.metrics.add_output(len);
            return Ok(Some(slice));
        }
    }

    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        let mut cursor = self.cursor.lock().await;
        ctx.record_metrics(&self.display(), &cursor.metrics);
        cursor.metrics = OperatorMetrics::default();
        Ok(())
    }

    fn display(&self) -> String {
        format!("MemoryScanExec({})", self.label)
    }
}

/// Internal state of a file scan.
#[derive(Default)]
enum FileScanState {
    #[default]
    Uninitialized,
    Open(FileReader<BufReader<File>>),
    Exhausted,
}

impl std::fmt::Debug for FileScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Open(_) => write!(f, "Open"),
            Self::Exhausted => write!(f, "Exhausted"),
        }
    }
}

/// Scan over an Arrow IPC checkpoint file.
#[derive(Debug)]
pub struct FileScanExec {
    path: PathBuf,
    schema: PhysicalSchema,
    state: tokio::sync::Mutex<FileScanState>,
    metrics: tokio::sync::Mutex<OperatorMetrics>,
}

impl FileScanExec {
    /// Scan the file at `path`, whose rows have `schema`.
    pub fn new(path: impl Into<PathBuf>, schema: PhysicalSchema) -> Self {
        Self {
            path: path.into(),
            schema,
            state: tokio::sync::Mutex::new(FileScanState::Uninitialized),
            metrics: tokio::sync::Mutex::new(OperatorMetrics::default()),
        }
    }
}

#[async_trait]
impl PhysicalOperator for FileScanExec {
    fn name(&self) -> &'static str {
        "FileScanExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    fn capabilities(&self) -> OperatorCaps {
        OperatorCaps::source()
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![]
    }

    async fn open(&self, _ctx: &ExecutionContext) -> StrataResult<()> {
        let reader = open_checkpoint_file(&self.path)?;
        if reader.schema().fields() != self.schema.arrow_schema().fields() {
            return Err(StrataError::checkpoint(format!(
                "{} does not hold the expected columns",
                self.path.display()
            )));
        }
        *self.state.lock().await = FileScanState::Open(reader);
        Ok(())
    }

    async fn next(&self) -> StrataResult<Option<RecordBatch>> {
        let timer = ExecutionTimer::start();
        let mut state = self.state.lock().await;

        let FileScanState::Open(reader) = &mut *state else {
            return Ok(None);
        };
        match reader.next().transpose()? {
            Some(batch) => {
                let mut metrics = self.metrics.lock().await;
                metrics.add_output(batch.num_rows());
                metrics.add_time(timer.elapsed());
                Ok(Some(batch))
            }
            None => {
                *state = FileScanState::Exhausted;
                Ok(None)
            }
        }
    }

    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        *self.state.lock().await = FileScanState::Uninitialized;
        let metrics = std::mem::take(&mut *self.metrics.lock().await);
        ctx.record_metrics(&self.display(), &metrics);
        Ok(())
    }

    fn display(&self) -> String {
        format!("FileScanExec({})", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::CheckpointStore;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use strata_logical::CheckpointId;

    fn batch(values: Vec<i64>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
    }

    async fn drain(op: &dyn PhysicalOperator) -> Vec<usize> {
        let ctx = ExecutionContext::default();
        op.open(&ctx).await.unwrap();
        let mut sizes = Vec::new();
        while let Some(batch) = op.next().await.unwrap() {
            sizes.push(batch.num_rows());
        }
        op.close(&ctx).await.unwrap();
        sizes
    }

    #[tokio::test]
    async fn test_memory_scan_slices_batches() {
        let data = batch(vec![1, 2, 3, 4, 5]);
        let scan = MemoryScanExec::new(
            "v",
            PhysicalSchema::new(data.schema()),
            vec![data, batch(vec![6])].into(),
            2,
        );

        assert_eq!(drain(&scan).await, vec![2, 2, 1, 1]);
        // Re-opening restarts from the first batch.
        assert_eq!(drain(&scan).await, vec![2, 2, 1, 1]);
    }

    #[tokio::test]
    async fn test_memory_scan_skips_empty_batches() {
        let scan = MemoryScanExec::new(
            "v",
            PhysicalSchema::new(batch(vec![]).schema()),
            vec![batch(vec![]), batch(vec![7])].into(),
            16,
        );
        assert_eq!(drain(&scan).await, vec![1]);
    }

    #[tokio::test]
    async fn test_file_scan_reads_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        let data = batch(vec![1, 2, 3]);
        let path = store
            .write(CheckpointId(1), &data.schema(), &[data.clone(), data.clone()])
            .unwrap();

        let scan = FileScanExec::new(path, PhysicalSchema::new(data.schema()));
        assert_eq!(drain(&scan).await, vec![3, 3]);
    }
}
