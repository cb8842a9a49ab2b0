//! Arrow IPC files backing reliable checkpoints.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use arrow::datatypes::SchemaRef;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;

use common_error::{StrataError, StrataResult};
use strata_logical::CheckpointId;

/// Writes, reads and deletes checkpoint files under one directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Store files under `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Checkpoint directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a checkpoint is written to.
    pub fn path_for(&self, id: CheckpointId) -> PathBuf {
        self.dir.join(format!("checkpoint-{}.arrow", id.0))
    }

    /// Write `batches` as an Arrow IPC file and return its path.
    pub fn write(
        &self,
        id: CheckpointId,
        schema: &SchemaRef,
        batches: &[RecordBatch],
    ) -> StrataResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(id);
        let file = File::create(&path)?;

        let mut writer = FileWriter::try_new(BufWriter::new(file), schema).map_err(|e| {
            StrataError::checkpoint(format!("failed to create {}: {e}", path.display()))
        })?;
        for batch in batches {
            writer.write(batch)?;
        }
        writer.finish()?;
        writer.into_inner()?.flush()?;

        log::debug!(
            "wrote {id} to {} ({} batches)",
            path.display(),
            batches.len()
        );
        Ok(path)
    }

    /// Delete a checkpoint file. A missing file is not an error.
    pub fn delete(path: &Path) -> StrataResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Open a checkpoint file for batch-at-a-time reading.
pub fn open_checkpoint_file(path: &Path) -> StrataResult<FileReader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| {
        StrataError::checkpoint(format!("cannot open {}: {e}", path.display()))
    })?;
    Ok(FileReader::try_new(BufReader::new(file), None)?)
}
