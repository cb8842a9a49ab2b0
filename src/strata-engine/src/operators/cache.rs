//! Cache fill operator.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_error::StrataResult;
use strata_logical::CacheId;

use crate::catalog::{Catalog, TableData};
use crate::executor::ExecutionContext;
use crate::operators::PhysicalOperator;
use crate::physical::{OperatorCaps, PhysicalSchema};

#[derive(Debug, Default)]
struct CacheBuffer {
    batches: Vec<RecordBatch>,
    stored: bool,
}

/// Passes its input through while keeping a copy of every batch. Once the
/// input is exhausted the copy is stored in the catalog's cache slot, so the
/// next plan that reaches the slot scans it instead of recomputing.
#[derive(Debug)]
pub struct CacheExec {
    input: Arc<dyn PhysicalOperator>,
    id: CacheId,
    catalog: Arc<Catalog>,
    buffer: tokio::sync::Mutex<CacheBuffer>,
}

impl CacheExec {
    /// Fill slot `id` of `catalog` with the rows of `input`.
    pub fn new(input: Arc<dyn PhysicalOperator>, id: CacheId, catalog: Arc<Catalog>) -> Self {
        Self {
            input,
            id,
            catalog,
            buffer: tokio::sync::Mutex::new(CacheBuffer::default()),
        }
    }
}

#[async_trait]
impl PhysicalOperator for CacheExec {
    fn name(&self) -> &'static str {
        "CacheExec"
    }

    fn schema(&self) -> &PhysicalSchema {
        self.input.schema()
    }

    fn capabilities(&self) -> OperatorCaps {
        OperatorCaps::streaming()
    }

    fn children(&self) -> Vec<&Arc<dyn PhysicalOperator>> {
        vec![&self.input]
    }

    async fn open(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        *self.buffer.lock().await = CacheBuffer::default();
        self.input.open(ctx).await
    }

    async fn next(&self) -> StrataResult<Option<RecordBatch>> {
        let mut buffer = self.buffer.lock().await;
        match self.input.next().await? {
            Some(batch) => {
                buffer.batches.push(batch.clone());
                Ok(Some(batch))
            }
            None => {
                if !buffer.stored {
                    buffer.stored = true;
                    let batches = std::mem::take(&mut buffer.batches);
                    let schema = Arc::clone(self.schema().arrow_schema());
                    self.catalog
                        .fill_cache(self.id, TableData::new(schema, batches))?;
                }
                Ok(None)
            }
        }
    }

    async fn close(&self, ctx: &ExecutionContext) -> StrataResult<()> {
        *self.buffer.lock().await = CacheBuffer::default();
        self.input.close(ctx).await
    }

    fn display(&self) -> String {
        format!("CacheExec({})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CacheState;
    use crate::memory::TrackingMemoryManager;
    use crate::operators::MemoryScanExec;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};

    #[tokio::test]
    async fn test_cache_fills_slot_at_end_of_input() {
        let catalog = Arc::new(Catalog::new(Arc::new(TrackingMemoryManager::unlimited())));
        let id = CacheId(1);
        catalog.pin_cache(id).unwrap();

        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        let batch =
            RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(vec![1, 2, 3]))])
                .unwrap();
        let scan = Arc::new(MemoryScanExec::new(
            "v",
            PhysicalSchema::new(schema),
            vec![batch].into(),
            2,
        ));
        let cache = CacheExec::new(scan, id, Arc::clone(&catalog));
        let ctx = ExecutionContext::default();

        cache.open(&ctx).await.unwrap();
        assert_eq!(cache.next().await.unwrap().unwrap().num_rows(), 2);
        assert!(matches!(catalog.cache_state(id).unwrap(), CacheState::Pending));
        assert_eq!(cache.next().await.unwrap().unwrap().num_rows(), 1);
        assert!(cache.next().await.unwrap().is_none());
        cache.close(&ctx).await.unwrap();

        let CacheState::Materialized(data) = catalog.cache_state(id).unwrap() else {
            panic!("cache was not filled");
        };
        assert_eq!(data.num_rows(), 3);
        assert_eq!(data.batches.len(), 2);
    }
}
