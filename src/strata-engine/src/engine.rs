//! The table engine facade.
//!
//! [`TableEngine`] is everything an iterative driver needs from a table
//! engine: register data, run plans, pin results and truncate lineage.
//! [`LocalEngine`] implements it on top of the local planner and executor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use common_config::{CheckpointConfig, CheckpointMode, StrataConfig};
use common_error::{StrataError, StrataResult};
use strata_logical::{CacheId, CacheOp, CheckpointId, LogicalPlan, PlanBuilder, ScanOp};

use crate::catalog::{Catalog, CheckpointData, TableData};
use crate::checkpoint::CheckpointStore;
use crate::executor::{ExecutionResult, LocalExecutor, RuntimeConfig};
use crate::memory::{MemoryManager, TrackingMemoryManager};
use crate::planner::{LocalPhysicalPlanner, PhysicalPlanner};

/// Operations a driver performs against a table engine.
///
/// Plans are lazy: nothing runs until `collect`, `count` or `checkpoint`.
#[async_trait]
pub trait TableEngine: Send + Sync + std::fmt::Debug {
    /// Register batches under `name`, replacing any existing table, and
    /// return a plan scanning it.
    async fn register(
        &self,
        name: &str,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> StrataResult<LogicalPlan>;

    /// Output schema of a plan, resolved without running it.
    fn schema(&self, plan: &LogicalPlan) -> StrataResult<SchemaRef>;

    /// Run a plan and return its batches.
    async fn collect(&self, plan: &LogicalPlan) -> StrataResult<Vec<RecordBatch>>;

    /// Run a plan and return its rows as one batch.
    async fn collect_batch(&self, plan: &LogicalPlan) -> StrataResult<RecordBatch> {
        let schema = self.schema(plan)?;
        let batches = self.collect(plan).await?;
        Ok(concat_batches(&schema, &batches)?)
    }

    /// Run a plan and count its rows.
    async fn count(&self, plan: &LogicalPlan) -> StrataResult<usize>;

    /// Pin a plan's result. The first run stores the rows; later runs of any
    /// plan built on the returned one read them back.
    fn persist(&self, plan: &LogicalPlan) -> StrataResult<LogicalPlan>;

    /// Release a pinned result. Plans that are not pinned are left alone.
    fn unpersist(&self, plan: &LogicalPlan) -> StrataResult<()>;

    /// Materialize a plan now and return a plan that reads the stored rows,
    /// with no lineage behind it.
    async fn checkpoint(&self, plan: &LogicalPlan) -> StrataResult<LogicalPlan>;

    /// Delete a checkpoint and its storage. Returns whether it existed.
    async fn remove_checkpoint(&self, id: CheckpointId) -> StrataResult<bool>;
}

/// Single-process table engine.
#[derive(Debug)]
pub struct LocalEngine {
    catalog: Arc<Catalog>,
    executor: LocalExecutor,
    planner: LocalPhysicalPlanner,
    checkpoint: CheckpointConfig,
    next_cache: AtomicU64,
    next_checkpoint: AtomicU64,
}

impl LocalEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: &StrataConfig) -> StrataResult<Self> {
        config.validate()?;
        let runtime = RuntimeConfig::from(&config.execution);
        let memory: Arc<dyn MemoryManager> =
            Arc::new(TrackingMemoryManager::new(runtime.memory_limit));
        let catalog = Arc::new(Catalog::new(Arc::clone(&memory)));

        Ok(Self {
            planner: LocalPhysicalPlanner::new(Arc::clone(&catalog), runtime.batch_size),
            executor: LocalExecutor::new(runtime).with_memory(memory),
            catalog,
            checkpoint: config.checkpoint.clone(),
            next_cache: AtomicU64::new(1),
            next_checkpoint: AtomicU64::new(1),
        })
    }

    /// The catalog backing this engine.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Checkpoint configuration in effect.
    pub fn checkpoint_config(&self) -> &CheckpointConfig {
        &self.checkpoint
    }

    /// Run a plan, keeping per-operator metrics.
    pub async fn execute(&self, plan: &LogicalPlan) -> StrataResult<ExecutionResult> {
        let physical = self.planner.plan(plan)?;
        log::debug!("executing plan of depth {}", plan.depth());
        log::trace!("{}", physical.explain());
        let result = self.executor.execute(&physical).await?;
        log::debug!("executed: {result}");
        Ok(result)
    }

    /// Render the physical plan a logical plan would run as.
    pub fn explain(&self, plan: &LogicalPlan) -> StrataResult<String> {
        Ok(self.planner.plan(plan)?.explain())
    }

    fn store(&self) -> StrataResult<CheckpointStore> {
        self.checkpoint
            .dir
            .as_ref()
            .map(CheckpointStore::new)
            .ok_or_else(|| {
                StrataError::config("reliable checkpointing requires checkpoint.dir to be set")
            })
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        let memory: Arc<dyn MemoryManager> = Arc::new(TrackingMemoryManager::unlimited());
        let catalog = Arc::new(Catalog::new(Arc::clone(&memory)));
        Self {
            planner: LocalPhysicalPlanner::new(Arc::clone(&catalog), runtime.batch_size),
            executor: LocalExecutor::new(runtime).with_memory(memory),
            catalog,
            checkpoint: CheckpointConfig::default(),
            next_cache: AtomicU64::new(1),
            next_checkpoint: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl TableEngine for LocalEngine {
    async fn register(
        &self,
        name: &str,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> StrataResult<LogicalPlan> {
        let data = TableData::new(schema, batches);
        log::debug!("registering table '{name}' ({} rows)", data.num_rows());
        self.catalog.register_table(name, data)?;
        Ok(PlanBuilder::scan(ScanOp::table(name)).build())
    }

    fn schema(&self, plan: &LogicalPlan) -> StrataResult<SchemaRef> {
        Ok(Arc::clone(self.planner.plan(plan)?.schema().arrow_schema()))
    }

    async fn collect(&self, plan: &LogicalPlan) -> StrataResult<Vec<RecordBatch>> {
        Ok(self.execute(plan).await?.into_batches())
    }

    async fn count(&self, plan: &LogicalPlan) -> StrataResult<usize> {
        Ok(self.execute(plan).await?.total_rows())
    }

    fn persist(&self, plan: &LogicalPlan) -> StrataResult<LogicalPlan> {
        if plan.cache_id().is_some() {
            return Ok(plan.clone());
        }
        let id = CacheId(self.next_cache.fetch_add(1, Ordering::Relaxed));
        self.catalog.pin_cache(id)?;
        log::debug!("pinned {id}");
        Ok(PlanBuilder::from_plan(plan).cache(CacheOp::new(id)).build())
    }

    fn unpersist(&self, plan: &LogicalPlan) -> StrataResult<()> {
        if let Some(id) = plan.cache_id() {
            if self.catalog.release_cache(id)? {
                log::debug!("released {id}");
            }
        }
        Ok(())
    }

    async fn checkpoint(&self, plan: &LogicalPlan) -> StrataResult<LogicalPlan> {
        let result = self.execute(plan).await?;
        let schema = Arc::clone(&result.schema);
        let id = CheckpointId(self.next_checkpoint.fetch_add(1, Ordering::Relaxed));

        let data = match self.checkpoint.mode {
            CheckpointMode::Reliable => {
                let path = self.store()?.write(id, &schema, &result.batches)?;
                CheckpointData::File { schema, path }
            }
            CheckpointMode::Local => {
                CheckpointData::Memory(TableData::new(schema, result.into_batches()))
            }
        };
        self.catalog.put_checkpoint(id, data)?;
        log::debug!("created {id} ({:?})", self.checkpoint.mode);
        Ok(PlanBuilder::scan(ScanOp::checkpoint(id)).build())
    }

    async fn remove_checkpoint(&self, id: CheckpointId) -> StrataResult<bool> {
        match self.catalog.remove_checkpoint(id)? {
            Some(CheckpointData::File { path, .. }) => {
                CheckpointStore::delete(&path)?;
                log::debug!("removed {id} at {}", path.display());
                Ok(true)
            }
            Some(CheckpointData::Memory(_)) => {
                log::debug!("removed {id}");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{AsArray, Int64Array};
    use arrow::datatypes::{DataType, Field, Int64Type, Schema};
    use strata_logical::expr::{col, lit};
    use strata_logical::{FilterOp, LogicalOp};

    fn batch() -> (SchemaRef, RecordBatch) {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        let batch =
            RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(vec![1, 2, 3]))])
                .unwrap();
        (schema, batch)
    }

    #[tokio::test]
    async fn test_register_and_collect() {
        let engine = LocalEngine::default();
        let (schema, batch) = batch();
        let v = engine.register("v", schema, vec![batch]).await.unwrap();
        let plan = PlanBuilder::from_plan(&v)
            .filter(FilterOp::new(col("id").gt_eq(lit(2i64))))
            .build();

        assert_eq!(engine.count(&plan).await.unwrap(), 2);
        let out = engine.collect_batch(&plan).await.unwrap();
        let ids: Vec<_> = out.column(0).as_primitive::<Int64Type>().values().to_vec();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(engine.schema(&plan).unwrap().field(0).name(), "id");
    }

    #[tokio::test]
    async fn test_persist_materializes_once() {
        let engine = LocalEngine::default();
        let (schema, batch) = batch();
        let v = engine.register("v", schema, vec![batch]).await.unwrap();

        let pinned = engine.persist(&v).unwrap();
        assert_eq!(engine.persist(&pinned).unwrap(), pinned);
        assert_eq!(engine.count(&pinned).await.unwrap(), 3);
        assert!(engine.catalog().memory().used() > 0);
        assert!(engine.explain(&pinned).unwrap().contains("MemoryScanExec(cache#"));

        engine.unpersist(&pinned).unwrap();
        assert_eq!(engine.catalog().memory().used(), 0);
        assert_eq!(engine.count(&pinned).await.unwrap(), 3);
        engine.unpersist(&v).unwrap();
    }

    #[tokio::test]
    async fn test_local_checkpoint_truncates_lineage() {
        let engine = LocalEngine::default();
        let (schema, batch) = batch();
        let v = engine.register("v", schema, vec![batch]).await.unwrap();
        let deep = PlanBuilder::from_plan(&v)
            .filter(FilterOp::new(col("id").gt(lit(1i64))))
            .filter(FilterOp::new(col("id").lt(lit(9i64))))
            .build();

        let checkpointed = engine.checkpoint(&deep).await.unwrap();
        assert_eq!(checkpointed.depth(), 1);
        assert!(matches!(checkpointed.root(), LogicalOp::Scan(_)));
        assert_eq!(engine.count(&checkpointed).await.unwrap(), 2);

        let id = checkpointed.checkpoint_id().unwrap();
        assert!(engine.remove_checkpoint(id).await.unwrap());
        assert!(!engine.remove_checkpoint(id).await.unwrap());
        assert!(matches!(
            engine.count(&checkpointed).await,
            Err(StrataError::CheckpointError(_))
        ));
    }

    #[tokio::test]
    async fn test_reliable_checkpoint_writes_and_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StrataConfig {
            checkpoint: CheckpointConfig::reliable(dir.path()),
            ..StrataConfig::default()
        };
        let engine = LocalEngine::new(&config).unwrap();
        let (schema, batch) = batch();
        let v = engine.register("v", schema, vec![batch]).await.unwrap();

        let checkpointed = engine.checkpoint(&v).await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(engine.count(&checkpointed).await.unwrap(), 3);

        let id = checkpointed.checkpoint_id().unwrap();
        engine.remove_checkpoint(id).await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_reliable_checkpoint_without_dir() {
        let config = StrataConfig {
            checkpoint: CheckpointConfig {
                mode: CheckpointMode::Reliable,
                ..CheckpointConfig::default()
            },
            pregel: common_config::PregelConfig {
                checkpoint_interval: 0,
                ..Default::default()
            },
            ..StrataConfig::default()
        };
        let engine = LocalEngine::new(&config).unwrap();
        let (schema, batch) = batch();
        let v = engine.register("v", schema, vec![batch]).await.unwrap();

        assert!(matches!(
            engine.checkpoint(&v).await,
            Err(StrataError::ConfigError(_))
        ));
    }
}
