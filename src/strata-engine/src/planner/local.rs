//! Local physical planner implementation.
//!
//! Converts logical plans to physical plans for local execution. Scans are
//! resolved against the catalog at planning time, and a cache whose slot is
//! already materialized is planned as a scan of the stored rows, which cuts
//! the lineage below it out of the physical plan.

use std::sync::Arc;

use common_error::StrataResult;
use strata_logical::{CacheOp, LogicalOp, LogicalPlan, ScanOp, ScanSource};

use crate::catalog::{CacheState, Catalog, CheckpointData};
use crate::operators::{
    CacheExec, FileScanExec, FilterExec, HashAggregateExec, HashJoinExec, MemoryScanExec,
    PhysicalOperator, ProjectExec, RenameExec, UnionExec,
};
use crate::physical::{PhysicalPlan, PhysicalSchema};

/// Physical planner trait.
///
/// Responsible for converting logical plans to physical plans.
pub trait PhysicalPlanner: Send + Sync {
    /// Plan a logical plan into a physical plan.
    fn plan(&self, logical: &LogicalPlan) -> StrataResult<PhysicalPlan>;
}

/// Local physical planner for single-node execution.
#[derive(Debug, Clone)]
pub struct LocalPhysicalPlanner {
    catalog: Arc<Catalog>,
    batch_size: usize,
}

impl LocalPhysicalPlanner {
    /// Plan against `catalog`, slicing scans to `batch_size` rows.
    pub fn new(catalog: Arc<Catalog>, batch_size: usize) -> Self {
        Self {
            catalog,
            batch_size,
        }
    }

    /// Plan a logical operator into a physical operator.
    ///
    /// A subplan shared by several parents is planned once per use; each
    /// physical operator has exactly one consumer.
    fn plan_operator(&self, op: &LogicalOp) -> StrataResult<Arc<dyn PhysicalOperator>> {
        Ok(match op {
            LogicalOp::Scan(scan) => self.plan_scan(scan)?,

            LogicalOp::Filter { input, filter } => Arc::new(FilterExec::try_new(
                self.plan_operator(input)?,
                filter.predicate.clone(),
            )?),

            LogicalOp::Project { input, project } => Arc::new(ProjectExec::try_new(
                self.plan_operator(input)?,
                project.expressions.clone(),
            )?),

            LogicalOp::Rename { input, rename } => Arc::new(RenameExec::try_new(
                self.plan_operator(input)?,
                rename.clone(),
            )?),

            LogicalOp::Join { left, right, join } => Arc::new(HashJoinExec::try_new(
                self.plan_operator(left)?,
                self.plan_operator(right)?,
                join.clone(),
            )?),

            LogicalOp::Aggregate { input, aggregate } => Arc::new(HashAggregateExec::try_new(
                self.plan_operator(input)?,
                aggregate.clone(),
            )?),

            LogicalOp::Union { left, right, .. } => Arc::new(UnionExec::try_new(
                self.plan_operator(left)?,
                self.plan_operator(right)?,
            )?),

            LogicalOp::Cache { input, cache } => self.plan_cache(input, cache)?,
        })
    }

    fn plan_scan(&self, scan: &ScanOp) -> StrataResult<Arc<dyn PhysicalOperator>> {
        match &scan.source {
            ScanSource::Table(name) => {
                let table = self.catalog.table(name)?;
                Ok(Arc::new(MemoryScanExec::new(
                    name.clone(),
                    PhysicalSchema::new(table.schema),
                    table.batches,
                    self.batch_size,
                )))
            }
            ScanSource::Checkpoint(id) => match self.catalog.checkpoint(*id)? {
                CheckpointData::Memory(table) => Ok(Arc::new(MemoryScanExec::new(
                    id.to_string(),
                    PhysicalSchema::new(table.schema),
                    table.batches,
                    self.batch_size,
                ))),
                CheckpointData::File { schema, path } => {
                    Ok(Arc::new(FileScanExec::new(path, PhysicalSchema::new(schema))))
                }
            },
        }
    }

    fn plan_cache(
        &self,
        input: &LogicalOp,
        cache: &CacheOp,
    ) -> StrataResult<Arc<dyn PhysicalOperator>> {
        match self.catalog.cache_state(cache.id)? {
            CacheState::Materialized(table) => Ok(Arc::new(MemoryScanExec::new(
                cache.id.to_string(),
                PhysicalSchema::new(table.schema),
                table.batches,
                self.batch_size,
            ))),
            CacheState::Pending => Ok(Arc::new(CacheExec::new(
                self.plan_operator(input)?,
                cache.id,
                Arc::clone(&self.catalog),
            ))),
            CacheState::Released => self.plan_operator(input),
        }
    }
}

impl PhysicalPlanner for LocalPhysicalPlanner {
    fn plan(&self, logical: &LogicalPlan) -> StrataResult<PhysicalPlan> {
        let root = self.plan_operator(logical.root())?;
        Ok(PhysicalPlan::new(root))
    }
}
