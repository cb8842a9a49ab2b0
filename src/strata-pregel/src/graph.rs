//! Vertex and edge tables of a run.

use std::sync::atomic::{AtomicU64, Ordering};

use arrow::record_batch::RecordBatch;

use common_error::{config_err, StrataResult};
use strata_engine::TableEngine;
use strata_logical::LogicalPlan;

use crate::{DST, ID, SRC};

static NEXT_GRAPH: AtomicU64 = AtomicU64::new(1);

/// A read-only pair of plans: vertices keyed by `id`, edges by `src`/`dst`.
#[derive(Debug, Clone)]
pub struct GraphModel {
    vertices: LogicalPlan,
    edges: LogicalPlan,
}

impl GraphModel {
    /// Wrap existing plans after checking their key columns.
    pub fn new(
        engine: &dyn TableEngine,
        vertices: LogicalPlan,
        edges: LogicalPlan,
    ) -> StrataResult<Self> {
        let vertex_schema = engine.schema(&vertices)?;
        if vertex_schema.index_of(ID).is_err() {
            config_err!("vertex table has no '{ID}' column");
        }
        let edge_schema = engine.schema(&edges)?;
        for key in [SRC, DST] {
            if edge_schema.index_of(key).is_err() {
                config_err!("edge table has no '{key}' column");
            }
        }
        Ok(Self { vertices, edges })
    }

    /// Register both batches as fresh tables and wrap them.
    pub async fn from_batches(
        engine: &dyn TableEngine,
        vertices: RecordBatch,
        edges: RecordBatch,
    ) -> StrataResult<Self> {
        let n = NEXT_GRAPH.fetch_add(1, Ordering::Relaxed);
        let v = engine
            .register(&format!("vertices_{n}"), vertices.schema(), vec![vertices])
            .await?;
        let e = engine
            .register(&format!("edges_{n}"), edges.schema(), vec![edges])
            .await?;
        Self::new(engine, v, e)
    }

    pub fn vertices(&self) -> &LogicalPlan {
        &self.vertices
    }

    pub fn edges(&self) -> &LogicalPlan {
        &self.edges
    }
}
