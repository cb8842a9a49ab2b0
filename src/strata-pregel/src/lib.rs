//! Vertex-centric, bulk-synchronous graph computation for Strata.
//!
//! `strata-pregel` drives a fixed round protocol on top of any
//! [`TableEngine`](strata_engine::TableEngine). Every round builds edge
//! triplets from the current vertex state, turns them into messages, combines
//! the messages addressed to each vertex and recomputes the additional vertex
//! columns. The run stops when a round produces no messages or when the
//! iteration cap is reached.
//!
//! # Overview
//!
//! - [`GraphModel`]: the vertex and edge tables a run reads
//! - [`PregelBuilder`]: fluent accumulation of columns, messages and the
//!   aggregation, frozen into a [`PregelPlan`]
//! - [`PregelEngine`]: the round driver
//! - [`CheckpointPolicy`]: periodic lineage truncation with bounded storage
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use strata_engine::LocalEngine;
//! use strata_logical::expr::{coalesce, col, lit, sum};
//! use strata_pregel::{GraphModel, Pregel, PregelBuilder};
//!
//! # async fn demo(graph: GraphModel) -> common_error::StrataResult<()> {
//! let engine = Arc::new(LocalEngine::default());
//! let output = PregelBuilder::new()
//!     .set_max_iter(5)
//!     .with_vertex_column(
//!         "value",
//!         lit(1i64),
//!         col("value").add_expr(coalesce(vec![Pregel::msg(), lit(0i64)])),
//!     )
//!     .send_msg_to_dst(Pregel::src("value"))
//!     .agg_msgs(sum(Pregel::msg()))
//!     .run(engine, &graph)
//!     .await?;
//! println!("{} rounds", output.rounds);
//! # Ok(())
//! # }
//! ```

mod builder;
mod engine;
mod graph;
mod plan;
mod policy;
mod state;

pub use builder::PregelBuilder;
pub use engine::{PregelEngine, PregelOutput, RoundSummary};
pub use graph::GraphModel;
pub use plan::{ColumnSpec, MessageDirection, MessageSpec, PregelPlan};
pub use policy::CheckpointPolicy;
pub use state::RoundState;

use strata_logical::expr::{col, qualified_col};
use strata_logical::LogicalExpr;

/// Vertex id column.
pub const ID: &str = "id";
/// Edge source-id column.
pub const SRC: &str = "src";
/// Edge destination-id column.
pub const DST: &str = "dst";
/// Reserved name of the aggregated message column.
pub const MSG_COL_NAME: &str = "_pregel_msg_";
/// Sender id of a raw message.
pub const MSG_SOURCE: &str = "_pregel_msg_src_";
/// Receiver id of a raw message.
pub const MSG_DEST: &str = "_pregel_msg_dst_";

/// Triplet role qualifiers.
pub(crate) const SRC_ROLE: &str = "src";
pub(crate) const EDGE_ROLE: &str = "edge";
pub(crate) const DST_ROLE: &str = "dst";

/// Column references for payload, aggregation and update expressions.
pub struct Pregel;

impl Pregel {
    /// A column of the source vertex of a triplet.
    pub fn src(name: &str) -> LogicalExpr {
        qualified_col(SRC_ROLE, name)
    }

    /// A column of the edge of a triplet.
    pub fn edge(name: &str) -> LogicalExpr {
        qualified_col(EDGE_ROLE, name)
    }

    /// A column of the destination vertex of a triplet.
    pub fn dst(name: &str) -> LogicalExpr {
        qualified_col(DST_ROLE, name)
    }

    /// The message column: a raw payload inside the aggregation, the
    /// combined message (null when none arrived) inside an update.
    pub fn msg() -> LogicalExpr {
        col(MSG_COL_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_columns() {
        assert_eq!(Pregel::src("value").output_name(), "src.value");
        assert_eq!(Pregel::edge("weight").output_name(), "edge.weight");
        assert_eq!(Pregel::dst(ID).output_name(), "dst.id");
        assert_eq!(Pregel::msg().output_name(), MSG_COL_NAME);
    }
}
