//! Fluent construction of a run.

use std::sync::Arc;

use common_config::PregelConfig;
use common_error::{StrataError, StrataResult};
use strata_engine::TableEngine;
use strata_logical::{AggExpr, LogicalExpr};

use crate::engine::{PregelEngine, PregelOutput};
use crate::graph::GraphModel;
use crate::plan::{ColumnSpec, MessageDirection, MessageSpec, PregelPlan};

/// Accumulates the pieces of a run until [`build`](Self::build) freezes them.
///
/// Name problems in [`with_vertex_column`](Self::with_vertex_column) are
/// recorded when the call is made and reported by `build`, so chains never
/// break halfway.
#[derive(Debug, Clone)]
pub struct PregelBuilder {
    max_iter: usize,
    checkpoint_interval: usize,
    columns: Vec<ColumnSpec>,
    messages: Vec<MessageSpec>,
    aggregation: Option<AggExpr>,
    errors: Vec<String>,
}

impl Default for PregelBuilder {
    fn default() -> Self {
        Self::from_config(&PregelConfig::default())
    }
}

impl PregelBuilder {
    /// A builder with the default iteration cap and checkpoint interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder seeded from configuration.
    pub fn from_config(config: &PregelConfig) -> Self {
        Self {
            max_iter: config.max_iter,
            checkpoint_interval: config.checkpoint_interval,
            columns: Vec::new(),
            messages: Vec::new(),
            aggregation: None,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn set_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Checkpoint every `interval` rounds; 0 turns checkpointing off.
    #[must_use]
    pub fn set_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Add a vertex column computed by `init_expr` before the first round
    /// and by `update_expr` after every round.
    ///
    /// A name equal to an original vertex column replaces that column:
    /// `init_expr` still sees the original value, but the output carries
    /// only the computed one, in the additional-column position.
    #[must_use]
    pub fn with_vertex_column(
        mut self,
        name: impl Into<String>,
        init_expr: LogicalExpr,
        update_expr: LogicalExpr,
    ) -> Self {
        let name = name.into();
        if let Some(reason) = ColumnSpec::check_name(&name) {
            self.errors.push(reason);
            return self;
        }
        self.columns.push(ColumnSpec::new(name, init_expr, update_expr));
        self
    }

    #[must_use]
    pub fn send_msg_to_src(self, payload: LogicalExpr) -> Self {
        self.send(MessageDirection::ToSrc, payload)
    }

    #[must_use]
    pub fn send_msg_to_dst(self, payload: LogicalExpr) -> Self {
        self.send(MessageDirection::ToDst, payload)
    }

    fn send(mut self, direction: MessageDirection, payload: LogicalExpr) -> Self {
        self.messages.push(MessageSpec { direction, payload });
        self
    }

    /// Set how messages to one vertex are combined. The last call wins.
    #[must_use]
    pub fn agg_msgs(mut self, aggregation: AggExpr) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    /// Validate and freeze.
    pub fn build(&self) -> StrataResult<PregelPlan> {
        if !self.errors.is_empty() {
            return Err(StrataError::config(self.errors.join("; ")));
        }
        PregelPlan::try_new(
            self.columns.clone(),
            self.messages.clone(),
            self.aggregation.clone(),
            self.max_iter,
            self.checkpoint_interval,
        )
    }

    /// Freeze the plan and run it on `engine`.
    pub async fn run(
        &self,
        engine: Arc<dyn TableEngine>,
        graph: &GraphModel,
    ) -> StrataResult<PregelOutput> {
        let plan = self.build()?;
        PregelEngine::new(engine).run(&plan, graph).await
    }
}
