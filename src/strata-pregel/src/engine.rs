//! The round driver.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;

use common_error::{StrataError, StrataResult};
use strata_engine::TableEngine;
use strata_logical::expr::col;
use strata_logical::{
    AggregateOp, FilterOp, JoinOp, JoinType, LogicalPlan, PlanBuilder, ProjectOp, RenameOp,
    UnionOp,
};

use crate::graph::GraphModel;
use crate::plan::{MessageDirection, PregelPlan};
use crate::policy::CheckpointPolicy;
use crate::state::RoundState;
use crate::{
    Pregel, DST, DST_ROLE, EDGE_ROLE, ID, MSG_COL_NAME, MSG_DEST, MSG_SOURCE, SRC, SRC_ROLE,
};

/// What one round did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: usize,
    /// Vertices that received at least one message.
    pub messages: usize,
    /// Whether the vertex updates of this round were checkpointed.
    pub checkpointed: bool,
    /// Depth of the vertex plan handed to the next round.
    pub lineage_depth: usize,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct PregelOutput {
    /// Original vertex columns followed by the additional columns. An
    /// original column shadowed by an additional column of the same name
    /// appears once, as the additional column.
    pub vertices: RecordBatch,
    /// Rounds executed.
    pub rounds: usize,
    /// True when the last round produced no messages.
    pub converged: bool,
    pub history: Vec<RoundSummary>,
}

/// Runs frozen plans against a table engine.
///
/// Rounds are strictly sequential: every engine request is awaited before
/// the next one is issued. On error the pinned tables and checkpoints of the
/// failed run are left to the caller.
#[derive(Debug, Clone)]
pub struct PregelEngine {
    engine: Arc<dyn TableEngine>,
    retain: usize,
}

impl PregelEngine {
    pub fn new(engine: Arc<dyn TableEngine>) -> Self {
        Self { engine, retain: 1 }
    }

    /// Keep up to `retain` checkpoints alive while a run is in progress.
    #[must_use]
    pub fn with_checkpoint_retain(mut self, retain: usize) -> Self {
        self.retain = retain.max(1);
        self
    }

    pub fn table_engine(&self) -> &Arc<dyn TableEngine> {
        &self.engine
    }

    /// Run `plan` over `graph` until a round sends nothing or the
    /// iteration cap is reached.
    pub async fn run(&self, plan: &PregelPlan, graph: &GraphModel) -> StrataResult<PregelOutput> {
        let engine = self.engine.as_ref();
        log::info!(
            "pregel run: {} column(s), {} message definition(s), max_iter={}, checkpoint_interval={}",
            plan.columns().len(),
            plan.messages().len(),
            plan.max_iter(),
            plan.checkpoint_interval()
        );

        let (base, initial) = self.initial_vertices(plan, graph)?;
        let mut policy = CheckpointPolicy::new(plan.checkpoint_interval(), self.retain);
        let mut state = RoundState::initial(initial);
        let mut history = Vec::new();
        let mut converged = false;

        while state.round < plan.max_iter() {
            let round = state.round + 1;

            let messages = engine.persist(&self.aggregated_messages(plan, graph, &state)?)?;
            let message_count = engine.count(&messages).await?;
            log::debug!("round {round}: {message_count} vertices received messages");

            let mut updates = self.vertex_updates(plan, &state, &messages);
            let checkpointed = policy.should_checkpoint(round);
            if checkpointed {
                updates = engine.checkpoint(&updates).await?;
                if let Some(id) = updates.checkpoint_id() {
                    policy.track(id);
                }
                log::debug!("round {round}: checkpointed vertex updates");
            }
            let updates = engine.persist(&updates)?;
            let updated = engine.count(&updates).await?;
            log::debug!("round {round}: updated {updated} vertices");

            for pinned in state.pinned() {
                engine.unpersist(pinned)?;
            }
            policy.release_stale(engine).await?;

            let vertices = PlanBuilder::from_plan(&base)
                .join(&updates, JoinOp::using(ID))
                .build();
            history.push(RoundSummary {
                round,
                messages: message_count,
                checkpointed,
                lineage_depth: vertices.depth(),
            });
            state = state.advance(vertices, updates, messages);

            if message_count == 0 {
                converged = true;
                break;
            }
        }

        let vertices = engine.collect_batch(&state.current_vertices).await?;
        for pinned in state.pinned() {
            engine.unpersist(pinned)?;
        }
        policy.release_all(engine).await?;

        log::info!(
            "pregel run finished after {} round(s), converged={converged}",
            state.round
        );
        Ok(PregelOutput {
            vertices,
            rounds: state.round,
            converged,
            history,
        })
    }

    /// The original columns an additional column does not shadow, and the
    /// round-zero vertex table with every init expression applied.
    fn initial_vertices(
        &self,
        plan: &PregelPlan,
        graph: &GraphModel,
    ) -> StrataResult<(LogicalPlan, LogicalPlan)> {
        let schema = self.engine.schema(graph.vertices())?;
        let kept: Vec<String> = schema
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .filter(|name| !plan.is_additional(name))
            .collect();

        let base = PlanBuilder::from_plan(graph.vertices())
            .project(ProjectOp::columns(kept.iter()))
            .build();
        let exprs = kept
            .iter()
            .map(col)
            .chain(
                plan.columns()
                    .iter()
                    .map(|c| c.init_expr.clone().alias(c.name.as_str())),
            )
            .collect();
        let initial = PlanBuilder::from_plan(graph.vertices())
            .project(ProjectOp::new(exprs))
            .build();
        Ok((base, initial))
    }

    /// Edge triplets over the current vertices, sent, gated, filtered and
    /// combined into `{id, _pregel_msg_}`.
    fn aggregated_messages(
        &self,
        plan: &PregelPlan,
        graph: &GraphModel,
        state: &RoundState,
    ) -> StrataResult<LogicalPlan> {
        let vertices = &state.current_vertices;
        let edges = PlanBuilder::from_plan(graph.edges())
            .rename(RenameOp::qualify(EDGE_ROLE))
            .build();
        let dst = PlanBuilder::from_plan(vertices)
            .rename(RenameOp::qualify(DST_ROLE))
            .build();
        let triplets = PlanBuilder::from_plan(vertices)
            .rename(RenameOp::qualify(SRC_ROLE))
            .join(
                &edges,
                JoinOp::on(qualified(SRC_ROLE, ID), qualified(EDGE_ROLE, SRC)),
            )
            .join(
                &dst,
                JoinOp::on(qualified(EDGE_ROLE, DST), qualified(DST_ROLE, ID)),
            )
            .build();

        let mut sent = plan.messages().iter().map(|message| {
            let (from, to) = match message.direction {
                MessageDirection::ToDst => (Pregel::src(ID), Pregel::dst(ID)),
                MessageDirection::ToSrc => (Pregel::dst(ID), Pregel::src(ID)),
            };
            PlanBuilder::from_plan(&triplets)
                .project(ProjectOp::new(vec![
                    from.alias(MSG_SOURCE),
                    to.alias(MSG_DEST),
                    message.payload.clone().alias(MSG_COL_NAME),
                ]))
                .build()
        });
        let first = sent
            .next()
            .ok_or_else(|| StrataError::internal("plan has no message definitions"))?;
        let mut builder = sent.fold(PlanBuilder::from_plan(&first), |builder, next| {
            builder.union(&next, UnionOp::all())
        });

        if let Some(active) = &state.previous_messages {
            builder = builder.join(
                active,
                JoinOp::on(MSG_SOURCE, ID).with_type(JoinType::LeftSemi),
            );
        }

        Ok(builder
            .filter(FilterOp::new(Pregel::msg().is_not_null()))
            .aggregate(AggregateOp::new(
                vec![col(MSG_DEST).alias(ID)],
                vec![plan.aggregation().clone().with_alias(MSG_COL_NAME)],
            ))
            .build())
    }

    /// `id` plus every update expression, evaluated over the current
    /// vertices left-joined with this round's messages.
    fn vertex_updates(
        &self,
        plan: &PregelPlan,
        state: &RoundState,
        messages: &LogicalPlan,
    ) -> LogicalPlan {
        let exprs = std::iter::once(col(ID))
            .chain(
                plan.columns()
                    .iter()
                    .map(|c| c.update_expr.clone().alias(c.name.as_str())),
            )
            .collect();
        PlanBuilder::from_plan(&state.current_vertices)
            .join(messages, JoinOp::using(ID).with_type(JoinType::LeftOuter))
            .project(ProjectOp::new(exprs))
            .build()
    }
}

fn qualified(role: &str, name: &str) -> String {
    format!("{role}.{name}")
}
