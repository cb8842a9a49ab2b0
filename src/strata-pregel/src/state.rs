//! Loop-carried state of a run.

use strata_logical::LogicalPlan;

/// The tables one round hands to the next. Each round builds a new value;
/// the pinned tables of the value it replaces are released by the driver.
#[derive(Debug, Clone)]
pub struct RoundState {
    /// Rounds completed so far.
    pub round: usize,
    /// Original vertex columns joined with the additional columns.
    pub current_vertices: LogicalPlan,
    /// Pinned `{id, additional columns}` of the last round.
    pub vertex_updates: Option<LogicalPlan>,
    /// Pinned aggregated messages of the last round; their ids are the
    /// vertices allowed to send next.
    pub previous_messages: Option<LogicalPlan>,
}

impl RoundState {
    /// State before the first round.
    pub fn initial(vertices: LogicalPlan) -> Self {
        Self {
            round: 0,
            current_vertices: vertices,
            vertex_updates: None,
            previous_messages: None,
        }
    }

    /// State after a completed round.
    pub fn advance(
        &self,
        current_vertices: LogicalPlan,
        vertex_updates: LogicalPlan,
        messages: LogicalPlan,
    ) -> Self {
        Self {
            round: self.round + 1,
            current_vertices,
            vertex_updates: Some(vertex_updates),
            previous_messages: Some(messages),
        }
    }

    /// The pinned tables this state owns.
    pub fn pinned(&self) -> impl Iterator<Item = &LogicalPlan> {
        self.vertex_updates.iter().chain(self.previous_messages.iter())
    }
}
