//! Frozen run configuration.

use std::collections::HashSet;

use common_error::{config_err, StrataResult};
use strata_logical::{AggExpr, LogicalExpr};

use crate::{ID, MSG_COL_NAME};

/// An additional vertex column: how it starts and how each round recomputes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    /// Evaluated once against the original vertex table.
    pub init_expr: LogicalExpr,
    /// Evaluated every round against the vertex row joined with its message.
    pub update_expr: LogicalExpr,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, init_expr: LogicalExpr, update_expr: LogicalExpr) -> Self {
        Self {
            name: name.into(),
            init_expr,
            update_expr,
        }
    }

    /// Reasons `name` cannot be used for an additional column.
    pub(crate) fn check_name(name: &str) -> Option<String> {
        if name.is_empty() {
            Some("vertex column name must not be empty".to_string())
        } else if name == ID {
            Some(format!("'{name}' is the vertex id column"))
        } else if name == MSG_COL_NAME {
            Some(format!("'{name}' is reserved for messages"))
        } else {
            None
        }
    }
}

/// Which endpoint of a triplet receives a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageDirection {
    ToSrc,
    ToDst,
}

impl std::fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToSrc => write!(f, "to-src"),
            Self::ToDst => write!(f, "to-dst"),
        }
    }
}

/// A message definition. A null payload means no message for that triplet.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSpec {
    pub direction: MessageDirection,
    pub payload: LogicalExpr,
}

/// Validated, read-only description of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PregelPlan {
    columns: Vec<ColumnSpec>,
    messages: Vec<MessageSpec>,
    aggregation: AggExpr,
    max_iter: usize,
    checkpoint_interval: usize,
}

impl PregelPlan {
    /// Check every invariant of a run and freeze the parts.
    pub fn try_new(
        columns: Vec<ColumnSpec>,
        messages: Vec<MessageSpec>,
        aggregation: Option<AggExpr>,
        max_iter: usize,
        checkpoint_interval: usize,
    ) -> StrataResult<Self> {
        if max_iter < 1 {
            config_err!("max_iter must be at least 1, got {max_iter}");
        }
        if columns.is_empty() {
            config_err!("at least one vertex column is required");
        }
        if messages.is_empty() {
            config_err!("at least one message definition is required");
        }
        let Some(aggregation) = aggregation else {
            config_err!("a message aggregation is required");
        };

        let mut seen = HashSet::new();
        for column in &columns {
            if let Some(reason) = ColumnSpec::check_name(&column.name) {
                config_err!("{reason}");
            }
            if !seen.insert(column.name.as_str()) {
                config_err!("duplicate vertex column '{}'", column.name);
            }
        }

        Ok(Self {
            columns,
            messages,
            aggregation,
            max_iter,
            checkpoint_interval,
        })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn messages(&self) -> &[MessageSpec] {
        &self.messages
    }

    pub fn aggregation(&self) -> &AggExpr {
        &self.aggregation
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Rounds between checkpoints; 0 when disabled.
    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    /// Whether `name` is recomputed by the run.
    pub fn is_additional(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}
