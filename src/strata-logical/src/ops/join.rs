//! Equi-join operator.

use serde::{Deserialize, Serialize};

/// Kind of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JoinType {
    /// Rows with matching keys on both sides.
    #[default]
    Inner,
    /// Every left row; right columns are null where nothing matches.
    LeftOuter,
    /// Left rows with at least one match, left columns only, no duplication.
    LeftSemi,
}

impl JoinType {
    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Inner => "Inner",
            Self::LeftOuter => "LeftOuter",
            Self::LeftSemi => "LeftSemi",
        }
    }
}

/// Equi-join operator.
///
/// Keys are column names matched pairwise with `=`. Null keys never match.
/// Output is the left columns followed by the right columns; with
/// `drop_right_keys` the right-hand key columns are omitted. Any other
/// name collision between the sides is a schema error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinOp {
    /// Join kind.
    pub join_type: JoinType,
    /// `(left column, right column)` key pairs.
    pub on: Vec<(String, String)>,
    /// Omit right-hand key columns from the output.
    pub drop_right_keys: bool,
}

impl JoinOp {
    /// Inner join on `left = right`, keeping both key columns.
    pub fn on(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            join_type: JoinType::Inner,
            on: vec![(left.into(), right.into())],
            drop_right_keys: false,
        }
    }

    /// Inner join on a column present on both sides, keeping one copy.
    pub fn using(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            join_type: JoinType::Inner,
            on: vec![(column.clone(), column)],
            drop_right_keys: true,
        }
    }

    /// Set the join kind.
    #[must_use]
    pub const fn with_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Left key column names.
    pub fn left_keys(&self) -> impl Iterator<Item = &str> {
        self.on.iter().map(|(l, _)| l.as_str())
    }

    /// Right key column names.
    pub fn right_keys(&self) -> impl Iterator<Item = &str> {
        self.on.iter().map(|(_, r)| r.as_str())
    }
}

impl std::fmt::Display for JoinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = self
            .on
            .iter()
            .map(|(l, r)| format!("{l} = {r}"))
            .collect::<Vec<_>>()
            .join(" AND ");
        write!(f, "Join({}, {keys})", self.join_type.name())
    }
}
