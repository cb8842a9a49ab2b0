//! Aggregate operator for grouping and aggregation.

use serde::{Deserialize, Serialize};

use crate::expr::{AggExpr, LogicalExpr};

/// Aggregate operator - grouping and aggregation.
///
/// Output is one row per distinct key tuple: the key columns followed by
/// one column per aggregate. Null keys form their own group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AggregateOp {
    /// Grouping key expressions.
    pub keys: Vec<LogicalExpr>,
    /// Aggregation expressions.
    pub aggs: Vec<AggExpr>,
}

impl AggregateOp {
    /// Group by column names.
    pub fn group_by(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keys: names
                .into_iter()
                .map(|n| LogicalExpr::column(n.into()))
                .collect(),
            aggs: Vec::new(),
        }
    }

    /// Create a new aggregate operation.
    pub const fn new(keys: Vec<LogicalExpr>, aggs: Vec<AggExpr>) -> Self {
        Self { keys, aggs }
    }

    /// Add a grouping key expression.
    #[must_use]
    pub fn with_key(mut self, key: LogicalExpr) -> Self {
        self.keys.push(key);
        self
    }

    /// Add an aggregate.
    #[must_use]
    pub fn with_agg(mut self, agg: AggExpr) -> Self {
        self.aggs.push(agg);
        self
    }

    /// Output column names.
    pub fn output_names(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(LogicalExpr::output_name)
            .chain(self.aggs.iter().map(AggExpr::output_name))
            .collect()
    }
}

impl std::fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = self
            .keys
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let aggs = self
            .aggs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Aggregate(keys=[{keys}], aggs=[{aggs}])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, sum};

    #[test]
    fn test_aggregate_output_names() {
        let agg = AggregateOp::default()
            .with_key(col("dst").alias("id"))
            .with_agg(sum(col("msg")).with_alias("msg"));
        assert_eq!(agg.output_names(), vec!["id", "msg"]);
        assert_eq!(
            agg.to_string(),
            "Aggregate(keys=[dst AS id], aggs=[SUM(msg) AS msg])"
        );
    }
}
