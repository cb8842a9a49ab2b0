//! Unary operators for logical expressions.

use serde::{Deserialize, Serialize};
use strata_core::DataType;

/// Unary operators for logical expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical NOT
    Not,
    /// Arithmetic negation (-)
    Neg,
    /// NULL check (IS NULL)
    IsNull,
    /// NOT NULL check (IS NOT NULL)
    IsNotNull,
}

impl UnaryOp {
    /// Get the result type of this operator given the input type.
    ///
    /// Returns `None` if the operation is not valid for the given type.
    pub fn result_type(&self, input: &DataType) -> Option<DataType> {
        match self {
            Self::Not => matches!(input, DataType::Bool | DataType::Null).then_some(DataType::Bool),
            Self::Neg => match input {
                DataType::Int64 | DataType::Float64 | DataType::Null => Some(*input),
                _ => None,
            },
            Self::IsNull | Self::IsNotNull => Some(DataType::Bool),
        }
    }

    /// Get the operator name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Not => "NOT",
            Self::Neg => "-",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
