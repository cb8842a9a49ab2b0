//! Binary operators for logical expressions.

use serde::{Deserialize, Serialize};
use strata_core::DataType;

/// Binary operators for logical expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic operators
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// Division (/)
    Divide,
    /// Modulo (%)
    Modulo,

    // Comparison operators
    /// Equality (=)
    Eq,
    /// Inequality (<>)
    NotEq,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    LtEq,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    GtEq,

    // Logical operators (three-valued logic)
    /// Logical AND
    And,
    /// Logical OR
    Or,

    /// String concatenation
    Concat,
}

impl BinaryOp {
    /// Check if this is a comparison operator.
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// Get the result type of this operator given input types.
    ///
    /// Returns `None` if the operation is not valid for the given types.
    /// A `Null` operand takes the type of the other side.
    pub fn result_type(&self, left: &DataType, right: &DataType) -> Option<DataType> {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo => {
                let common = left.common_supertype(right)?;
                (common.is_numeric() || common == DataType::Null).then_some(common)
            }

            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => {
                left.common_supertype(right).map(|_| DataType::Bool)
            }

            Self::And | Self::Or => match (left, right) {
                (DataType::Bool | DataType::Null, DataType::Bool | DataType::Null) => {
                    Some(DataType::Bool)
                }
                _ => None,
            },

            Self::Concat => {
                let common = left.common_supertype(right)?;
                matches!(common, DataType::String | DataType::Null).then_some(DataType::String)
            }
        }
    }

    /// Get the operator symbol for display.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "||",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_type_inference() {
        assert_eq!(
            BinaryOp::Add.result_type(&DataType::Int64, &DataType::Int64),
            Some(DataType::Int64)
        );
        assert_eq!(
            BinaryOp::Divide.result_type(&DataType::Float64, &DataType::Int64),
            Some(DataType::Float64)
        );
        assert_eq!(
            BinaryOp::Add.result_type(&DataType::Null, &DataType::Int64),
            Some(DataType::Int64)
        );
        assert_eq!(
            BinaryOp::Add.result_type(&DataType::String, &DataType::Int64),
            None
        );
    }

    #[test]
    fn test_comparison_type_inference() {
        assert_eq!(
            BinaryOp::Eq.result_type(&DataType::Int64, &DataType::Float64),
            Some(DataType::Bool)
        );
        assert_eq!(
            BinaryOp::Lt.result_type(&DataType::String, &DataType::Int64),
            None
        );
    }

    #[test]
    fn test_logical_type_inference() {
        assert_eq!(
            BinaryOp::And.result_type(&DataType::Bool, &DataType::Null),
            Some(DataType::Bool)
        );
        assert_eq!(BinaryOp::Or.result_type(&DataType::Int64, &DataType::Bool), None);
    }

    #[test]
    fn test_comparison_classification() {
        assert!(!BinaryOp::Add.is_comparison());
        assert!(!BinaryOp::And.is_comparison());
        assert!(BinaryOp::GtEq.is_comparison());
        assert_eq!(BinaryOp::NotEq.to_string(), "<>");
    }
}
