//! Built-in scalar function expressions.

use serde::{Deserialize, Serialize};
use strata_core::DataType;

use super::LogicalExpr;

/// Built-in scalar functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinFunc {
    /// First non-null argument.
    Coalesce,
    /// Largest non-null argument.
    Greatest,
    /// Smallest non-null argument.
    Least,
    /// Absolute value.
    Abs,
}

impl BuiltinFunc {
    /// Function name as written in expressions.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Coalesce => "coalesce",
            Self::Greatest => "greatest",
            Self::Least => "least",
            Self::Abs => "abs",
        }
    }

    /// Accepted argument count as `(min, max)`; `None` means unbounded.
    pub const fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Self::Coalesce | Self::Greatest | Self::Least => (1, None),
            Self::Abs => (1, Some(1)),
        }
    }

    /// Result type for the given argument types.
    pub fn result_type(&self, args: &[DataType]) -> Option<DataType> {
        match self {
            Self::Coalesce | Self::Greatest | Self::Least => args
                .iter()
                .try_fold(DataType::Null, |acc, t| acc.common_supertype(t)),
            Self::Abs => match args {
                [t] if t.is_numeric() || *t == DataType::Null => Some(*t),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for BuiltinFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Function call expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncExpr {
    /// Function being called.
    pub func: BuiltinFunc,
    /// Function arguments.
    pub args: Vec<LogicalExpr>,
}

impl FuncExpr {
    /// Create a new function expression.
    pub const fn new(func: BuiltinFunc, args: Vec<LogicalExpr>) -> Self {
        Self { func, args }
    }

    /// Function name.
    pub fn name(&self) -> String {
        self.func.name().to_string()
    }
}

impl std::fmt::Display for FuncExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args = self
            .args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({})", self.func, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coalesce_result_type() {
        let t = BuiltinFunc::Coalesce.result_type(&[DataType::Float64, DataType::Int64]);
        assert_eq!(t, Some(DataType::Float64));
        let t = BuiltinFunc::Coalesce.result_type(&[DataType::Null, DataType::Int64]);
        assert_eq!(t, Some(DataType::Int64));
        assert_eq!(
            BuiltinFunc::Greatest.result_type(&[DataType::String, DataType::Int64]),
            None
        );
    }

    #[test]
    fn test_abs_arity() {
        assert_eq!(BuiltinFunc::Abs.arity(), (1, Some(1)));
        assert_eq!(BuiltinFunc::Abs.result_type(&[DataType::Int64, DataType::Int64]), None);
    }

    #[test]
    fn test_func_display() {
        let f = FuncExpr::new(
            BuiltinFunc::Coalesce,
            vec![LogicalExpr::column("msg"), LogicalExpr::literal(0i64)],
        );
        assert_eq!(f.to_string(), "coalesce(msg, 0)");
    }
}
