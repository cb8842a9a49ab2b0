//! Logical data type definitions.

use serde::{Deserialize, Serialize};

/// Logical type of a column or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Null type (unknown or absent).
    Null,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
}

impl DataType {
    /// Check if this type is numeric.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Get the display name for this type.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool => "Bool",
            Self::Int64 => "Int64",
            Self::Float64 => "Float64",
            Self::String => "String",
        }
    }

    /// Get the common supertype of two types (for type inference).
    pub fn common_supertype(&self, other: &Self) -> Option<Self> {
        if self == other {
            return Some(*self);
        }

        match (self, other) {
            (Self::Null, t) | (t, Self::Null) => Some(*t),
            (Self::Int64, Self::Float64) | (Self::Float64, Self::Int64) => Some(Self::Float64),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
