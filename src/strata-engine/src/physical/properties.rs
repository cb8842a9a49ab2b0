//! Operator capabilities.

/// Execution traits of a physical operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorCaps {
    /// Consumes (some of) its input before producing any output.
    pub blocking: bool,
    /// Produces rows without an input operator.
    pub source: bool,
}

impl OperatorCaps {
    /// Batch-at-a-time operator.
    pub const fn streaming() -> Self {
        Self {
            blocking: false,
            source: false,
        }
    }

    /// Operator that drains an input before emitting.
    pub const fn blocking() -> Self {
        Self {
            blocking: true,
            source: false,
        }
    }

    /// Leaf operator.
    pub const fn source() -> Self {
        Self {
            blocking: false,
            source: true,
        }
    }
}
