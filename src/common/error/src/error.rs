//! Core error types for Strata.

use thiserror::Error;

/// Result type alias using `StrataError`.
pub type StrataResult<T> = std::result::Result<T, StrataError>;

/// Generic boxed error for external error sources.
pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for Strata operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StrataError {
    /// Invalid configuration, detected before any work is scheduled.
    #[error("ConfigError: {0}")]
    ConfigError(String),

    /// Type mismatch or invalid type operation.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Invalid value provided.
    #[error("ValueError: {0}")]
    ValueError(String),

    /// Schema-related error (duplicate column, bad join key, etc.).
    #[error("SchemaError: {0}")]
    SchemaError(String),

    /// Column not found in schema.
    #[error("ColumnNotFound: {0}")]
    ColumnNotFound(String),

    /// Graph structure error.
    #[error("GraphError: {0}")]
    GraphError(String),

    /// Query execution error.
    #[error("ExecutionError: {0}")]
    ExecutionError(String),

    /// Checkpoint storage error.
    #[error("CheckpointError: {0}")]
    CheckpointError(String),

    /// Feature not yet implemented.
    #[error("NotImplemented: {0}")]
    NotImplemented(String),

    /// Internal error (bug in Strata).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error.
    #[error("ArrowError: {0}")]
    ArrowError(#[from] arrow_schema::ArrowError),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// External error from third-party libraries.
    #[error("ExternalError: {0}")]
    ExternalError(GenericError),

    /// Invalid parameter provided.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),
}

impl StrataError {
    /// Create a new `ConfigError`.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new `TypeError`.
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a new `ValueError`.
    pub fn value_error<S: Into<String>>(msg: S) -> Self {
        Self::ValueError(msg.into())
    }

    /// Create a new `SchemaError`.
    pub fn schema_error<S: Into<String>>(msg: S) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a new `ColumnNotFound` error.
    pub fn column_not_found<S: Into<String>>(name: S) -> Self {
        Self::ColumnNotFound(name.into())
    }

    /// Create a new `NotImplemented` error.
    pub fn not_implemented<S: Into<String>>(msg: S) -> Self {
        Self::NotImplemented(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Create a new `ExecutionError`.
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::ExecutionError(msg.into())
    }

    /// Create a new `CheckpointError`.
    pub fn checkpoint<S: Into<String>>(msg: S) -> Self {
        Self::CheckpointError(msg.into())
    }

    /// Create a new `GraphError`.
    pub fn graph<S: Into<String>>(msg: S) -> Self {
        Self::GraphError(msg.into())
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a resource exhausted error (using `ExecutionError`).
    pub fn resource_exhausted<S: Into<String>>(msg: S) -> Self {
        Self::ExecutionError(format!("ResourceExhausted: {}", msg.into()))
    }

    /// Create a planning error (using `ExecutionError`).
    pub fn planning<S: Into<String>>(msg: S) -> Self {
        Self::ExecutionError(format!("PlanningError: {}", msg.into()))
    }

    /// Whether this error was raised by configuration validation.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError(_))
    }
}

/// Ensure a condition holds, returning an `ExecutionError` (or the named variant) if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::StrataError::ExecutionError($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::StrataError::$variant(format!($($msg)*)));
        }
    };
}

/// Return early with a `ConfigError`.
#[macro_export]
macro_rules! config_err {
    ($($arg:tt)*) => {
        return Err($crate::StrataError::ConfigError(format!($($arg)*)))
    };
}

/// Return early with a `TypeError`.
#[macro_export]
macro_rules! type_err {
    ($($arg:tt)*) => {
        return Err($crate::StrataError::TypeError(format!($($arg)*)))
    };
}
