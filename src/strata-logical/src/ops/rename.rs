//! Rename operator for logical planning.
//!
//! Rename changes column names without touching data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Rename operator - column renaming.
///
/// Explicit mappings win; every other column gets `prefix` prepended when
/// one is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RenameOp {
    /// Mapping from old names to new names.
    pub mapping: HashMap<String, String>,
    /// Prefix applied to every unmapped column.
    pub prefix: Option<String>,
}

impl RenameOp {
    /// Create a new rename operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rename with a single mapping.
    pub fn single(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new().with_rename(from, to)
    }

    /// Qualify every column as `qualifier.column`.
    pub fn qualify(qualifier: &str) -> Self {
        Self {
            mapping: HashMap::new(),
            prefix: Some(format!("{qualifier}.")),
        }
    }

    /// Add a rename mapping.
    #[must_use]
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.mapping.insert(from.into(), to.into());
        self
    }

    /// Get the new name for a column.
    pub fn new_name(&self, old_name: &str) -> String {
        match (self.mapping.get(old_name), &self.prefix) {
            (Some(to), _) => to.clone(),
            (None, Some(prefix)) => format!("{prefix}{old_name}"),
            (None, None) => old_name.to_string(),
        }
    }

    /// Check if a column is explicitly renamed.
    pub fn is_renamed(&self, name: &str) -> bool {
        self.mapping.contains_key(name)
    }
}

impl std::fmt::Display for RenameOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut renames = self
            .mapping
            .iter()
            .map(|(from, to)| format!("{from} -> {to}"))
            .collect::<Vec<_>>();
        renames.sort();
        if let Some(prefix) = &self.prefix {
            renames.push(format!("* -> {prefix}*"));
        }
        write!(f, "Rename({})", renames.join(", "))
    }
}
