//! Physical schema wrapping an Arrow schema.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arrow::datatypes::{Field, FieldRef, Schema as ArrowSchema, SchemaRef};

use common_error::{StrataError, StrataResult};

/// Output schema of a physical operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalSchema {
    arrow_schema: SchemaRef,
}

impl PhysicalSchema {
    /// Wrap an Arrow schema.
    pub fn new(arrow_schema: SchemaRef) -> Self {
        Self { arrow_schema }
    }

    /// Build a schema from fields, rejecting duplicate column names.
    pub fn try_from_fields(fields: Vec<FieldRef>) -> StrataResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name().as_str()) {
                return Err(StrataError::schema_error(format!(
                    "duplicate column name '{}'",
                    field.name()
                )));
            }
        }
        Ok(Self::new(Arc::new(ArrowSchema::new(fields))))
    }

    /// Create an empty schema.
    pub fn empty() -> Self {
        Self::new(Arc::new(ArrowSchema::empty()))
    }

    /// Get the Arrow schema.
    pub fn arrow_schema(&self) -> &SchemaRef {
        &self.arrow_schema
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.arrow_schema.field_with_name(name).ok()
    }

    /// Position of the named column.
    pub fn index_of(&self, name: &str) -> StrataResult<usize> {
        self.arrow_schema
            .index_of(name)
            .map_err(|_| StrataError::column_not_found(name))
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.arrow_schema.fields().len()
    }

    /// Get all field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.arrow_schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }
}

impl Default for PhysicalSchema {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for PhysicalSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in self.arrow_schema.fields() {
            writeln!(
                f,
                "  {}: {}{}",
                field.name(),
                field.data_type(),
                if field.is_nullable() { " (nullable)" } else { "" }
            )?;
        }
        Ok(())
    }
}

impl From<SchemaRef> for PhysicalSchema {
    fn from(schema: SchemaRef) -> Self {
        Self::new(schema)
    }
}
