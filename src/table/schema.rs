//! Table schema types
//!
//! Mirrors the `schema` member of pandas' `to_json(orient="table")` output.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, ServeError};

/// Default format-version tag for tables built from scratch
pub const DEFAULT_PANDAS_VERSION: &str = "1.4.0";

/// A single column descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }
}

/// Column definitions, primary key and format version of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<Field>,
    #[serde(rename = "primaryKey", default)]
    pub primary_key: Vec<String>,
    pub pandas_version: String,
}

impl TableSchema {
    /// Create a schema with no primary key and the default version tag
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            primary_key: Vec::new(),
            pandas_version: DEFAULT_PANDAS_VERSION.to_string(),
        }
    }

    /// Builder method to set the primary key
    pub fn with_primary_key(mut self, key: Vec<String>) -> Self {
        self.primary_key = key;
        self
    }

    /// Position of a field by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Whether a field is part of the index (the primary key)
    pub fn is_index(&self, name: &str) -> bool {
        self.primary_key.iter().any(|k| k == name)
    }

    /// Check field-name uniqueness and that the primary key names real fields.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ServeError::Schema(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }

        for key in &self.primary_key {
            if !seen.contains(key.as_str()) {
                return Err(ServeError::Schema(format!(
                    "primary key '{}' is not a declared field",
                    key
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_must_be_field() {
        let schema = TableSchema::new(vec![Field::new("x", "integer")])
            .with_primary_key(vec!["index".to_string()]);
        let err = schema.validate().unwrap_err();
        assert!(matches!(err, ServeError::Schema(_)));
        assert!(err.to_string().contains("index"));
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        let schema = TableSchema::new(vec![Field::new("x", "integer"), Field::new("x", "number")]);
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_primary_key_defaults_to_empty() {
        let schema: TableSchema = serde_json::from_str(
            r#"{"fields":[{"name":"a","type":"string"}],"pandas_version":"1.4.0"}"#,
        )
        .unwrap();
        assert!(schema.primary_key.is_empty());
        assert!(schema.validate().is_ok());
    }
}
