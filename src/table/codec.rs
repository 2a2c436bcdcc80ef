//! Table JSON codec
//!
//! Reads and writes the pandas `orient="table"` layout:
//!
//! ```json
//! {
//!   "schema": {
//!     "fields": [{"name": "index", "type": "string"}, {"name": "x", "type": "integer"}],
//!     "primaryKey": ["index"],
//!     "pandas_version": "1.4.0"
//!   },
//!   "data": [{"index": "0", "x": 5}]
//! }
//! ```

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::document::{Record, TableDocument};
use super::schema::TableSchema;
use crate::error::{Result, ServeError};

/// Options controlling how a table is written back out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Emit the index (primary-key) columns
    pub index: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { index: true }
    }
}

impl EncodeOptions {
    /// Drop the index columns from the output, like `to_json(index=False)`
    pub fn without_index() -> Self {
        Self { index: false }
    }
}

#[derive(Deserialize)]
struct RawTable {
    schema: TableSchema,
    data: Vec<Record>,
}

/// Decode a table from its JSON value.
pub fn decode(value: Value) -> Result<TableDocument> {
    if !value.is_object() {
        return Err(ServeError::Schema("table must be a JSON object".to_string()));
    }

    let raw: RawTable = serde_json::from_value(value)
        .map_err(|e| ServeError::Schema(format!("malformed table: {}", e)))?;

    let table = TableDocument::new(raw.schema, raw.data);
    table.validate()?;
    Ok(table)
}

/// Decode a table from JSON text.
pub fn decode_str(text: &str) -> Result<TableDocument> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ServeError::Schema(format!("table is not valid JSON: {}", e)))?;
    decode(value)
}

/// Encode a table to its JSON value.
///
/// Keys within each record follow schema field order. Without the index the
/// primary-key columns are dropped and `primaryKey` is written empty.
pub fn encode(table: &TableDocument, options: EncodeOptions) -> Value {
    let schema = &table.schema;
    let keep = |name: &str| options.index || !schema.is_index(name);

    let fields: Vec<Value> = schema
        .fields
        .iter()
        .filter(|f| keep(f.name.as_str()))
        .map(|f| json!({ "name": f.name, "type": f.field_type }))
        .collect();

    let primary_key: Vec<&str> = if options.index {
        schema.primary_key.iter().map(String::as_str).collect()
    } else {
        Vec::new()
    };

    let data: Vec<Value> = table
        .data
        .iter()
        .map(|row| {
            let mut out = Map::with_capacity(row.len());
            for name in schema.field_names().filter(|n| keep(*n)) {
                if let Some(value) = row.get(name) {
                    out.insert(name.to_string(), value.clone());
                }
            }
            Value::Object(out)
        })
        .collect();

    json!({
        "schema": {
            "fields": fields,
            "primaryKey": primary_key,
            "pandas_version": schema.pandas_version,
        },
        "data": data,
    })
}
