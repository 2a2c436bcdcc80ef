//! In-memory table: schema plus row records

use serde_json::{Map, Value};

use super::schema::{Field, TableSchema};
use crate::error::{Result, ServeError};

/// One row, keyed by field name
pub type Record = Map<String, Value>;

static NULL: Value = Value::Null;

/// A decoded table
#[derive(Debug, Clone, PartialEq)]
pub struct TableDocument {
    pub schema: TableSchema,
    pub data: Vec<Record>,
}

impl TableDocument {
    pub fn new(schema: TableSchema, data: Vec<Record>) -> Self {
        Self { schema, data }
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.data.len()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.schema.fields.len()
    }

    /// Values of a column in row order; rows without the key yield `Null`.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.data
            .iter()
            .map(move |row| row.get(name).unwrap_or(&NULL))
    }

    /// Check the record invariants against the schema.
    pub fn validate(&self) -> Result<()> {
        self.schema.validate()?;

        for (row_idx, row) in self.data.iter().enumerate() {
            for (key, value) in row {
                if !self.schema.contains(key) {
                    return Err(ServeError::Schema(format!(
                        "row {} has key '{}' which is not a declared field",
                        row_idx, key
                    )));
                }
                if value.is_array() || value.is_object() {
                    return Err(ServeError::Schema(format!(
                        "row {} field '{}' is not a scalar",
                        row_idx, key
                    )));
                }
            }
        }

        Ok(())
    }

    /// Copy of this table with `name` dropped from the schema and every row.
    ///
    /// The column is also dropped from the primary key if it was part of it.
    pub fn without_column(&self, name: &str) -> TableDocument {
        if !self.schema.contains(name) {
            return self.clone();
        }

        let mut schema = self.schema.clone();
        schema.fields.retain(|f| f.name != name);
        schema.primary_key.retain(|k| k != name);

        let data = self
            .data
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|(k, _)| k.as_str() != name)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .collect();

        TableDocument { schema, data }
    }

    /// Copy of this table with every primary-key column dropped, leaving only
    /// the regular columns.
    pub fn without_index(&self) -> TableDocument {
        self.schema
            .primary_key
            .iter()
            .fold(self.clone(), |table, key| table.without_column(key))
    }

    /// Write `values` as column `name`, one per row.
    ///
    /// An existing column is overwritten in place and keeps its position; a
    /// new column is appended. The field type is re-inferred from the values.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.data.len() {
            return Err(ServeError::Inference(format!(
                "column '{}' has {} values but the table has {} rows",
                name,
                values.len(),
                self.data.len()
            )));
        }

        let field_type = infer_column_type(&values);
        match self.schema.position(name) {
            Some(pos) => self.schema.fields[pos].field_type = field_type.to_string(),
            None => self.schema.fields.push(Field::new(name, field_type)),
        }

        for (row, value) in self.data.iter_mut().zip(values) {
            row.insert(name.to_string(), value);
        }

        Ok(())
    }
}

/// Table-schema type name for a column of JSON values.
///
/// Nulls are ignored. An all-null column is `number`, matching the float NaN
/// column pandas would hold.
pub fn infer_column_type(values: &[Value]) -> &'static str {
    let mut non_null = values.iter().filter(|v| !v.is_null()).peekable();
    if non_null.peek().is_none() {
        return "number";
    }

    let (mut all_int, mut all_num, mut all_bool) = (true, true, true);
    for value in non_null {
        match value {
            Value::Number(n) => {
                all_bool = false;
                if !(n.is_i64() || n.is_u64()) {
                    all_int = false;
                }
            }
            Value::Bool(_) => {
                all_int = false;
                all_num = false;
            }
            _ => {
                all_int = false;
                all_num = false;
                all_bool = false;
            }
        }
    }

    if all_int {
        "integer"
    } else if all_num {
        "number"
    } else if all_bool {
        "boolean"
    } else {
        "string"
    }
}
