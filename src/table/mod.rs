//! Tabular data module
//!
//! Provides the in-memory table used by the predict pipeline:
//! - Schema types (`fields`, `primaryKey`, `pandas_version`)
//! - Row records of JSON scalars
//! - JSON codec for the pandas `orient="table"` layout
//! - Column merge and removal

mod codec;
mod document;
mod schema;

pub use codec::{decode, decode_str, encode, EncodeOptions};
pub use document::{infer_column_type, Record, TableDocument};
pub use schema::{Field, TableSchema, DEFAULT_PANDAS_VERSION};
