//! tabular-serve - stateless prediction serving over table JSON
//!
//! Accepts a table in the pandas `orient="table"` layout, loads a model by
//! URI, writes the model's predictions into a target column and returns the
//! augmented table.
//!
//! # Modules
//!
//! - [`table`] - Table schema, records and the JSON codec
//! - [`model`] - Model engine traits and the file artifact loader
//! - [`cache`] - TTL cache and the model cache built on it
//! - [`server`] - HTTP endpoint, request pipeline and diagnostics
//! - [`cli`] - Command-line interface

pub mod error;

pub mod cache;
pub mod model;
pub mod table;

pub mod cli;
pub mod server;

pub use error::{Result, ServeError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, ServeError};

    pub use crate::table::{decode, encode, EncodeOptions, Field, Record, TableDocument, TableSchema};

    pub use crate::model::{FileModelLoader, Model, ModelArtifact, ModelLoader};

    pub use crate::cache::{ModelCache, TtlCache};

    pub use crate::server::{create_router, run_predict, AppState, Diagnostic, ServerConfig};
}
