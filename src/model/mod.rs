//! Model engine module
//!
//! The predict pipeline only sees two traits:
//! - [`Model`]: given a table, returns one prediction per row
//! - [`ModelLoader`]: resolves a model URI to a loaded [`Model`]
//!
//! [`FileModelLoader`] is the bundled engine. It reads JSON model artifacts
//! ([`ModelArtifact`]) from local paths and `file://` URIs.

mod artifact;
mod loader;

pub use artifact::{ConstantModel, LinearModel, ModelArtifact, MODEL_FILE_NAME};
pub use loader::FileModelLoader;

use crate::error::Result;
use crate::table::TableDocument;
use serde_json::Value;
use std::sync::Arc;

/// A loaded, ready-to-predict model
pub trait Model: Send + Sync {
    /// Predict one value per row of `table`, in row order.
    fn predict(&self, table: &TableDocument) -> Result<Vec<Value>>;
}

/// Loads models by URI
pub trait ModelLoader: Send + Sync {
    fn load(&self, uri: &str) -> Result<Arc<dyn Model>>;
}

impl<F> Model for F
where
    F: Fn(&TableDocument) -> Result<Vec<Value>> + Send + Sync,
{
    fn predict(&self, table: &TableDocument) -> Result<Vec<Value>> {
        self(table)
    }
}

impl<F> ModelLoader for F
where
    F: Fn(&str) -> Result<Arc<dyn Model>> + Send + Sync,
{
    fn load(&self, uri: &str) -> Result<Arc<dyn Model>> {
        self(uri)
    }
}
