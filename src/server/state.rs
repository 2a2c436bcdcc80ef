//! Application state management

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::ModelCache;
use crate::model::{FileModelLoader, ModelLoader};

use super::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub cache: ModelCache,
}

impl AppState {
    /// State backed by the file artifact loader
    pub fn new(config: ServerConfig) -> Self {
        let loader = match config.model_root {
            Some(ref root) => FileModelLoader::new().with_root(root),
            None => FileModelLoader::new(),
        };
        Self::with_loader(config, Arc::new(loader))
    }

    /// State backed by any model engine
    pub fn with_loader(config: ServerConfig, loader: Arc<dyn ModelLoader>) -> Self {
        let cache = ModelCache::new(loader, Duration::from_secs(config.cache_ttl_secs));
        Self { config, cache }
    }

    /// Short identifier used to correlate log lines of one request
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()[..8].to_string()
    }
}
