//! Model cache: load-by-URI memoized for a fixed time window

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::ttl::TtlCache;
use crate::error::Result;
use crate::model::{Model, ModelLoader};

/// Snapshot of model cache activity
#[derive(Debug, Clone, Serialize)]
pub struct ModelCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub cached: usize,
    pub hit_rate: f64,
    pub ttl_secs: f64,
}

/// Process-wide cache of loaded models keyed by URI.
///
/// The map lock is never held while a model loads, so concurrent misses for
/// the same URI each call the loader and the last insert wins.
pub struct ModelCache {
    loader: Arc<dyn ModelLoader>,
    entries: TtlCache<String, Arc<dyn Model>>,
    loads: AtomicU64,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn ModelLoader>, ttl: Duration) -> Self {
        Self {
            loader,
            entries: TtlCache::new(ttl),
            loads: AtomicU64::new(0),
        }
    }

    /// Return the cached model for `uri`, loading it if absent or expired.
    pub fn get(&self, uri: &str) -> Result<Arc<dyn Model>> {
        if let Some(model) = self.entries.get(uri) {
            debug!(uri = %uri, "Model cache hit");
            return Ok(model);
        }

        let start = Instant::now();
        let model = self.loader.load(uri).map_err(|e| {
            warn!(uri = %uri, error = %e, "Model load failed");
            e
        })?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.loads.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(uri.to_string(), Arc::clone(&model));
        info!(uri = %uri, elapsed_ms, ttl_secs = self.entries.ttl().as_secs(), "Model loaded");

        Ok(model)
    }

    /// Drop one URI so the next request reloads it
    pub fn evict(&self, uri: &str) -> bool {
        self.entries.remove(uri).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn prune_expired(&self) -> usize {
        self.entries.prune_expired()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> ModelCacheStats {
        let base = self.entries.stats();
        ModelCacheStats {
            hits: base.hits,
            misses: base.misses,
            loads: self.loads.load(Ordering::Relaxed),
            cached: self.entries.len(),
            hit_rate: base.hit_rate,
            ttl_secs: self.entries.ttl().as_secs_f64(),
        }
    }
}
