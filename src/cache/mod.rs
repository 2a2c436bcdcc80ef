//! Caching module
//!
//! - [`TtlCache`]: generic time-to-live map with hit/miss statistics
//! - [`ModelCache`]: memoizes model loads by URI on top of [`TtlCache`]

mod model_cache;
mod ttl;

pub use model_cache::{ModelCache, ModelCacheStats};
pub use ttl::{CacheEntry, CacheStats, TtlCache};
