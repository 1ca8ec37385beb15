//! TTL key-value stores backing the label read-through cache.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheBackend, CacheSettings};
use crate::error::LabelGateError;

mod memory;
mod redis_store;

pub use memory::MemoryCache;
pub use redis_store::RedisCache;

const KEY_NAMESPACE: &str = "drug_label:";

/// Cache key for a drug name: namespace tag plus the lowercased name.
pub fn cache_key(drug_name: &str) -> String {
    format!("{KEY_NAMESPACE}{}", drug_name.to_lowercase())
}

/// String-keyed store with per-entry expiry.
///
/// Implementations never return an entry after its TTL has elapsed.
#[async_trait::async_trait]
pub trait LabelCache: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, LabelGateError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LabelGateError>;

    async fn ping(&self) -> Result<(), LabelGateError>;
}

/// Builds the configured backend, or `None` when caching is disabled.
///
/// Redis is connected lazily, so an unreachable store does not block startup.
///
/// # Errors
///
/// Returns an error when the Redis URL cannot be parsed.
pub fn from_settings(
    settings: &CacheSettings,
) -> Result<Option<Arc<dyn LabelCache>>, LabelGateError> {
    match settings.backend {
        CacheBackend::Redis => Ok(Some(Arc::new(RedisCache::open(
            &settings.redis_url,
            settings.op_timeout,
        )?))),
        CacheBackend::Memory => Ok(Some(Arc::new(MemoryCache::new()))),
        CacheBackend::Disabled => Ok(None),
    }
}
