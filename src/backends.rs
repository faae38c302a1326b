use std::sync::Arc;

use anyhow::Result;

use crate::cache::CacheStore;
use crate::cache::memory_cache::MemoryCache;
use crate::cache::redis_cache::RedisCache;
use crate::config::cache_kinds::CacheKind;
use crate::config::redis_config::RedisConfig;

pub struct Backends;

type DynamicCache = Arc<dyn CacheStore>;

impl Backends {
    pub async fn cache_store(kind: CacheKind) -> Result<DynamicCache> {
        tracing::info!(cache = %kind, "creating cache store");

        let cache: DynamicCache = match kind {
            CacheKind::Memory => Arc::new(MemoryCache::new()),
            CacheKind::Redis => {
                let config = RedisConfig::from_env()?;

                Arc::new(RedisCache::connect(&config).await?)
            }
        };

        Ok(cache)
    }
}
