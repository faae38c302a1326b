pub mod memory_cache;
pub mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache backend timed out")]
    Timeout,

    #[error("cached payload is not valid json: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Generic key-value cache holding JSON documents with a per-key expiry.
///
/// Writes are atomic per key; concurrent writers to the same key resolve as
/// last-write-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;
    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
