use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use serde_json::Value;
use tokio::time::timeout;
use tracing::info;

use crate::cache::{CacheError, CacheStore};
use crate::config::redis_config::RedisConfig;

/// JSON documents in Redis, stored as text with `SET .. EX`.
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
    prefix: String,
    command_timeout: Duration,
}

impl RedisCache {
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .with_context(|| format!("invalid redis url {}", config.redacted_url()))?;

        let connection = timeout(
            config.command_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .context("timed out connecting to redis")?
        .context("failed to connect to redis")?;

        info!(url = %config.redacted_url(), "redis cache connected");

        Ok(Self {
            connection,
            prefix: config.key_prefix.clone(),
            command_timeout: config.command_timeout,
        })
    }

    fn key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{key}", self.prefix)
        }
    }

    async fn run<T, F>(&self, command: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(self.command_timeout, command).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(CacheError::Backend(error.to_string())),
            Err(_) => Err(CacheError::Timeout),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut connection = self.connection.clone();
        let key = self.key(key);

        let raw: Option<String> = self.run(connection.get(key)).await?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        let key = self.key(key);
        let text = serde_json::to_string(value)?;
        let seconds = ttl.as_secs().max(1);

        self.run(connection.set_ex::<_, _, ()>(key, text, seconds))
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        let key = self.key(key);

        self.run(connection.del::<_, ()>(key)).await
    }
}
