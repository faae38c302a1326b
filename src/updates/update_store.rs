use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::cache::{CacheError, CacheStore};
use crate::events::UpdateEvent;

pub const LAST_UPDATE_KEY: &str = "last_product_update";
pub const LAST_UPDATE_TTL: Duration = Duration::from_secs(3600);

/// The single "last update" slot used to catch up newly connected clients.
#[derive(Clone)]
pub struct LastUpdateStore {
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl LastUpdateStore {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self::with_ttl(cache, LAST_UPDATE_TTL)
    }

    pub fn with_ttl(cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub async fn save(&self, event: &UpdateEvent) -> Result<(), CacheError> {
        self.cache
            .set(LAST_UPDATE_KEY, &event.to_json(), self.ttl)
            .await
    }

    /// Backend errors and unparsable records both degrade to `None`. Any other
    /// JSON value is replayed as stored.
    pub async fn load(&self) -> Option<UpdateEvent> {
        let stored = match self.cache.get(LAST_UPDATE_KEY).await {
            Ok(stored) => stored?,
            Err(error) => {
                warn!(%error, "failed to read last product update");
                return None;
            }
        };

        let record = match stored {
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(record) => record,
                Err(error) => {
                    warn!(%error, "stored last product update is not valid json");
                    return None;
                }
            },
            record => record,
        };

        Some(UpdateEvent::from_json(record))
    }
}
