use std::sync::Arc;

use serde_json::Value;

use crate::cache::CacheStore;
use crate::catalog::ProductRepository;
use crate::config::server_config::ServerConfig;
use crate::updates::broadcaster::{Broadcaster, PublishReport};
use crate::updates::registry::ConnectionRegistry;
use crate::updates::update_store::LastUpdateStore;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub broadcaster: Arc<Broadcaster>,
    pub updates: LastUpdateStore,
    pub cache: Arc<dyn CacheStore>,
    pub catalog: Arc<dyn ProductRepository>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        catalog: Arc<dyn ProductRepository>,
        config: ServerConfig,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let updates = LastUpdateStore::new(Arc::clone(&cache));
        let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry), updates.clone()));

        Self {
            registry,
            broadcaster,
            updates,
            cache,
            catalog,
            config: Arc::new(config),
        }
    }

    pub async fn publish(&self, payload: Value) -> PublishReport {
        self.broadcaster.publish(payload).await
    }
}
