use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::events::{StreamEvent, UpdateEvent};
use crate::updates::registry::ConnectionRegistry;
use crate::updates::subscriber::{DeliveryError, SubscriberId};
use crate::updates::update_store::LastUpdateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(DeliveryError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
    pub persisted: bool,
}

pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    updates: LastUpdateStore,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>, updates: LastUpdateStore) -> Self {
        Self { registry, updates }
    }

    /// Fans `payload` out to every open connection, then records it for catch-up.
    ///
    /// Never fails from the caller's side; per-subscriber and store failures
    /// are logged and counted in the report.
    pub async fn publish(&self, payload: Value) -> PublishReport {
        let event = Arc::new(UpdateEvent::new(payload));
        let mut report = PublishReport::default();
        let mut closed: Vec<SubscriberId> = Vec::new();

        self.registry.for_each(|subscriber| {
            let outcome = match subscriber.push(StreamEvent::Update(Arc::clone(&event))) {
                Ok(()) => DeliveryOutcome::Delivered,
                Err(error) => DeliveryOutcome::Failed(error),
            };

            match outcome {
                DeliveryOutcome::Delivered => report.delivered += 1,
                DeliveryOutcome::Failed(error) => {
                    report.failed += 1;
                    warn!(subscriber = %subscriber.id(), %error, "failed to push product update");

                    if error == DeliveryError::Closed {
                        closed.push(subscriber.id());
                    }
                }
            }
        });

        for id in &closed {
            self.registry.unregister(id);
        }

        match self.updates.save(&event).await {
            Ok(()) => report.persisted = true,
            Err(error) => warn!(%error, "failed to persist last product update"),
        }

        if report.failed > 0 {
            info!(?report, pruned = closed.len(), "product update published with failures");
        } else {
            debug!(?report, "product update published");
        }

        report
    }
}
