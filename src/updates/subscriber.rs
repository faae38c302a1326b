use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::events::StreamEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("subscriber transport is closed")]
    Closed,

    #[error("subscriber buffer is full")]
    Lagging,
}

/// Push handle for one open SSE connection.
#[derive(Debug)]
pub struct Subscriber {
    id: SubscriberId,
    sender: mpsc::Sender<StreamEvent>,
}

impl Subscriber {
    /// A zero capacity is raised to one.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        let subscriber = Self {
            id: SubscriberId::new(),
            sender,
        };

        (subscriber, receiver)
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Queues one event without waiting.
    pub fn push(&self, event: StreamEvent) -> Result<(), DeliveryError> {
        self.sender.try_send(event).map_err(|error| match error {
            TrySendError::Closed(_) => DeliveryError::Closed,
            TrySendError::Full(_) => DeliveryError::Lagging,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Ends the client's stream once the already queued events are drained.
    pub fn terminate(self) {
        drop(self.sender);
    }
}
