use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info};

use crate::updates::subscriber::{Subscriber, SubscriberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry is shutting down")]
    ShuttingDown,
}

#[derive(Default)]
struct RegistryState {
    subscribers: HashMap<SubscriberId, Subscriber>,
    shutting_down: bool,
}

/// Process-wide set of open SSE connections.
///
/// Mutation and iteration share one lock, so `for_each` sees a snapshot: a
/// subscriber registered or removed concurrently either gets the whole
/// iteration or none of it.
#[derive(Default)]
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, subscriber: Subscriber) -> Result<(), RegistryError> {
        let mut state = self.lock();

        if state.shutting_down {
            return Err(RegistryError::ShuttingDown);
        }

        let id = subscriber.id();
        state.subscribers.insert(id, subscriber);
        debug!(subscriber = %id, total = state.subscribers.len(), "subscriber registered");

        Ok(())
    }

    /// Removes `id` if present. Returns whether anything was removed.
    pub fn unregister(&self, id: &SubscriberId) -> bool {
        let mut state = self.lock();

        let removed = state.subscribers.remove(id).is_some();
        if removed {
            debug!(subscriber = %id, total = state.subscribers.len(), "subscriber unregistered");
        }

        removed
    }

    /// Runs `f` for every subscriber registered at the time of the call.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Subscriber),
    {
        let state = self.lock();

        for subscriber in state.subscribers.values() {
            f(subscriber);
        }
    }

    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.lock().subscribers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_shutting_down(&self) -> bool {
        self.lock().shutting_down
    }

    /// Refuses further registrations and closes every open subscriber.
    pub fn shutdown(&self) -> usize {
        let mut state = self.lock();
        state.shutting_down = true;

        let drained: Vec<Subscriber> = state.subscribers.drain().map(|(_, s)| s).collect();
        let count = drained.len();
        drained.into_iter().for_each(Subscriber::terminate);

        info!(closed = count, "connection registry shut down");

        count
    }
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ConnectionRegistry")
            .field("subscribers", &state.subscribers.len())
            .field("shutting_down", &state.shutting_down)
            .finish()
    }
}
