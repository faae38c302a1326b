use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::events::StreamEvent;
use crate::http::error::ApiError;
use crate::state::AppState;
use crate::updates::registry::ConnectionRegistry;
use crate::updates::subscriber::{Subscriber, SubscriberId};

const SHUTTING_DOWN: &str = "Server is shutting down";

/// `GET /api/sse/product-updates`
///
/// Sends the handshake, then the last stored update if one is still live,
/// then every later broadcast until the client goes away.
pub async fn product_updates(
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    if state.registry.is_shutting_down() {
        return Err(ApiError::Unavailable(SHUTTING_DOWN));
    }

    let (subscriber, receiver) = Subscriber::channel(state.config.subscriber_buffer);
    let id = subscriber.id();

    queue(&subscriber, StreamEvent::Connected);

    let catch_up = state.updates.load().await;
    let caught_up = catch_up.is_some();
    if let Some(last) = catch_up {
        queue(&subscriber, StreamEvent::Update(Arc::new(last)));
    }

    // registered only after the handshake and catch-up are queued
    state
        .registry
        .register(subscriber)
        .map_err(|_| ApiError::Unavailable(SHUTTING_DOWN))?;

    info!(subscriber = %id, caught_up, "product update stream opened");

    let stream = SubscriptionStream {
        id,
        registry: Arc::clone(&state.registry),
        receiver,
    };

    let sse = Sse::new(stream);
    let body = match state.config.keep_alive {
        Some(interval) => sse
            .keep_alive(KeepAlive::new().interval(interval))
            .into_response(),
        None => sse.into_response(),
    };

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache, no-transform"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response())
}

fn queue(subscriber: &Subscriber, event: StreamEvent) {
    if let Err(error) = subscriber.push(event) {
        warn!(subscriber = %subscriber.id(), %error, "failed to queue initial event");
    }
}

fn to_sse(event: &StreamEvent) -> Event {
    Event::default().data(event.to_json().to_string())
}

/// Response body of one SSE connection.
///
/// axum drops the body when the client aborts, which unregisters the subscriber.
struct SubscriptionStream {
    id: SubscriberId,
    registry: Arc<ConnectionRegistry>,
    receiver: mpsc::Receiver<StreamEvent>,
}

impl Stream for SubscriptionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver
            .poll_recv(cx)
            .map(|event| event.map(|event| Ok(to_sse(&event))))
    }
}

impl Drop for SubscriptionStream {
    fn drop(&mut self) {
        if self.registry.unregister(&self.id) {
            info!(subscriber = %self.id, "product update stream closed by client");
        } else {
            debug!(subscriber = %self.id, "product update stream closed by server");
        }
    }
}
