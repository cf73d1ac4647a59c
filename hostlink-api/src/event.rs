//! Typed event subscriptions.
//!
//! The raw layer in `hostlink-core` hands every delivery to a callback as an
//! untyped envelope. Here each subscription becomes an [`EventStream`] of
//! deserialized payloads, and `once` variants await a single delivery.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::{mpsc, oneshot};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use hostlink_core::event::{self, EventMessage, EventTarget, Subscription};
use hostlink_core::{EventToken, InvokeError};

use crate::client::HostClient;
use crate::Result;

/// One delivered event with its payload already deserialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<T> {
    /// Name the emitter published under.
    pub event: String,
    /// Token of the subscription that received it.
    pub id: EventToken,
    /// Deserialized payload.
    pub payload: T,
}

/// Stream of typed event deliveries.
///
/// Dropping the stream unsubscribes; [`EventStream::unlisten`] does the same
/// but reports whether the host acknowledged it. Deliveries whose payload
/// does not deserialize as `T` are skipped, not errors: several event names
/// can share a wire and a listener only cares about its own shape.
#[derive(Debug)]
pub struct EventStream<T> {
    subscription: Subscription,
    rx: mpsc::UnboundedReceiver<Event<T>>,
}

impl<T> EventStream<T> {
    /// The underlying subscription handle.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Unsubscribes and reports the host's acknowledgement.
    pub async fn unlisten(self) -> Result<()> {
        self.subscription.unlisten().await
    }
}

impl<T> Stream for EventStream<T> {
    type Item = Event<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_next_unpin(cx)
    }
}

fn decode<T: DeserializeOwned>(message: EventMessage) -> Option<Event<T>> {
    match serde_json::from_value(message.payload) {
        Ok(payload) => Some(Event {
            event: message.event,
            id: message.id,
            payload,
        }),
        Err(err) => {
            debug!(event = %message.event, %err, "skipping delivery of unexpected shape");
            None
        }
    }
}

/// Subscribes to `event` wherever it is emitted.
pub async fn listen<T>(client: &HostClient, event: &str) -> Result<EventStream<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    listen_to(client, event, EventTarget::Any).await
}

/// Subscribes to `event` scoped to `target`.
pub async fn listen_to<T>(
    client: &HostClient,
    event: &str,
    target: EventTarget,
) -> Result<EventStream<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded();
    let subscription = event::listen(client.invoker(), event, target, move |message| {
        if let Some(typed) = decode::<T>(message) {
            let _ = tx.unbounded_send(typed);
        }
    })
    .await?;
    Ok(EventStream { subscription, rx })
}

/// Awaits the next delivery of `event`.
pub async fn once<T>(client: &HostClient, event: &str) -> Result<Event<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    once_to(client, event, EventTarget::Any).await
}

/// Awaits the next delivery of `event` scoped to `target`.
///
/// Unlike the stream variants a payload of the wrong shape is an error here;
/// the one delivery this call waits for has already been consumed.
pub async fn once_to<T>(client: &HostClient, event: &str, target: EventTarget) -> Result<Event<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let (tx, rx) = oneshot::channel::<EventMessage>();
    let slot = Arc::new(Mutex::new(Some(tx)));
    let subscription = event::once(client.invoker(), event, target, move |message| {
        if let Some(tx) = slot.lock().take() {
            let _ = tx.send(message);
        }
    })
    .await?;

    let message = rx.await.map_err(|_| InvokeError::Canceled)?;
    drop(subscription);
    let payload = serde_json::from_value(message.payload).map_err(InvokeError::Codec)?;
    Ok(Event {
        event: message.event,
        id: message.id,
        payload,
    })
}

/// Emits `event` to every listener.
pub async fn emit<T: Serialize>(client: &HostClient, event: &str, payload: &T) -> Result<()> {
    let payload = serde_json::to_value(payload).map_err(InvokeError::Codec)?;
    event::emit(client.invoker(), event, payload).await
}

/// Emits `event` to listeners matching `target`.
pub async fn emit_to<T: Serialize>(
    client: &HostClient,
    target: &EventTarget,
    event: &str,
    payload: &T,
) -> Result<()> {
    let payload = serde_json::to_value(payload).map_err(InvokeError::Codec)?;
    event::emit_to(client.invoker(), target, event, payload).await
}
