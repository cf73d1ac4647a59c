use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::command;
use crate::error::InvokeError;
use crate::ids::{CallbackId, EventToken};
use crate::invoke::Invoker;
use crate::registry::Retention;

/// Where an emitted event should land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label")]
pub enum EventTarget {
    /// Every listener, whatever it registered against.
    Any,
    /// Any context whose label matches, regardless of context kind.
    AnyLabel(String),
    /// The application itself.
    App,
    /// One window by label.
    Window(String),
    /// One webview by label.
    Webview(String),
    /// A combined webview window by label.
    WebviewWindow(String),
}

impl Default for EventTarget {
    fn default() -> Self {
        EventTarget::Any
    }
}

/// One delivered event, as it arrives from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    /// Name the emitter published under.
    pub event: String,
    /// Token of the subscription this delivery belongs to.
    pub id: EventToken,
    /// Emitter payload, verbatim.
    pub payload: Value,
}

struct SubscriptionInner {
    invoker: Invoker,
    event: String,
    token: EventToken,
    callback: CallbackId,
    released: AtomicBool,
}

impl SubscriptionInner {
    /// Stops local delivery right away and posts the unlisten without
    /// waiting for the host's verdict.
    fn release_detached(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.invoker.registry().remove(self.callback);
        self.invoker
            .invoke_detached(command::EVENT_UNLISTEN, unlisten_args(&self.event, self.token));
        debug!(event = %self.event, token = %self.token, "subscription released");
    }
}

impl Drop for SubscriptionInner {
    fn drop(&mut self) {
        self.release_detached();
    }
}

/// A live event subscription.
///
/// Clones share one registration. The subscription ends when `unlisten` is
/// called or the last clone drops; either way the local handler entry is
/// removed, so whether the host processed the unlisten only affects host-side
/// bookkeeping, never local delivery.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    /// Event name this subscription was registered under.
    pub fn event(&self) -> &str {
        &self.inner.event
    }

    /// Host-assigned token for this subscription.
    pub fn token(&self) -> EventToken {
        self.inner.token
    }

    /// Registry id of the underlying persistent handler.
    pub fn callback_id(&self) -> CallbackId {
        self.inner.callback
    }

    /// Whether the subscription has not been released yet.
    pub fn is_active(&self) -> bool {
        !self.inner.released.load(Ordering::SeqCst)
    }

    /// Retires this subscription.
    ///
    /// The local handler entry is removed once the host round trip has been
    /// attempted, regardless of its outcome; the returned error only reports
    /// whether the host acknowledged the unlisten. Calling this twice, or
    /// after the handler fired for a one-shot wrapper, is a no-op.
    pub async fn unlisten(&self) -> Result<(), InvokeError> {
        if self.inner.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let result = self
            .inner
            .invoker
            .invoke(
                command::EVENT_UNLISTEN,
                unlisten_args(&self.inner.event, self.inner.token),
            )
            .await;
        self.inner.invoker.registry().remove(self.inner.callback);
        result.map(|_| ())
    }

    fn release_detached(&self) {
        self.inner.release_detached();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.inner.event)
            .field("token", &self.inner.token)
            .field("active", &self.is_active())
            .finish()
    }
}

fn unlisten_args(event: &str, token: EventToken) -> Value {
    json!({ "event": event, "eventId": token })
}

/// Subscribes `handler` to `event`, scoped to `target`.
///
/// The handler is registered as a persistent callback before the listen
/// command is posted, so deliveries racing the acknowledgement are not lost.
/// If the host refuses the subscription the handler entry is removed again
/// and the failure is returned.
pub async fn listen<F>(
    invoker: &Invoker,
    event: &str,
    target: EventTarget,
    handler: F,
) -> Result<Subscription, InvokeError>
where
    F: Fn(EventMessage) + Send + Sync + 'static,
{
    let registry = invoker.registry().clone();
    let callback = registry.register(
        move |payload| match serde_json::from_value::<EventMessage>(payload) {
            Ok(message) => handler(message),
            Err(err) => debug!(%err, "discarding malformed event envelope"),
        },
        Retention::Persistent,
    );

    let ack = invoker
        .invoke(
            command::EVENT_LISTEN,
            json!({ "event": event, "target": target, "handler": callback }),
        )
        .await;
    let ack = match ack {
        Ok(value) => value,
        Err(err) => {
            registry.remove(callback);
            return Err(err);
        }
    };
    let token = match serde_json::from_value::<EventToken>(ack) {
        Ok(token) => token,
        Err(err) => {
            registry.remove(callback);
            return Err(InvokeError::Codec(err));
        }
    };

    debug!(event, %token, "listening");
    Ok(Subscription {
        inner: Arc::new(SubscriptionInner {
            invoker: invoker.clone(),
            event: event.to_owned(),
            token,
            callback,
            released: AtomicBool::new(false),
        }),
    })
}

/// Subscribes `handler` for exactly one delivery.
///
/// The first event forwards to `handler` and triggers a detached unlisten;
/// duplicates that race the teardown are swallowed by a local gate, so the
/// handler can never run twice even if the host keeps delivering.
pub async fn once<F>(
    invoker: &Invoker,
    event: &str,
    target: EventTarget,
    handler: F,
) -> Result<Subscription, InvokeError>
where
    F: Fn(EventMessage) + Send + Sync + 'static,
{
    let fired = Arc::new(AtomicBool::new(false));
    let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

    let gate = fired.clone();
    let teardown = slot.clone();
    let subscription = listen(invoker, event, target, move |message| {
        if gate.swap(true, Ordering::SeqCst) {
            return;
        }
        handler(message);
        // Absent while the listen ack is still in flight; the registration
        // code below covers that window.
        if let Some(subscription) = teardown.lock().take() {
            subscription.release_detached();
        }
    })
    .await?;

    slot.lock().replace(subscription.clone());
    if fired.load(Ordering::SeqCst) {
        if let Some(subscription) = slot.lock().take() {
            subscription.release_detached();
        }
    }
    Ok(subscription)
}

/// Broadcasts `event` to every listener.
pub async fn emit(invoker: &Invoker, event: &str, payload: Value) -> Result<(), InvokeError> {
    invoker
        .invoke(command::EVENT_EMIT, json!({ "event": event, "payload": payload }))
        .await
        .map(|_| ())
}

/// Emits `event` to one addressed target.
pub async fn emit_to(
    invoker: &Invoker,
    target: &EventTarget,
    event: &str,
    payload: Value,
) -> Result<(), InvokeError> {
    invoker
        .invoke(
            command::EVENT_EMIT_TO,
            json!({ "event": event, "target": target, "payload": payload }),
        )
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_target_wire_shape() {
        assert_eq!(
            serde_json::to_value(EventTarget::Any).unwrap(),
            json!({"kind": "Any"})
        );
        assert_eq!(
            serde_json::to_value(EventTarget::Window("settings".to_owned())).unwrap(),
            json!({"kind": "Window", "label": "settings"})
        );
        assert_eq!(
            serde_json::to_value(EventTarget::AnyLabel("main".to_owned())).unwrap(),
            json!({"kind": "AnyLabel", "label": "main"})
        );

        let parsed: EventTarget =
            serde_json::from_value(json!({"kind": "Webview", "label": "editor"})).unwrap();
        assert_eq!(parsed, EventTarget::Webview("editor".to_owned()));
    }

    #[test]
    fn test_event_target_default_is_any() {
        assert_eq!(EventTarget::default(), EventTarget::Any);
    }

    #[test]
    fn test_event_message_wire_shape() {
        let message: EventMessage = serde_json::from_value(json!({
            "event": "download-progress",
            "id": 12,
            "payload": {"done": 40, "total": 100},
        }))
        .unwrap();
        assert_eq!(message.event, "download-progress");
        assert_eq!(message.id, EventToken::new(12));
        assert_eq!(message.payload, json!({"done": 40, "total": 100}));
    }

    #[test]
    fn test_unlisten_args_shape() {
        assert_eq!(
            unlisten_args("tick", EventToken::new(5)),
            json!({"event": "tick", "eventId": 5})
        );
    }
}
