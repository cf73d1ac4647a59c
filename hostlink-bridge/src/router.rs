use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use hostlink_core::{
    command, CallbackId, CallbackPort, EventTarget, EventToken, HostBridge, HostMetadata,
    InvokeRequest,
};

/// One host-side command implementation.
///
/// `Ok` settles the invocation through its success callback, `Err` through
/// its error callback; the `Err` payload reaches the guest verbatim.
#[async_trait]
pub trait HostCommand: Send + Sync {
    async fn handle(&self, args: Value) -> Result<Value, Value>;
}

struct FnCommand<F> {
    handler: F,
}

#[async_trait]
impl<F, Fut> HostCommand for FnCommand<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, Value>> + Send,
{
    async fn handle(&self, args: Value) -> Result<Value, Value> {
        (self.handler)(args).await
    }
}

#[derive(Clone)]
struct Listener {
    token: EventToken,
    target: EventTarget,
    callback: CallbackId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListenArgs {
    event: String,
    #[serde(default)]
    target: Option<EventTarget>,
    handler: CallbackId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnlistenArgs {
    event: String,
    event_id: EventToken,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmitArgs {
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    target: Option<EventTarget>,
}

/// In-process host: a command table plus a working event hub.
///
/// Custom commands run as spawned tasks, so the router must live inside a
/// tokio runtime. The event built-ins (`plugin:event|*`) are handled inline
/// and always win over a registered command of the same name.
pub struct HostRouter {
    commands: DashMap<String, Arc<dyn HostCommand>>,
    listeners: DashMap<String, Vec<Listener>>,
    next_token: AtomicU32,
    port: OnceLock<CallbackPort>,
    metadata: HostMetadata,
}

impl HostRouter {
    pub fn new() -> Self {
        Self::with_metadata(HostMetadata::default())
    }

    pub fn with_metadata(metadata: HostMetadata) -> Self {
        HostRouter {
            commands: DashMap::new(),
            listeners: DashMap::new(),
            next_token: AtomicU32::new(1),
            port: OnceLock::new(),
            metadata,
        }
    }

    /// Registers a command implementation under `name`.
    pub fn handle<C>(&self, name: impl Into<String>, command: C)
    where
        C: HostCommand + 'static,
    {
        self.commands.insert(name.into(), Arc::new(command));
    }

    /// Registers an async closure as a command.
    pub fn handle_fn<F, Fut>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, Value>> + Send + 'static,
    {
        self.handle(name, FnCommand { handler });
    }

    /// Port into the attached guest registry, once a runtime has connected.
    pub fn port(&self) -> Option<CallbackPort> {
        self.port.get().cloned()
    }

    /// Number of live subscriptions for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .get(event)
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }

    /// Delivers a host-originated event to every listener of `event`.
    /// Returns how many handlers it reached.
    pub fn publish(&self, event: &str, payload: Value) -> usize {
        self.fan_out(event, None, payload)
    }

    /// Delivers a host-originated event to listeners matching `target`.
    pub fn publish_to(&self, target: &EventTarget, event: &str, payload: Value) -> usize {
        self.fan_out(event, Some(target), payload)
    }

    fn fan_out(&self, event: &str, addressed: Option<&EventTarget>, payload: Value) -> usize {
        let Some(port) = self.port.get() else {
            debug!(event, "no guest attached; event dropped");
            return 0;
        };
        // Snapshot before dispatching; handlers may re-enter the router.
        let recipients: Vec<(EventToken, CallbackId)> = match self.listeners.get(event) {
            Some(listeners) => listeners
                .iter()
                .filter(|listener| match addressed {
                    None => true,
                    Some(target) => reaches(&listener.target, target),
                })
                .map(|listener| (listener.token, listener.callback))
                .collect(),
            None => Vec::new(),
        };

        let mut delivered = 0;
        for (token, callback) in recipients {
            let message = json!({ "event": event, "id": token, "payload": payload });
            if port.dispatch(callback, message).is_delivered() {
                delivered += 1;
            }
        }
        delivered
    }

    fn handle_listen(&self, port: &CallbackPort, request: InvokeRequest) {
        let Some(args) = decode::<ListenArgs>(port, &request.command, request.error_id, request.args)
        else {
            return;
        };
        let token = EventToken::new(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.listeners.entry(args.event.clone()).or_default().push(Listener {
            token,
            target: args.target.unwrap_or_default(),
            callback: args.handler,
        });
        debug!(event = %args.event, %token, "listener registered");
        port.dispatch(request.success_id, json!(token));
    }

    fn handle_unlisten(&self, port: &CallbackPort, request: InvokeRequest) {
        let Some(args) =
            decode::<UnlistenArgs>(port, &request.command, request.error_id, request.args)
        else {
            return;
        };
        let mut removed = false;
        if let Some(mut listeners) = self.listeners.get_mut(&args.event) {
            let before = listeners.len();
            listeners.retain(|listener| listener.token != args.event_id);
            removed = listeners.len() != before;
        }
        if !removed {
            // Unlisten is idempotent; retiring a gone subscription is fine.
            debug!(event = %args.event, token = %args.event_id, "unlisten for unknown token");
        }
        port.dispatch(request.success_id, json!(null));
    }

    fn handle_emit(&self, port: &CallbackPort, request: InvokeRequest) {
        let Some(args) = decode::<EmitArgs>(port, &request.command, request.error_id, request.args)
        else {
            return;
        };
        match args.target {
            Some(target) => self.fan_out(&args.event, Some(&target), args.payload),
            None => self.fan_out(&args.event, None, args.payload),
        };
        port.dispatch(request.success_id, json!(null));
    }

    fn dispatch_command(&self, port: &CallbackPort, request: InvokeRequest) {
        let Some(handler) = self.commands.get(&request.command).map(|entry| Arc::clone(&*entry))
        else {
            warn!(command = %request.command, "unknown command");
            port.dispatch(
                request.error_id,
                json!({"error": format!("unknown command: {}", request.command)}),
            );
            return;
        };

        let port = port.clone();
        tokio::spawn(async move {
            match handler.handle(request.args).await {
                Ok(value) => port.dispatch(request.success_id, value),
                Err(payload) => port.dispatch(request.error_id, payload),
            };
        });
    }
}

impl HostBridge for HostRouter {
    fn attach(&self, port: CallbackPort) {
        let _ = self.port.set(port);
    }

    fn post(&self, request: InvokeRequest) -> Result<(), hostlink_core::BridgeError> {
        let port = self
            .port
            .get()
            .cloned()
            .ok_or(hostlink_core::BridgeError::Unavailable)?;
        match request.command.as_str() {
            command::EVENT_LISTEN => self.handle_listen(&port, request),
            command::EVENT_UNLISTEN => self.handle_unlisten(&port, request),
            command::EVENT_EMIT | command::EVENT_EMIT_TO => self.handle_emit(&port, request),
            _ => self.dispatch_command(&port, request),
        }
        Ok(())
    }

    fn metadata(&self) -> HostMetadata {
        self.metadata.clone()
    }
}

impl Default for HostRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRouter")
            .field("commands", &self.commands.len())
            .field("events", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

fn decode<T: DeserializeOwned>(
    port: &CallbackPort,
    command: &str,
    error_id: CallbackId,
    args: Value,
) -> Option<T> {
    match serde_json::from_value(args) {
        Ok(args) => Some(args),
        Err(err) => {
            warn!(command, %err, "malformed arguments");
            port.dispatch(
                error_id,
                json!({"error": format!("invalid arguments for {command}: {err}")}),
            );
            None
        }
    }
}

fn target_label(target: &EventTarget) -> Option<&str> {
    match target {
        EventTarget::AnyLabel(label)
        | EventTarget::Window(label)
        | EventTarget::Webview(label)
        | EventTarget::WebviewWindow(label) => Some(label),
        EventTarget::Any | EventTarget::App => None,
    }
}

/// Whether an event addressed to `addressed` lands on a listener scoped to
/// `listener`.
fn reaches(listener: &EventTarget, addressed: &EventTarget) -> bool {
    if matches!(listener, EventTarget::Any) || matches!(addressed, EventTarget::Any) {
        return true;
    }
    if listener == addressed {
        return true;
    }
    // AnyLabel bridges target kinds that share a label.
    match (listener, addressed) {
        (EventTarget::AnyLabel(label), other) | (other, EventTarget::AnyLabel(label)) => {
            target_label(other) == Some(label)
        }
        _ => false,
    }
}
