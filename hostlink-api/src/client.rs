use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::trace;

use hostlink_core::{
    CallbackRegistry, Channel, HostBridge, HostMetadata, InvokeError, Invoker, InvokerConfig,
};

use crate::Result;

/// Typed facade over an [`Invoker`].
///
/// Cloning is cheap; every clone shares the same callback registry and host
/// bridge. The capability modules all take a `&HostClient`, so one client per
/// process is the usual arrangement.
#[derive(Debug, Clone)]
pub struct HostClient {
    invoker: Invoker,
}

impl HostClient {
    /// Connects a fresh client to `bridge`.
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        HostClient {
            invoker: Invoker::connect(bridge),
        }
    }

    /// Connects with an explicit invoker configuration, e.g. a default
    /// timeout for every call.
    pub fn with_config(bridge: Arc<dyn HostBridge>, config: InvokerConfig) -> Self {
        HostClient {
            invoker: Invoker::connect_with(bridge, config),
        }
    }

    /// Wraps an invoker that already exists.
    pub fn from_invoker(invoker: Invoker) -> Self {
        HostClient { invoker }
    }

    /// The underlying raw invoker.
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Registry shared with the host's callback port.
    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        self.invoker.registry()
    }

    /// Host metadata snapshot (current context label and peers).
    pub fn metadata(&self) -> HostMetadata {
        self.invoker.metadata()
    }

    /// Invokes `command`, serializing `args` and deserializing the reply.
    ///
    /// A unit (or otherwise null) argument set is sent as an empty object,
    /// so hosts always see an args object on the wire.
    pub async fn call<T>(&self, command: &str, args: impl Serialize) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let args = encode_args(args)?;
        trace!(command, "typed call");
        let reply = self.invoker.invoke(command, args).await?;
        serde_json::from_value(reply).map_err(InvokeError::Codec)
    }

    /// A streamed reply channel registered against this client's registry.
    ///
    /// Pass the channel inside a command's args; the host writes envelopes to
    /// its id until it marks the stream ended.
    pub fn channel<T>(&self) -> Channel<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Channel::new(self.invoker.registry())
    }
}

fn encode_args(args: impl Serialize) -> Result<Value> {
    match serde_json::to_value(args).map_err(InvokeError::Codec)? {
        Value::Null => Ok(json!({})),
        value => Ok(value),
    }
}
