use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::ids::CallbackId;
use crate::registry::{CallbackRegistry, Dispatch};

/// Failure raised by the posting machinery itself, before the host ever
/// evaluates the command.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no host attached to this bridge")]
    Unavailable,
    #[error("host bridge closed")]
    Closed,
    #[error("host rejected request: {0}")]
    Rejected(String),
}

/// One guest-to-host command posting.
///
/// `success_id` and `error_id` name the one-shot callback pair registered for
/// this invocation; the host settles the call by dispatching exactly one of
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    pub command: String,
    pub success_id: CallbackId,
    pub error_id: CallbackId,
    #[serde(default)]
    pub args: Value,
}

/// Host-published facts about the context the guest runs in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMetadata {
    /// Label of the context this guest is embedded in.
    pub current_context: String,
    /// Labels of every context the host manages.
    pub contexts: Vec<String>,
}

impl Default for HostMetadata {
    fn default() -> Self {
        HostMetadata {
            current_context: "main".to_owned(),
            contexts: vec!["main".to_owned()],
        }
    }
}

/// Handle a host implementation uses to deliver payloads back into the guest
/// registry. Cheap to clone; all clones feed the same registry.
#[derive(Debug, Clone)]
pub struct CallbackPort {
    registry: Arc<CallbackRegistry>,
}

impl CallbackPort {
    pub fn new(registry: Arc<CallbackRegistry>) -> Self {
        CallbackPort { registry }
    }

    /// Delivers one payload to the callback registered under `id`.
    ///
    /// Replies landing on retired ids (a settled invocation, a removed
    /// subscription) are reported as [`Dispatch::Unknown`] and logged, never
    /// raised: a slow host answering late is not an error on the guest side.
    pub fn dispatch(&self, id: CallbackId, payload: Value) -> Dispatch {
        let outcome = self.registry.dispatch(id, payload);
        if outcome == Dispatch::Unknown {
            debug!(%id, "discarding payload for unregistered callback id");
        }
        outcome
    }
}

/// The seam between the guest runtime and whatever hosts it.
///
/// `post` is synchronous and must not block: a bridge either accepts the
/// request for asynchronous processing or fails immediately. Results flow
/// back later through the [`CallbackPort`] handed over in `attach`.
pub trait HostBridge: Send + Sync {
    /// Called once when a guest runtime binds to this bridge. Bridges that
    /// never deliver callbacks may ignore it.
    fn attach(&self, port: CallbackPort) {
        let _ = port;
    }

    /// Hands one request to the host. A sync error here means the request
    /// never left the guest.
    fn post(&self, request: InvokeRequest) -> Result<(), BridgeError>;

    /// Context facts, available without a round trip.
    fn metadata(&self) -> HostMetadata {
        HostMetadata::default()
    }
}
