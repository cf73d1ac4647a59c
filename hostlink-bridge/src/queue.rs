use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use hostlink_core::{
    BridgeError, CallbackId, CallbackPort, Dispatch, HostBridge, InvokeRequest,
};

#[derive(Debug)]
struct Shared {
    port: OnceLock<CallbackPort>,
}

/// Builds a connected guest/host pair over an unbounded queue.
///
/// The [`QueueBridge`] goes to the guest runtime; the [`HostEndpoint`] stays
/// with the test or host loop, which pulls requests off the queue and answers
/// them through the attached port at its own pace. Dropping the endpoint
/// closes the queue, after which every post fails with
/// [`BridgeError::Closed`].
pub fn pair() -> (QueueBridge, HostEndpoint) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared {
        port: OnceLock::new(),
    });
    (
        QueueBridge {
            tx,
            shared: shared.clone(),
        },
        HostEndpoint { rx, shared },
    )
}

/// Guest half of a [`pair`].
#[derive(Debug, Clone)]
pub struct QueueBridge {
    tx: mpsc::UnboundedSender<InvokeRequest>,
    shared: Arc<Shared>,
}

impl HostBridge for QueueBridge {
    fn attach(&self, port: CallbackPort) {
        let _ = self.shared.port.set(port);
    }

    fn post(&self, request: InvokeRequest) -> Result<(), BridgeError> {
        self.tx.send(request).map_err(|_| BridgeError::Closed)
    }
}

/// Host half of a [`pair`].
#[derive(Debug)]
pub struct HostEndpoint {
    rx: mpsc::UnboundedReceiver<InvokeRequest>,
    shared: Arc<Shared>,
}

impl HostEndpoint {
    /// Waits for the next posted request. `None` once every bridge clone is
    /// gone.
    pub async fn recv(&mut self) -> Option<InvokeRequest> {
        self.rx.recv().await
    }

    /// Takes a queued request without waiting.
    pub fn try_recv(&mut self) -> Option<InvokeRequest> {
        self.rx.try_recv().ok()
    }

    /// Port into the guest registry, present once a runtime has attached.
    pub fn port(&self) -> Option<CallbackPort> {
        self.shared.port.get().cloned()
    }

    /// Settles `request` through its success callback.
    pub fn resolve(&self, request: &InvokeRequest, value: Value) -> Dispatch {
        self.dispatch(request.success_id, value)
    }

    /// Settles `request` through its error callback.
    pub fn reject(&self, request: &InvokeRequest, payload: Value) -> Dispatch {
        self.dispatch(request.error_id, payload)
    }

    fn dispatch(&self, id: CallbackId, payload: Value) -> Dispatch {
        match self.port() {
            Some(port) => port.dispatch(id, payload),
            None => {
                debug!(%id, "no guest attached; reply dropped");
                Dispatch::Unknown
            }
        }
    }
}
