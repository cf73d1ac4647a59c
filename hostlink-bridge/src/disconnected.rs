use tracing::debug;

use hostlink_core::{BridgeError, HostBridge, InvokeRequest};

/// A bridge with no host behind it. Every post fails synchronously with
/// [`BridgeError::Unavailable`], which makes it the fixture of choice for
/// exercising sync-failure cleanup paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedBridge;

impl DisconnectedBridge {
    pub fn new() -> Self {
        DisconnectedBridge
    }
}

impl HostBridge for DisconnectedBridge {
    fn post(&self, request: InvokeRequest) -> Result<(), BridgeError> {
        debug!(command = %request.command, "no host attached");
        Err(BridgeError::Unavailable)
    }
}
