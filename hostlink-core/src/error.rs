use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::bridge::BridgeError;

/// Everything that can go wrong with one invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The request never reached the host.
    #[error("bridge failure: {0}")]
    Transport(#[from] BridgeError),

    /// The host evaluated the command and reported failure. The payload is
    /// whatever the host sent, verbatim.
    #[error("host reported failure: {0}")]
    Host(Value),

    /// The reply path was torn down before either callback fired.
    #[error("invocation canceled before settlement")]
    Canceled,

    /// No reply arrived within the configured limit.
    #[error("no host reply within {0:?}")]
    TimedOut(Duration),

    /// The host replied with a payload that does not match the expected
    /// contract (a listen ack that is not a token, and the like).
    #[error("malformed host payload: {0}")]
    Codec(#[from] serde_json::Error),
}

impl InvokeError {
    /// The host's failure payload, when this is a host-reported failure.
    pub fn host_payload(&self) -> Option<&Value> {
        match self {
            InvokeError::Host(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, InvokeError::Transport(_))
    }
}
