use std::fmt;

use serde::{Deserialize, Serialize};

/// Correlates a host reply with a registered guest callback.
///
/// Ids are drawn at random from the full 32-bit space rather than allocated
/// sequentially, so concurrent registries on the same page cannot collide by
/// construction order. Collisions against live entries are re-rolled at
/// registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(u32);

/// Host-assigned token naming one event subscription.
///
/// The guest treats this as opaque; it only ever travels back to the host in
/// an unlisten request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventToken(u32);

impl CallbackId {
    pub fn new(value: u32) -> Self {
        CallbackId(value)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn random() -> Self {
        CallbackId(rand::random::<u32>())
    }
}

impl EventToken {
    pub fn new(value: u32) -> Self {
        EventToken(value)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackId({})", self.0)
    }
}

impl fmt::Display for EventToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventToken({})", self.0)
    }
}

impl From<u32> for CallbackId {
    fn from(value: u32) -> Self {
        CallbackId::new(value)
    }
}

impl From<u32> for EventToken {
    fn from(value: u32) -> Self {
        EventToken::new(value)
    }
}
