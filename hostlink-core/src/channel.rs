use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::ids::CallbackId;
use crate::registry::{CallbackRegistry, Retention};

const MARKER_PREFIX: &str = "__CHANNEL__:";

/// One hop of a streamed result, as the host posts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ChannelMessage<T> {
    /// Position in the emitter's sequence, starting at zero.
    pub index: usize,
    /// Marks the final envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
    /// Item carried by this envelope; a bare end marker has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<T>,
}

impl<T> ChannelMessage<T> {
    pub fn is_end(&self) -> bool {
        self.end.unwrap_or(false)
    }
}

struct SequenceState<T> {
    next: usize,
    pending: BTreeMap<usize, ChannelMessage<T>>,
    closed: bool,
}

impl<T> SequenceState<T> {
    /// Buffers out-of-order envelopes and forwards the longest contiguous
    /// run. Indices below the cursor are duplicates and are dropped.
    fn accept(&mut self, envelope: ChannelMessage<T>, tx: &mpsc::UnboundedSender<T>) {
        if self.closed || envelope.index < self.next {
            return;
        }
        self.pending.insert(envelope.index, envelope);
        while let Some(envelope) = self.pending.remove(&self.next) {
            self.next += 1;
            let ended = envelope.is_end();
            if let Some(message) = envelope.message {
                if tx.unbounded_send(message).is_err() {
                    // Receiver gone; nothing left to deliver to.
                    self.closed = true;
                    self.pending.clear();
                    return;
                }
            }
            if ended {
                self.closed = true;
                self.pending.clear();
                tx.close_channel();
                return;
            }
        }
    }
}

/// A host-to-guest stream riding on one persistent callback.
///
/// The channel serializes as the marker string `__CHANNEL__:{id}` inside
/// command arguments; the host then posts [`ChannelMessage`] envelopes to
/// that id. Envelopes may arrive out of order and are re-sequenced by
/// `index` before items surface on the [`Stream`]. An `end` envelope closes
/// the stream after delivering its own item, if it carries one.
///
/// Dropping the channel removes the registry entry, so envelopes from a host
/// that keeps sending are discarded as unknown-id traffic.
pub struct Channel<T> {
    id: CallbackId,
    registry: Arc<CallbackRegistry>,
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Channel<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn new(registry: &Arc<CallbackRegistry>) -> Self {
        let (tx, rx) = mpsc::unbounded();
        let state = Mutex::new(SequenceState {
            next: 0,
            pending: BTreeMap::new(),
            closed: false,
        });
        let id = registry.register(
            move |payload| {
                let envelope = match serde_json::from_value::<ChannelMessage<T>>(payload) {
                    Ok(envelope) => envelope,
                    Err(err) => {
                        debug!(%err, "discarding malformed channel envelope");
                        return;
                    }
                };
                state.lock().accept(envelope, &tx);
            },
            Retention::Persistent,
        );
        Channel {
            id,
            registry: registry.clone(),
            rx,
        }
    }

    /// Registry id the host addresses this channel by.
    pub fn id(&self) -> CallbackId {
        self.id
    }
}

/// Extracts the callback id from a serialized channel marker, for hosts
/// unpacking channel-bearing arguments.
pub fn parse_marker(value: &Value) -> Option<CallbackId> {
    let raw = value.as_str()?.strip_prefix(MARKER_PREFIX)?;
    raw.parse::<u32>().ok().map(CallbackId::new)
}

impl<T> Serialize for Channel<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{MARKER_PREFIX}{}", self.id.as_u32()))
    }
}

impl<T> Stream for Channel<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_next_unpin(cx)
    }
}

impl<T> Drop for Channel<T> {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").field("id", &self.id).finish()
    }
}
