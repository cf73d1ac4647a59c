use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::trace;

use crate::ids::CallbackId;

/// Whether an entry survives dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Removed from the registry the first time it is dispatched.
    OneShot,
    /// Stays registered until explicitly removed.
    Persistent,
}

/// Outcome of routing one host payload through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler was found and invoked.
    Delivered,
    /// No entry exists under that id; the payload was discarded.
    Unknown,
}

impl Dispatch {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Dispatch::Delivered)
    }
}

type Handler = Arc<dyn Fn(Value) + Send + Sync>;

struct CallbackEntry {
    handler: Handler,
    retention: Retention,
}

/// Table of guest callbacks addressable by the host.
///
/// Every value that crosses the boundary guest-to-host carries callback ids
/// minted here; every payload crossing host-to-guest is routed back through
/// [`CallbackRegistry::dispatch`]. The registry is an explicit instance, not
/// process-global state: independent bridges get independent registries.
pub struct CallbackRegistry {
    entries: DashMap<CallbackId, CallbackEntry>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        CallbackRegistry {
            entries: DashMap::new(),
        }
    }

    /// Registers a handler and returns its freshly minted id.
    ///
    /// Ids are random; on the off chance a rolled id is already live, it is
    /// re-rolled rather than ever aliasing two handlers.
    pub fn register<F>(&self, handler: F, retention: Retention) -> CallbackId
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        loop {
            let id = CallbackId::random();
            match self.entries.entry(id) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    slot.insert(CallbackEntry {
                        handler: handler.clone(),
                        retention,
                    });
                    trace!(%id, ?retention, "registered callback");
                    return id;
                }
            }
        }
    }

    /// Routes a host payload to the handler registered under `id`.
    ///
    /// One-shot entries leave the table before their handler runs, so a
    /// handler observing or re-entering the registry never sees its own stale
    /// entry, and concurrent dispatches of the same one-shot id deliver at
    /// most once.
    pub fn dispatch(&self, id: CallbackId, payload: Value) -> Dispatch {
        let handler = {
            let entry = match self.entries.get(&id) {
                Some(entry) => entry,
                None => return Dispatch::Unknown,
            };
            match entry.retention {
                Retention::Persistent => entry.handler.clone(),
                Retention::OneShot => {
                    // The shard guard must be released before remove().
                    drop(entry);
                    match self.entries.remove(&id) {
                        Some((_, removed)) => removed.handler,
                        // Lost the race against another dispatch or remove.
                        None => return Dispatch::Unknown,
                    }
                }
            }
        };
        trace!(%id, "dispatching payload");
        handler(payload);
        Dispatch::Delivered
    }

    /// Removes an entry. Returns whether it was present.
    pub fn remove(&self, id: CallbackId) -> bool {
        let removed = self.entries.remove(&id).is_some();
        if removed {
            trace!(%id, "removed callback");
        }
        removed
    }

    pub fn contains(&self, id: CallbackId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
