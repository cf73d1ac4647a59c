//! In-process hosts for hostlink runtimes.
//!
//! [`HostRouter`] is a full host: a command table plus a working event hub.
//! [`pair`] yields a queue-backed bridge whose requests the caller answers by
//! hand, and [`DisconnectedBridge`] fails every post. Production embedders
//! implement `hostlink_core::HostBridge` over their real IPC instead.

pub mod disconnected;
pub mod queue;
pub mod router;

pub use disconnected::DisconnectedBridge;
pub use queue::{pair, HostEndpoint, QueueBridge};
pub use router::{HostCommand, HostRouter};
