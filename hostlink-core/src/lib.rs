//! Guest-side runtime for talking to a desktop host over an asynchronous
//! IPC boundary.
//!
//! The pieces compose bottom-up: a [`CallbackRegistry`] holds every handler
//! the host may address, an [`Invoker`] turns command postings into futures
//! by registering one-shot success/error callback pairs, and the [`event`]
//! module layers persistent subscriptions on top of plain invocations.
//! [`Channel`] covers streamed results. The host side of the boundary is
//! abstracted behind [`HostBridge`].

pub mod bridge;
pub mod channel;
pub mod command;
pub mod error;
pub mod event;
pub mod ids;
pub mod invoke;
pub mod registry;

pub use bridge::{BridgeError, CallbackPort, HostBridge, HostMetadata, InvokeRequest};
pub use channel::{Channel, ChannelMessage};
pub use error::InvokeError;
pub use event::{emit, emit_to, listen, once, EventMessage, EventTarget, Subscription};
pub use ids::{CallbackId, EventToken};
pub use invoke::{Invoker, InvokerConfig};
pub use registry::{CallbackRegistry, Dispatch, Retention};
