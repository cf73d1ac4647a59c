//! Typed capability bindings over the hostlink invocation protocol.
//!
//! Where `hostlink-core` moves raw [`serde_json::Value`]s, this crate gives
//! each host capability a strongly typed surface: a [`HostClient`] facade
//! that serializes arguments and deserializes replies, typed event streams,
//! and one module per command namespace (`window`, `fs`, `dialog`, ...).
//!
//! ```no_run
//! use std::sync::Arc;
//! use hostlink_api::{window::Window, HostClient};
//! use hostlink_core::HostBridge;
//!
//! # async fn demo(bridge: Arc<dyn HostBridge>) -> hostlink_api::Result<()> {
//! let client = HostClient::new(bridge);
//! let window = Window::current(&client);
//! window.set_title("hostlink").await?;
//! let size = window.inner_size().await?;
//! println!("{}x{}", size.width(), size.height());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod client;
pub mod clipboard;
pub mod dialog;
pub mod dpi;
pub mod event;
pub mod fs;
pub mod global_shortcut;
pub mod os;
pub mod path;
pub mod process;
pub mod window;

pub use client::HostClient;
pub use event::{Event, EventStream};
pub use hostlink_core::{EventTarget, InvokeError};

/// Result alias used across every capability module.
pub type Result<T> = std::result::Result<T, InvokeError>;
