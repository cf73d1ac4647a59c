//! Window handles and operations.
//!
//! A [`Window`] is a label plus a client; nothing is resolved until a call
//! goes out. Queries come back in physical pixels, setters accept either
//! coordinate space through [`Size`] and [`Position`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use hostlink_core::command::{self, host_event};
use hostlink_core::EventTarget;

use crate::client::HostClient;
use crate::dpi::{PhysicalPosition, PhysicalSize, Position, ScaleFactor, Size};
use crate::event::{self, Event, EventStream};
use crate::Result;

fn cmd(action: &str) -> String {
    command::plugin("window", action)
}

/// Handle to one host window, addressed by label.
#[derive(Debug, Clone)]
pub struct Window {
    client: HostClient,
    label: String,
}

impl Window {
    /// A handle for `label`. Nothing is checked against the host until the
    /// first operation.
    pub fn new(client: &HostClient, label: impl Into<String>) -> Self {
        Window {
            client: client.clone(),
            label: label.into(),
        }
    }

    /// The window this guest runs in, per host metadata.
    pub fn current(client: &HostClient) -> Self {
        let label = client.metadata().current_context;
        Window::new(client, label)
    }

    /// Handles for every window the host reports.
    pub fn all(client: &HostClient) -> Vec<Window> {
        client
            .metadata()
            .contexts
            .into_iter()
            .map(|label| Window::new(client, label))
            .collect()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Event target addressing exactly this window.
    pub fn target(&self) -> EventTarget {
        EventTarget::Window(self.label.clone())
    }

    pub async fn title(&self) -> Result<String> {
        self.client
            .call(&cmd("title"), json!({"label": self.label}))
            .await
    }

    pub async fn set_title(&self, title: &str) -> Result<()> {
        self.client
            .call(&cmd("set_title"), json!({"label": self.label, "value": title}))
            .await
    }

    pub async fn show(&self) -> Result<()> {
        self.plain(&cmd("show")).await
    }

    pub async fn hide(&self) -> Result<()> {
        self.plain(&cmd("hide")).await
    }

    pub async fn close(&self) -> Result<()> {
        self.plain(&cmd("close")).await
    }

    pub async fn minimize(&self) -> Result<()> {
        self.plain(&cmd("minimize")).await
    }

    pub async fn maximize(&self) -> Result<()> {
        self.plain(&cmd("maximize")).await
    }

    pub async fn unmaximize(&self) -> Result<()> {
        self.plain(&cmd("unmaximize")).await
    }

    pub async fn is_maximized(&self) -> Result<bool> {
        self.plain(&cmd("is_maximized")).await
    }

    pub async fn set_fullscreen(&self, fullscreen: bool) -> Result<()> {
        self.client
            .call(
                &cmd("set_fullscreen"),
                json!({"label": self.label, "value": fullscreen}),
            )
            .await
    }

    pub async fn is_fullscreen(&self) -> Result<bool> {
        self.plain(&cmd("is_fullscreen")).await
    }

    pub async fn set_focus(&self) -> Result<()> {
        self.plain(&cmd("set_focus")).await
    }

    pub async fn center(&self) -> Result<()> {
        self.plain(&cmd("center")).await
    }

    pub async fn set_always_on_top(&self, on_top: bool) -> Result<()> {
        self.client
            .call(
                &cmd("set_always_on_top"),
                json!({"label": self.label, "value": on_top}),
            )
            .await
    }

    /// Size of the client area, excluding decorations.
    pub async fn inner_size(&self) -> Result<PhysicalSize> {
        self.plain(&cmd("inner_size")).await
    }

    /// Size of the whole window including decorations.
    pub async fn outer_size(&self) -> Result<PhysicalSize> {
        self.plain(&cmd("outer_size")).await
    }

    /// Top-left corner of the client area, relative to the desktop.
    pub async fn inner_position(&self) -> Result<PhysicalPosition> {
        self.plain(&cmd("inner_position")).await
    }

    pub async fn set_position(&self, position: impl Into<Position>) -> Result<()> {
        self.client
            .call(
                &cmd("set_position"),
                json!({"label": self.label, "value": position.into()}),
            )
            .await
    }

    pub async fn set_size(&self, size: impl Into<Size>) -> Result<()> {
        self.client
            .call(&cmd("set_size"), json!({"label": self.label, "value": size.into()}))
            .await
    }

    /// Ratio mapping this window's physical pixels to logical ones.
    pub async fn scale_factor(&self) -> Result<ScaleFactor> {
        self.plain(&cmd("scale_factor")).await
    }

    /// Subscribes to `event` deliveries addressed to this window.
    pub async fn listen<T>(&self, event: &str) -> Result<EventStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        event::listen_to(&self.client, event, self.target()).await
    }

    /// Awaits the next `event` delivery addressed to this window.
    pub async fn once<T>(&self, event: &str) -> Result<Event<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        event::once_to(&self.client, event, self.target()).await
    }

    /// Emits `event` to listeners scoped to this window.
    pub async fn emit<T: Serialize>(&self, event: &str, payload: &T) -> Result<()> {
        event::emit_to(&self.client, &self.target(), event, payload).await
    }

    /// Stream of resize notifications, in physical pixels.
    pub async fn on_resized(&self) -> Result<EventStream<PhysicalSize>> {
        self.listen(host_event::RESIZED).await
    }

    /// Stream of move notifications, in physical pixels.
    pub async fn on_moved(&self) -> Result<EventStream<PhysicalPosition>> {
        self.listen(host_event::MOVED).await
    }

    async fn plain<T: DeserializeOwned>(&self, command: &str) -> Result<T> {
        self.client.call(command, json!({"label": self.label})).await
    }
}

/// One display attached to the host machine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    name: Option<String>,
    size: PhysicalSize,
    position: PhysicalPosition,
    scale_factor: ScaleFactor,
}

impl Monitor {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn size(&self) -> &PhysicalSize {
        &self.size
    }

    pub fn position(&self) -> &PhysicalPosition {
        &self.position
    }

    pub fn scale_factor(&self) -> ScaleFactor {
        self.scale_factor
    }
}

/// Monitor the current window resides on, when the host can tell.
pub async fn current_monitor(client: &HostClient) -> Result<Option<Monitor>> {
    client.call(&cmd("current_monitor"), ()).await
}

/// The system's primary monitor, if any.
pub async fn primary_monitor(client: &HostClient) -> Result<Option<Monitor>> {
    client.call(&cmd("primary_monitor"), ()).await
}

/// Every monitor attached to the system.
pub async fn available_monitors(client: &HostClient) -> Result<Vec<Monitor>> {
    client.call(&cmd("available_monitors"), ()).await
}
