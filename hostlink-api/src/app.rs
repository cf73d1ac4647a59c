//! Application-level information and actions.

use serde::Serialize;

use hostlink_core::command;

use crate::client::HostClient;
use crate::Result;

fn cmd(action: &str) -> String {
    command::plugin("app", action)
}

/// UI theme override pushed down to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
    /// Follow the system preference again.
    System,
}

impl Theme {
    fn as_wire(self) -> Option<&'static str> {
        match self {
            Theme::Light => Some("light"),
            Theme::Dark => Some("dark"),
            Theme::System => None,
        }
    }
}

#[derive(Serialize)]
struct ThemeArgs {
    theme: Option<&'static str>,
}

/// Application name from the host's manifest.
pub async fn name(client: &HostClient) -> Result<String> {
    client.call(&cmd("name"), ()).await
}

/// Application version from the host's manifest.
pub async fn version(client: &HostClient) -> Result<String> {
    client.call(&cmd("version"), ()).await
}

/// Version of the host runtime itself.
pub async fn runtime_version(client: &HostClient) -> Result<String> {
    client.call(&cmd("runtime_version"), ()).await
}

/// Shows the application without focusing any particular window.
pub async fn show(client: &HostClient) -> Result<()> {
    client.call(&cmd("show"), ()).await
}

/// Hides the application.
pub async fn hide(client: &HostClient) -> Result<()> {
    client.call(&cmd("hide"), ()).await
}

/// Overrides the UI theme; [`Theme::System`] clears the override.
pub async fn set_theme(client: &HostClient, theme: Theme) -> Result<()> {
    client
        .call(&cmd("set_theme"), ThemeArgs { theme: theme.as_wire() })
        .await
}
