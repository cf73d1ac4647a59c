//! Global keyboard shortcuts.
//!
//! Registration hands the host a streamed reply channel; each press and
//! release of a registered chord arrives as a [`ShortcutEvent`] on the
//! returned stream. Dropping the stream unregisters its shortcuts.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;

use hostlink_core::{command, Channel};

use crate::client::HostClient;
use crate::Result;

fn cmd(action: &str) -> String {
    command::plugin("global-shortcut", action)
}

/// Whether a chord went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortcutState {
    Pressed,
    Released,
}

/// One activation of a registered shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutEvent {
    /// The chord as registered, e.g. `"CmdOrCtrl+Shift+P"`.
    pub shortcut: String,
    pub state: ShortcutState,
}

#[derive(Serialize)]
struct RegisterArgs<'a> {
    shortcuts: &'a [String],
    handler: &'a Channel<ShortcutEvent>,
}

#[derive(Serialize)]
struct ShortcutArg<'a> {
    shortcut: &'a str,
}

/// Live registration feeding activations as a stream.
///
/// The stream ends if the host closes the channel; dropping it posts a
/// detached unregister for every chord it carried.
#[derive(Debug)]
pub struct ShortcutStream {
    client: HostClient,
    shortcuts: Vec<String>,
    channel: Channel<ShortcutEvent>,
}

impl ShortcutStream {
    /// Chords this registration covers.
    pub fn shortcuts(&self) -> &[String] {
        &self.shortcuts
    }
}

impl Stream for ShortcutStream {
    type Item = ShortcutEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.channel.poll_next_unpin(cx)
    }
}

impl Drop for ShortcutStream {
    fn drop(&mut self) {
        self.client
            .invoker()
            .invoke_detached(&cmd("unregister"), json!({"shortcuts": self.shortcuts}));
    }
}

/// Registers one shortcut and streams its activations.
pub async fn register(client: &HostClient, shortcut: &str) -> Result<ShortcutStream> {
    register_all(client, [shortcut]).await
}

/// Registers several shortcuts onto a single stream.
pub async fn register_all<I, S>(client: &HostClient, shortcuts: I) -> Result<ShortcutStream>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let shortcuts: Vec<String> = shortcuts.into_iter().map(Into::into).collect();
    let channel = client.channel::<ShortcutEvent>();
    client
        .call::<()>(
            &cmd("register"),
            RegisterArgs {
                shortcuts: &shortcuts,
                handler: &channel,
            },
        )
        .await?;

    Ok(ShortcutStream {
        client: client.clone(),
        shortcuts,
        channel,
    })
}

/// Whether this application currently holds `shortcut`.
pub async fn is_registered(client: &HostClient, shortcut: &str) -> Result<bool> {
    client.call(&cmd("is_registered"), ShortcutArg { shortcut }).await
}

/// Releases one shortcut. Safe to call for chords that are already gone.
pub async fn unregister(client: &HostClient, shortcut: &str) -> Result<()> {
    client
        .call(&cmd("unregister"), json!({"shortcuts": [shortcut]}))
        .await
}

/// Releases every shortcut this application registered.
pub async fn unregister_all(client: &HostClient) -> Result<()> {
    client.call(&cmd("unregister_all"), ()).await
}
