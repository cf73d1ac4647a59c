//! System clipboard access.

use serde::Serialize;

use hostlink_core::command;

use crate::client::HostClient;
use crate::Result;

fn cmd(action: &str) -> String {
    command::plugin("clipboard", action)
}

#[derive(Serialize)]
struct TextArgs<'a> {
    text: &'a str,
}

/// Writes plain text to the clipboard.
pub async fn write_text(client: &HostClient, text: &str) -> Result<()> {
    client.call(&cmd("write_text"), TextArgs { text }).await
}

/// The clipboard contents as plain text.
pub async fn read_text(client: &HostClient) -> Result<String> {
    client.call(&cmd("read_text"), ()).await
}

/// Empties the clipboard.
pub async fn clear(client: &HostClient) -> Result<()> {
    client.call(&cmd("clear"), ()).await
}
