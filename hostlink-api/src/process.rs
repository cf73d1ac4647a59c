//! Process control for the application itself.

use serde::Serialize;

use hostlink_core::command;

use crate::client::HostClient;
use crate::Result;

fn cmd(action: &str) -> String {
    command::plugin("process", action)
}

#[derive(Serialize)]
struct ExitArgs {
    code: i32,
}

/// Asks the host to exit the application with `code`.
///
/// A compliant host tears the guest down before replying, so this future
/// normally never resolves; a resolved `Ok` means the host declined.
pub async fn exit(client: &HostClient, code: i32) -> Result<()> {
    client.call(&cmd("exit"), ExitArgs { code }).await
}

/// Exits and restarts the application.
pub async fn relaunch(client: &HostClient) -> Result<()> {
    client.call(&cmd("relaunch"), ()).await
}
