// Typed Event Streams
// Consumes host events through typed subscriptions
// - EventStream over a named event
// - one-shot once() futures
// - window-scoped emit loopback

use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::yield_now;
use tracing::info;

use hostlink_api::window::Window;
use hostlink_api::{event, HostClient};
use hostlink_bridge::HostRouter;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Progress {
    done: u32,
    total: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("📡 hostlink - Event Streams Example");
    info!("===================================");

    let router = Arc::new(HostRouter::new());
    let client = HostClient::new(router.clone());

    info!("");
    info!("📝 Streaming download progress");
    let mut progress = event::listen::<Progress>(&client, "download://progress").await?;

    // Host side: report progress in steps.
    let host = router.clone();
    tokio::spawn(async move {
        for done in 1..=5 {
            host.publish("download://progress", json!({"done": done, "total": 5}));
            yield_now().await;
        }
    });

    for _ in 0..5 {
        if let Some(report) = progress.next().await {
            info!("   {}/{} downloaded", report.payload.done, report.payload.total);
        }
    }
    progress.unlisten().await?;
    info!("✅ Stream retired, {} listeners left", router.listener_count("download://progress"));

    info!("");
    info!("📝 Waiting on a single readiness event");
    let host = router.clone();
    tokio::spawn(async move {
        while host.listener_count("ready") == 0 {
            yield_now().await;
        }
        host.publish("ready", json!({"done": 5, "total": 5}));
    });
    let ready = event::once::<Progress>(&client, "ready").await?;
    info!("✅ Ready after {}/{}", ready.payload.done, ready.payload.total);

    info!("");
    info!("📝 Window-scoped loopback");
    let window = Window::current(&client);
    let mut notes = window.listen::<String>("note").await?;
    window.emit("note", &"hello from the same window".to_owned()).await?;
    if let Some(note) = notes.next().await {
        info!("   {} received: {:?}", note.event, note.payload);
    }

    info!("");
    info!("🎉 Done");
    Ok(())
}
