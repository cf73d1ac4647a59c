// Typed Host Bindings: Basic Calls
// Drives the typed capability modules against an in-process HostRouter
// - window title and geometry
// - clipboard round trip
// - os queries

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use serde_json::json;
use tracing::info;

use hostlink_api::window::Window;
use hostlink_api::{clipboard, os, HostClient};
use hostlink_bridge::HostRouter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("🔌 hostlink - Typed Bindings Example");
    info!("====================================");

    // Stand in for a desktop host: a router with a handful of commands.
    let router = Arc::new(HostRouter::new());

    let title = Arc::new(Mutex::new(String::from("untitled")));
    let writer = title.clone();
    router.handle_fn("plugin:window|set_title", move |args| {
        let writer = writer.clone();
        async move {
            *writer.lock() = args["value"].as_str().unwrap_or_default().to_owned();
            Ok(json!(null))
        }
    });
    let reader = title.clone();
    router.handle_fn("plugin:window|title", move |_args| {
        let reader = reader.clone();
        async move { Ok(json!(*reader.lock())) }
    });
    router.handle_fn("plugin:window|inner_size", |_args| async {
        Ok(json!({"width": 1280, "height": 800}))
    });
    router.handle_fn("plugin:window|scale_factor", |_args| async { Ok(json!(2.0)) });

    let clip = Arc::new(Mutex::new(String::new()));
    let paste = clip.clone();
    router.handle_fn("plugin:clipboard|write_text", move |args| {
        let paste = paste.clone();
        async move {
            *paste.lock() = args["text"].as_str().unwrap_or_default().to_owned();
            Ok(json!(null))
        }
    });
    let copy = clip.clone();
    router.handle_fn("plugin:clipboard|read_text", move |_args| {
        let copy = copy.clone();
        async move { Ok(json!(*copy.lock())) }
    });

    router.handle_fn("plugin:os|platform", |_args| async { Ok(json!("linux")) });

    // Connect the typed client
    let client = HostClient::new(router.clone());
    info!("✅ Client connected");

    info!("");
    info!("📝 Window calls");
    let window = Window::current(&client);
    info!("   current window: {}", window.label());
    window.set_title("hostlink demo").await?;
    info!("   title is now: {:?}", window.title().await?);
    let size = window.inner_size().await?;
    let scale = window.scale_factor().await?;
    info!(
        "   inner size: {}x{} physical, {}x{} logical at scale {}",
        size.width(),
        size.height(),
        size.as_logical(scale).width(),
        size.as_logical(scale).height(),
        scale
    );

    info!("");
    info!("📝 Clipboard round trip");
    clipboard::write_text(&client, "copied through the host").await?;
    info!("   read back: {:?}", clipboard::read_text(&client).await?);

    info!("");
    info!("📝 OS query");
    info!("   platform: {:?}", os::platform(&client).await?);

    info!("");
    info!("🎉 Done");
    Ok(())
}
