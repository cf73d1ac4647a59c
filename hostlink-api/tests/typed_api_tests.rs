// Typed capability bindings over an in-process router
// Exercises HostClient and the capability modules end to end against
// HostRouter hosts: argument wire shapes, typed replies, error surfacing.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use hostlink_api::dialog::{self, MessageDialogKind, MessageDialogOptions, OpenDialogOptions};
use hostlink_api::dpi::{LogicalSize, PhysicalSize};
use hostlink_api::fs::{self, BaseDirectory, DirOptions, FsOptions, RenameOptions};
use hostlink_api::os::{self, Platform};
use hostlink_api::window::{self, Window};
use hostlink_api::{app, clipboard, path, process, HostClient, InvokeError};
use hostlink_bridge::HostRouter;
use hostlink_core::HostMetadata;

fn connect() -> (HostClient, Arc<HostRouter>) {
    let router = Arc::new(HostRouter::new());
    let client = HostClient::new(router.clone());
    (client, router)
}

/// Registers `command` to record its args and reply with a fixed value.
fn capture(router: &Arc<HostRouter>, command: &str, reply: Value) -> Arc<Mutex<Vec<Value>>> {
    let calls: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let log = calls.clone();
    router.handle_fn(command, move |args| {
        let log = log.clone();
        let reply = reply.clone();
        async move {
            log.lock().unwrap().push(args);
            Ok(reply)
        }
    });
    calls
}

#[tokio::test]
async fn test_fs_read_text_file_round_trip() {
    let (client, router) = connect();
    let calls = capture(&router, "plugin:fs|read_text_file", json!("hello"));

    let contents = fs::read_text_file(&client, "notes.txt", FsOptions::in_dir(BaseDirectory::Home))
        .await
        .unwrap();

    assert_eq!(contents, "hello");
    assert_eq!(
        calls.lock().unwrap()[0],
        json!({"path": "notes.txt", "options": {"dir": 21}})
    );
}

#[tokio::test]
async fn test_fs_write_and_mkdir_wire_shapes() {
    let (client, router) = connect();
    let writes = capture(&router, "plugin:fs|write_text_file", json!(null));
    let mkdirs = capture(&router, "plugin:fs|mkdir", json!(null));

    fs::write_text_file(&client, "out/run.log", "started", FsOptions::default())
        .await
        .unwrap();
    fs::mkdir(
        &client,
        "out/deep",
        DirOptions {
            base_dir: Some(BaseDirectory::AppData),
            recursive: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(
        writes.lock().unwrap()[0],
        json!({"path": "out/run.log", "contents": "started", "options": {}})
    );
    assert_eq!(
        mkdirs.lock().unwrap()[0],
        json!({"path": "out/deep", "options": {"dir": 14, "recursive": true}})
    );
}

#[tokio::test]
async fn test_fs_rename_carries_both_roots() {
    let (client, router) = connect();
    let calls = capture(&router, "plugin:fs|rename", json!(null));

    fs::rename(
        &client,
        "draft.md",
        "final.md",
        RenameOptions {
            old_path_base_dir: Some(BaseDirectory::Temp),
            new_path_base_dir: Some(BaseDirectory::Document),
        },
    )
    .await
    .unwrap();

    assert_eq!(
        calls.lock().unwrap()[0],
        json!({
            "oldPath": "draft.md",
            "newPath": "final.md",
            "options": {"oldPathBaseDir": 12, "newPathBaseDir": 6},
        })
    );
}

#[tokio::test]
async fn test_fs_read_dir_and_stat_decode_replies() {
    let (client, router) = connect();
    capture(
        &router,
        "plugin:fs|read_dir",
        json!([
            {"path": "src", "name": "src", "children": [
                {"path": "src/main.rs", "name": "main.rs"},
            ]},
        ]),
    );
    capture(
        &router,
        "plugin:fs|stat",
        json!({
            "accessedAtMs": 1000,
            "createdAtMs": 500,
            "modifiedAtMs": 900,
            "isDir": false,
            "isFile": true,
            "isSymlink": false,
            "size": 2048,
            "permissions": {"readonly": true, "mode": null},
        }),
    );

    let entries = fs::read_dir(
        &client,
        "",
        DirOptions {
            base_dir: Some(BaseDirectory::Resource),
            recursive: true,
        },
    )
    .await
    .unwrap();
    assert_eq!(entries[0].children.as_ref().unwrap()[0].name.as_deref(), Some("main.rs"));

    let info = fs::stat(&client, "src/main.rs", FsOptions::default()).await.unwrap();
    assert!(info.is_file);
    assert!(info.permissions.readonly);
    assert_eq!(info.size, 2048);
}

#[tokio::test]
async fn test_host_rejection_surfaces_verbatim() {
    let (client, router) = connect();
    router.handle_fn("plugin:fs|read_text_file", |_args| async {
        Err(json!({"message": "path out of scope"}))
    });

    let err = fs::read_text_file(&client, "/etc/shadow", FsOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.host_payload(), Some(&json!({"message": "path out of scope"})));
}

#[tokio::test]
async fn test_undecodable_reply_is_a_codec_error() {
    let (client, router) = connect();
    capture(&router, "plugin:fs|exists", json!("yes"));

    let err = fs::exists(&client, "a.txt", FsOptions::default()).await.unwrap_err();
    assert!(matches!(err, InvokeError::Codec(_)));
}

#[tokio::test]
async fn test_window_title_and_sizes() {
    let (client, router) = connect();
    let titles = capture(&router, "plugin:window|set_title", json!(null));
    let sizes = capture(&router, "plugin:window|inner_size", json!({"width": 800, "height": 600}));

    let window = Window::new(&client, "main");
    window.set_title("hostlink").await.unwrap();
    let size = window.inner_size().await.unwrap();

    assert_eq!(size, PhysicalSize::new(800, 600));
    assert_eq!(size.as_logical(2.0), LogicalSize::new(400, 300));
    assert_eq!(
        titles.lock().unwrap()[0],
        json!({"label": "main", "value": "hostlink"})
    );
    assert_eq!(sizes.lock().unwrap()[0], json!({"label": "main"}));
}

#[tokio::test]
async fn test_window_set_size_sends_tagged_geometry() {
    let (client, router) = connect();
    let calls = capture(&router, "plugin:window|set_size", json!(null));

    let window = Window::new(&client, "main");
    window.set_size(LogicalSize::new(1024, 768)).await.unwrap();

    assert_eq!(
        calls.lock().unwrap()[0],
        json!({
            "label": "main",
            "value": {"type": "Logical", "data": {"width": 1024, "height": 768}},
        })
    );
}

#[tokio::test]
async fn test_window_handles_come_from_metadata() {
    let router = Arc::new(HostRouter::with_metadata(HostMetadata {
        current_context: "settings".to_owned(),
        contexts: vec!["main".to_owned(), "settings".to_owned()],
    }));
    let client = HostClient::new(router.clone());

    assert_eq!(Window::current(&client).label(), "settings");
    let labels: Vec<String> = Window::all(&client)
        .iter()
        .map(|window| window.label().to_owned())
        .collect();
    assert_eq!(labels, ["main", "settings"]);
}

#[tokio::test]
async fn test_monitor_queries() {
    let (client, router) = connect();
    capture(&router, "plugin:window|current_monitor", json!(null));
    capture(
        &router,
        "plugin:window|available_monitors",
        json!([{
            "name": "eDP-1",
            "size": {"width": 2256, "height": 1504},
            "position": {"x": 0, "y": 0},
            "scaleFactor": 1.5,
        }]),
    );

    assert!(window::current_monitor(&client).await.unwrap().is_none());

    let monitors = window::available_monitors(&client).await.unwrap();
    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].name(), Some("eDP-1"));
    assert_eq!(monitors[0].size().as_logical(1.5), LogicalSize::new(1504, 1002));
}

#[tokio::test]
async fn test_dialog_prompts() {
    let (client, router) = connect();
    let asks = capture(&router, "plugin:dialog|ask", json!(true));
    capture(&router, "plugin:dialog|confirm", json!(false));

    let yes = dialog::ask(
        &client,
        "Delete everything?",
        MessageDialogOptions {
            title: Some("Careful".to_owned()),
            kind: MessageDialogKind::Warning,
        },
    )
    .await
    .unwrap();
    assert!(yes);
    assert_eq!(
        asks.lock().unwrap()[0],
        json!({
            "message": "Delete everything?",
            "options": {"title": "Careful", "kind": "warning"},
        })
    );

    let confirmed = dialog::confirm(&client, "Continue?", MessageDialogOptions::default())
        .await
        .unwrap();
    assert!(!confirmed);
}

#[tokio::test]
async fn test_dialog_pickers_return_optional_paths() {
    let (client, router) = connect();
    let opens = capture(&router, "plugin:dialog|open", json!("/home/me/img.png"));
    capture(&router, "plugin:dialog|save", json!(null));

    let picked = dialog::open(&client, OpenDialogOptions::default()).await.unwrap();
    assert_eq!(picked, Some("/home/me/img.png".into()));
    assert_eq!(
        opens.lock().unwrap()[0],
        json!({"options": {"directory": false, "multiple": false, "recursive": false}})
    );

    // Cancelled save comes back as None, not an error.
    assert!(dialog::save(&client, Default::default()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_os_queries() {
    let (client, router) = connect();
    capture(&router, "plugin:os|platform", json!("linux"));
    capture(&router, "plugin:os|version", json!("6.8.0-41-generic"));
    capture(&router, "plugin:os|locale", json!(null));
    capture(&router, "plugin:os|hostname", json!("devbox"));

    assert_eq!(os::platform(&client).await.unwrap(), Platform::Linux);
    assert_eq!(os::version(&client).await.unwrap(), "6.8.0-41-generic");
    assert_eq!(os::locale(&client).await.unwrap(), None);
    assert_eq!(os::hostname(&client).await.unwrap(), "devbox");
}

#[tokio::test]
async fn test_clipboard_round_trip() {
    let (client, router) = connect();
    let store: Arc<Mutex<String>> = Arc::new(Mutex::new(String::new()));

    let writer = store.clone();
    router.handle_fn("plugin:clipboard|write_text", move |args| {
        let writer = writer.clone();
        async move {
            let text = args["text"].as_str().unwrap_or_default().to_owned();
            *writer.lock().unwrap() = text;
            Ok(json!(null))
        }
    });
    let reader = store.clone();
    router.handle_fn("plugin:clipboard|read_text", move |_args| {
        let reader = reader.clone();
        async move { Ok(json!(*reader.lock().unwrap())) }
    });

    clipboard::write_text(&client, "copied text").await.unwrap();
    assert_eq!(clipboard::read_text(&client).await.unwrap(), "copied text");
}

#[tokio::test]
async fn test_path_resolution() {
    let (client, router) = connect();
    let resolves = capture(
        &router,
        "plugin:path|resolve_directory",
        json!("/home/me/.config/app"),
    );
    let joins = capture(&router, "plugin:path|join", json!("logs/app/today.log"));

    let dir = path::app_config_dir(&client).await.unwrap();
    assert_eq!(dir, std::path::PathBuf::from("/home/me/.config/app"));
    assert_eq!(resolves.lock().unwrap()[0], json!({"directory": 13}));

    let joined = path::join(&client, ["logs", "app", "today.log"]).await.unwrap();
    assert_eq!(joined, std::path::PathBuf::from("logs/app/today.log"));
    assert_eq!(
        joins.lock().unwrap()[0],
        json!({"paths": ["logs", "app", "today.log"]})
    );
}

#[tokio::test]
async fn test_app_info_and_theme() {
    let (client, router) = connect();
    capture(&router, "plugin:app|name", json!("Notes"));
    let themes = capture(&router, "plugin:app|set_theme", json!(null));

    assert_eq!(app::name(&client).await.unwrap(), "Notes");

    app::set_theme(&client, app::Theme::Dark).await.unwrap();
    app::set_theme(&client, app::Theme::System).await.unwrap();
    let calls = themes.lock().unwrap();
    assert_eq!(calls[0], json!({"theme": "dark"}));
    assert_eq!(calls[1], json!({"theme": null}));
}

#[tokio::test]
async fn test_process_exit_sends_code() {
    let (client, router) = connect();
    let exits = capture(&router, "plugin:process|exit", json!(null));

    process::exit(&client, 3).await.unwrap();
    assert_eq!(exits.lock().unwrap()[0], json!({"code": 3}));
}

#[tokio::test]
async fn test_calls_leave_no_registry_residue() {
    let (client, router) = connect();
    capture(&router, "plugin:os|hostname", json!("devbox"));

    for _ in 0..4 {
        os::hostname(&client).await.unwrap();
    }
    assert!(client.registry().is_empty());
}
