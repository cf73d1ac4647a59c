// Invocation correlation tests
// Exercises the success/error callback pair end to end: interleaved calls,
// sibling retirement, transport failures and late replies.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde_json::json;

use hostlink_core::{
    BridgeError, CallbackPort, Dispatch, HostBridge, InvokeError, InvokeRequest, Invoker,
};

/// Bridge that parks every request until the test answers it by hand.
#[derive(Default)]
struct ManualHost {
    requests: Mutex<Vec<InvokeRequest>>,
    port: OnceLock<CallbackPort>,
}

impl ManualHost {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn port(&self) -> CallbackPort {
        self.port.get().cloned().expect("runtime not attached")
    }

    async fn next_request(&self) -> InvokeRequest {
        loop {
            {
                let mut requests = self.requests.lock();
                if !requests.is_empty() {
                    return requests.remove(0);
                }
            }
            tokio::task::yield_now().await;
        }
    }
}

impl HostBridge for ManualHost {
    fn attach(&self, port: CallbackPort) {
        let _ = self.port.set(port);
    }

    fn post(&self, request: InvokeRequest) -> Result<(), BridgeError> {
        self.requests.lock().push(request);
        Ok(())
    }
}

/// Bridge that answers a fixed command table synchronously inside post().
struct TableHost {
    port: OnceLock<CallbackPort>,
}

impl TableHost {
    fn new() -> Arc<Self> {
        Arc::new(TableHost {
            port: OnceLock::new(),
        })
    }
}

impl HostBridge for TableHost {
    fn attach(&self, port: CallbackPort) {
        let _ = self.port.set(port);
    }

    fn post(&self, request: InvokeRequest) -> Result<(), BridgeError> {
        let port = self.port.get().cloned().ok_or(BridgeError::Unavailable)?;
        match request.command.as_str() {
            "ping" => {
                port.dispatch(request.success_id, json!("pong"));
            }
            "echo" => {
                port.dispatch(request.success_id, request.args);
            }
            "fail" => {
                port.dispatch(request.error_id, json!({"code": 1}));
            }
            other => {
                port.dispatch(request.error_id, json!({"error": format!("unknown command: {other}")}));
            }
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_replies_correlate_out_of_order() {
    let host = ManualHost::new();
    let invoker = Invoker::connect(host.clone());

    let first = tokio::spawn({
        let invoker = invoker.clone();
        async move { invoker.invoke("first", json!({})).await }
    });
    let request_a = host.next_request().await;

    let second = tokio::spawn({
        let invoker = invoker.clone();
        async move { invoker.invoke("second", json!({})).await }
    });
    let request_b = host.next_request().await;

    // Answer in reverse order of posting; each future must still get its own
    // payload, and the second call fails while the first succeeds.
    let port = host.port();
    port.dispatch(request_b.error_id, json!({"code": 7}));
    port.dispatch(request_a.success_id, json!("a-result"));

    assert_eq!(first.await.unwrap().unwrap(), json!("a-result"));
    let err = second.await.unwrap().unwrap_err();
    assert_eq!(err.host_payload(), Some(&json!({"code": 7})));
    assert!(invoker.registry().is_empty());
}

#[tokio::test]
async fn test_distinct_invocations_get_distinct_ids() {
    let host = ManualHost::new();
    let invoker = Invoker::connect(host.clone());

    for _ in 0..4 {
        invoker.invoke_detached("noop", json!({}));
    }

    let mut seen = std::collections::HashSet::new();
    for _ in 0..4 {
        let request = host.next_request().await;
        assert_ne!(request.success_id, request.error_id);
        assert!(seen.insert(request.success_id));
        assert!(seen.insert(request.error_id));
    }
}

#[tokio::test]
async fn test_synchronous_host_round_trip() {
    let host = TableHost::new();
    let invoker = Invoker::connect(host);

    assert_eq!(invoker.invoke("ping", json!({})).await.unwrap(), json!("pong"));

    let echoed = invoker
        .invoke("echo", json!({"value": 42}))
        .await
        .unwrap();
    assert_eq!(echoed, json!({"value": 42}));

    let err = invoker.invoke("fail", json!({})).await.unwrap_err();
    assert_eq!(err.host_payload(), Some(&json!({"code": 1})));

    assert!(invoker.registry().is_empty());
}

#[tokio::test]
async fn test_unknown_command_rejects_with_error_payload() {
    let host = TableHost::new();
    let invoker = Invoker::connect(host);

    let err = invoker.invoke("no-such-command", json!({})).await.unwrap_err();
    let payload = err.host_payload().expect("host-reported failure");
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("unknown command"));
}

#[tokio::test]
async fn test_late_duplicate_replies_are_discarded() {
    let host = ManualHost::new();
    let invoker = Invoker::connect(host.clone());

    let call = tokio::spawn({
        let invoker = invoker.clone();
        async move { invoker.invoke("once-only", json!({})).await }
    });
    let request = host.next_request().await;
    let port = host.port();

    assert_eq!(port.dispatch(request.success_id, json!(1)), Dispatch::Delivered);
    assert_eq!(call.await.unwrap().unwrap(), json!(1));

    // The settled pair is gone; replays land nowhere.
    assert_eq!(port.dispatch(request.success_id, json!(2)), Dispatch::Unknown);
    assert_eq!(port.dispatch(request.error_id, json!(3)), Dispatch::Unknown);
}

#[tokio::test]
async fn test_detached_invocation_rejection_is_swallowed() {
    let host = TableHost::new();
    let invoker = Invoker::connect(host);

    // Host rejects "unknown"; the detached path drops the outcome and cleans
    // up its reply pair.
    invoker.invoke_detached("unknown", json!({}));
    assert!(invoker.registry().is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_not_a_host_failure() {
    struct DeadBridge;
    impl HostBridge for DeadBridge {
        fn post(&self, _request: InvokeRequest) -> Result<(), BridgeError> {
            Err(BridgeError::Closed)
        }
    }

    let invoker = Invoker::connect(Arc::new(DeadBridge));
    let err = invoker.invoke("ping", json!({})).await.unwrap_err();
    assert!(matches!(
        err,
        InvokeError::Transport(BridgeError::Closed)
    ));
    assert!(err.host_payload().is_none());
}
