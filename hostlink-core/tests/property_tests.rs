// Property-based coverage for the registry and channel layers:
// payload fidelity, id uniqueness and re-sequencing under arbitrary input.

use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::{json, Value};

use hostlink_core::{CallbackId, CallbackRegistry, Channel, InvokeRequest, Retention};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn test_dispatch_preserves_arbitrary_payloads(payload in arb_json()) {
        let registry = CallbackRegistry::new();
        let received: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));

        let sink = received.clone();
        let id = registry.register(
            move |value| {
                *sink.lock() = Some(value);
            },
            Retention::OneShot,
        );

        registry.dispatch(id, payload.clone());
        prop_assert_eq!(received.lock().take(), Some(payload));
    }

    #[test]
    fn test_registered_ids_never_collide(count in 1usize..256) {
        let registry = CallbackRegistry::new();
        let mut ids = std::collections::HashSet::new();

        for _ in 0..count {
            let id = registry.register(|_| {}, Retention::Persistent);
            prop_assert!(ids.insert(id), "registry minted a duplicate live id");
            prop_assert!(registry.contains(id));
        }
        prop_assert_eq!(registry.len(), count);
    }

    #[test]
    fn test_invoke_request_round_trips(
        command in "[a-z:|_-]{1,32}",
        success in any::<u32>(),
        error in any::<u32>(),
        args in arb_json(),
    ) {
        let request = InvokeRequest {
            command,
            success_id: CallbackId::new(success),
            error_id: CallbackId::new(error),
            args,
        };
        let wire = serde_json::to_value(&request).unwrap();
        let parsed: InvokeRequest = serde_json::from_value(wire).unwrap();
        prop_assert_eq!(parsed, request);
    }

    #[test]
    fn test_channel_orders_any_arrival_permutation(
        order in Just((0usize..8).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let registry = Arc::new(CallbackRegistry::new());
        let channel = Channel::<usize>::new(&registry);
        let id = channel.id();

        let total = order.len();
        for index in order {
            let end = index == total - 1;
            let mut envelope = json!({ "index": index, "message": index });
            if end {
                envelope["end"] = json!(true);
            }
            registry.dispatch(id, envelope);
        }

        // All envelopes are buffered by now; collecting cannot block.
        let items = futures::executor::block_on(channel.collect::<Vec<_>>());
        prop_assert_eq!(items, (0..total).collect::<Vec<_>>());
    }
}
