use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::bridge::{CallbackPort, HostBridge, HostMetadata, InvokeRequest};
use crate::error::InvokeError;
use crate::ids::CallbackId;
use crate::registry::{CallbackRegistry, Retention};

type Settlement = Result<Value, Value>;

/// Tunables for an [`Invoker`].
#[derive(Debug, Clone, Default)]
pub struct InvokerConfig {
    /// Reply deadline applied to every `invoke`. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Shared state of one in-flight invocation.
///
/// Both one-shot callbacks hold a clone; the sender can be taken exactly
/// once, which is what makes settlement exactly-once even if a misbehaving
/// host fires both callbacks.
struct ReplySlot {
    registry: Arc<CallbackRegistry>,
    tx: Mutex<Option<oneshot::Sender<Settlement>>>,
    pair: OnceLock<(CallbackId, CallbackId)>,
}

impl ReplySlot {
    fn new(registry: Arc<CallbackRegistry>) -> (Arc<Self>, oneshot::Receiver<Settlement>) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(ReplySlot {
            registry,
            tx: Mutex::new(Some(tx)),
            pair: OnceLock::new(),
        });
        (slot, rx)
    }

    /// First settlement wins; later attempts find the sender gone.
    fn settle(&self, outcome: Settlement) {
        let Some(tx) = self.tx.lock().take() else {
            return;
        };
        self.retire_pair();
        let _ = tx.send(outcome);
    }

    /// Tears the slot down without delivering, for timeouts and failed posts.
    fn discard(&self) {
        let _ = self.tx.lock().take();
        self.retire_pair();
    }

    fn retire_pair(&self) {
        if let Some(&(success_id, error_id)) = self.pair.get() {
            self.registry.remove(success_id);
            self.registry.remove(error_id);
        }
    }
}

/// Guest-side entry point for calling host commands.
///
/// Each call registers a one-shot success/error callback pair, posts an
/// [`InvokeRequest`] through the bridge, and resolves when the host fires
/// one of the pair. Whichever callback fires first also retires its sibling.
#[derive(Clone)]
pub struct Invoker {
    registry: Arc<CallbackRegistry>,
    bridge: Arc<dyn HostBridge>,
    config: InvokerConfig,
}

impl Invoker {
    pub fn new(registry: Arc<CallbackRegistry>, bridge: Arc<dyn HostBridge>) -> Self {
        Self::with_config(registry, bridge, InvokerConfig::default())
    }

    pub fn with_config(
        registry: Arc<CallbackRegistry>,
        bridge: Arc<dyn HostBridge>,
        config: InvokerConfig,
    ) -> Self {
        Invoker {
            registry,
            bridge,
            config,
        }
    }

    /// Builds a fresh registry, attaches its port to `bridge`, and returns an
    /// invoker over the pair.
    pub fn connect(bridge: Arc<dyn HostBridge>) -> Self {
        Self::connect_with(bridge, InvokerConfig::default())
    }

    pub fn connect_with(bridge: Arc<dyn HostBridge>, config: InvokerConfig) -> Self {
        let registry = Arc::new(CallbackRegistry::new());
        bridge.attach(CallbackPort::new(registry.clone()));
        Self::with_config(registry, bridge, config)
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Context facts published by the bridge, no round trip involved.
    pub fn metadata(&self) -> HostMetadata {
        self.bridge.metadata()
    }

    /// Invokes `command` on the host and waits for settlement.
    pub async fn invoke(&self, command: &str, args: Value) -> Result<Value, InvokeError> {
        match self.config.timeout {
            Some(limit) => self.invoke_with_timeout(command, args, limit).await,
            None => {
                let (_slot, rx) = self.begin(command, args)?;
                Self::settled(rx.await)
            }
        }
    }

    /// Like [`Invoker::invoke`] with an explicit reply deadline.
    pub async fn invoke_with_timeout(
        &self,
        command: &str,
        args: Value,
        limit: Duration,
    ) -> Result<Value, InvokeError> {
        let (slot, rx) = self.begin(command, args)?;
        match tokio::time::timeout(limit, rx).await {
            Ok(settlement) => Self::settled(settlement),
            Err(_) => {
                slot.discard();
                Err(InvokeError::TimedOut(limit))
            }
        }
    }

    /// Posts `command` without waiting for the outcome.
    ///
    /// The reply pair still registers and retires itself when the host
    /// answers; the answer itself is dropped. This is the teardown path for
    /// contexts that cannot await, like `Drop` impls.
    pub fn invoke_detached(&self, command: &str, args: Value) {
        match self.begin(command, args) {
            Ok((_slot, rx)) => drop(rx),
            Err(err) => debug!(command, %err, "detached invoke failed to post"),
        }
    }

    fn begin(
        &self,
        command: &str,
        args: Value,
    ) -> Result<(Arc<ReplySlot>, oneshot::Receiver<Settlement>), InvokeError> {
        let (slot, rx) = ReplySlot::new(self.registry.clone());

        let success_slot = slot.clone();
        let success_id = self.registry.register(
            move |payload| success_slot.settle(Ok(payload)),
            Retention::OneShot,
        );
        let error_slot = slot.clone();
        let error_id = self.registry.register(
            move |payload| error_slot.settle(Err(payload)),
            Retention::OneShot,
        );
        // The pair is only known once both registrations are done. The host
        // cannot dispatch earlier because the ids have not been posted yet.
        let _ = slot.pair.set((success_id, error_id));

        trace!(command, %success_id, %error_id, "posting invoke request");
        let request = InvokeRequest {
            command: command.to_owned(),
            success_id,
            error_id,
            args,
        };
        if let Err(err) = self.bridge.post(request) {
            debug!(command, %err, "post failed before reaching the host");
            slot.discard();
            return Err(err.into());
        }
        Ok((slot, rx))
    }

    fn settled(
        settlement: Result<Settlement, oneshot::error::RecvError>,
    ) -> Result<Value, InvokeError> {
        match settlement {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(InvokeError::Host(payload)),
            Err(_) => Err(InvokeError::Canceled),
        }
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker")
            .field("config", &self.config)
            .field("registered", &self.registry.len())
            .finish_non_exhaustive()
    }
}
