//! Named-event multiplexer over a [`Channel`].
//!
//! Outbound, [`EventBus::emit`] serializes a [`Frame`] and sends it. Inbound,
//! raw channel text is queued to a dedicated `event-bus` thread which decodes
//! each frame and runs the handlers registered for its name. Handlers are
//! copied out under the registry lock and invoked outside it, so a handler
//! may freely call `on`, `off` or `emit`.
//!
//! The bus also tracks the readiness handshake: the remote surface emits a
//! single handshake event (default `RemoteInitialized`) once its own
//! listeners are installed, and [`EventBus::perform_handshake`] resolves
//! after that.

mod frame;


pub use frame::Frame;

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError, Weak};
use std::thread;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};
use weft_common::{BridgeError, IdAllocator};

use crate::channel::Channel;

pub const DEFAULT_HANDSHAKE_EVENT: &str = "RemoteInitialized";

/// Callback receiving a frame's positional arguments.
pub type Handler = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Token identifying one registration, used to remove it again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    event: String,
    id: u64,
}

impl Subscription {
    pub fn event(&self) -> &str {
        &self.event
    }
}

struct Registration {
    id: u64,
    handler: Handler,
}

struct Shared {
    handlers: Mutex<HashMap<String, Vec<Registration>>>,
    ids: IdAllocator,
    /// Feeds the `event-bus` dispatch thread.
    inbound: Mutex<mpsc::Sender<String>>,
    ready: watch::Receiver<bool>,
    handshake_event: String,
}

impl Shared {
    fn next_id(&self) -> Result<u64, BridgeError> {
        self.ids
            .next_id()
            .ok_or_else(|| BridgeError::ProtocolMismatch("subscription ids exhausted".into()))
    }

    fn enqueue(&self, raw: String) {
        let inbound = self.inbound.lock().unwrap_or_else(PoisonError::into_inner);
        if inbound.send(raw).is_err() {
            trace!("event bus dispatcher is gone, inbound frame dropped");
        }
    }

    fn insert(&self, event: &str, id: u64, handler: Handler) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event.to_string())
            .or_default()
            .push(Registration { id, handler });
    }

    fn remove(&self, event: &str, id: u64) -> bool {
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = handlers.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|r| r.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            handlers.remove(event);
        }
        removed
    }

    fn snapshot(&self, event: &str) -> Vec<Handler> {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map(|list| list.iter().map(|r| Arc::clone(&r.handler)).collect())
            .unwrap_or_default()
    }

    fn dispatch(&self, raw: &str) {
        let frame = match Frame::decode(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "dropping undecodable frame");
                return;
            }
        };

        let handlers = self.snapshot(&frame.event_name);
        if handlers.is_empty() {
            trace!(event = %frame.event_name, "no handlers for event");
            return;
        }

        for handler in handlers {
            let args = frame.args.as_slice();
            if panic::catch_unwind(AssertUnwindSafe(|| handler(args))).is_err() {
                error!(event = %frame.event_name, "event handler panicked");
            }
        }
    }
}

/// Send-only view of a bus.
///
/// Handlers that answer frames capture an `Emitter` rather than the bus, so
/// the registry never ends up owning itself.
#[derive(Clone)]
pub struct Emitter {
    channel: Arc<dyn Channel>,
}

impl Emitter {
    pub fn emit(&self, event: &str, args: Vec<Value>) -> Result<(), BridgeError> {
        let payload = Frame::new(event, args)?.encode()?;
        trace!(event, "emitting frame");
        self.channel.send(&payload)
    }
}

/// Cheaply cloneable handle to one event bus.
#[derive(Clone)]
pub struct EventBus {
    shared: Arc<Shared>,
    emitter: Emitter,
}

impl EventBus {
    pub fn new(channel: Arc<dyn Channel>) -> Result<Self, BridgeError> {
        Self::with_handshake_event(channel, DEFAULT_HANDSHAKE_EVENT)
    }

    /// Create a bus whose handshake completes on `handshake_event`.
    ///
    /// The handshake registration is in place before the bus subscribes to
    /// `channel`, so a handshake delivered straight away is still seen.
    pub fn with_handshake_event(
        channel: Arc<dyn Channel>,
        handshake_event: impl Into<String>,
    ) -> Result<Self, BridgeError> {
        let handshake_event = handshake_event.into();
        let (ready_tx, ready_rx) = watch::channel(false);
        let (tx, rx) = mpsc::channel::<String>();
        let shared = Arc::new(Shared {
            handlers: Mutex::new(HashMap::new()),
            ids: IdAllocator::new(),
            inbound: Mutex::new(tx),
            ready: ready_rx,
            handshake_event: handshake_event.clone(),
        });

        // Exits once the last bus handle drops `Shared` and with it the sender.
        let weak: Weak<Shared> = Arc::downgrade(&shared);
        thread::Builder::new()
            .name("event-bus".into())
            .spawn(move || {
                while let Ok(raw) = rx.recv() {
                    let Some(shared) = weak.upgrade() else {
                        break;
                    };
                    shared.dispatch(&raw);
                }
                debug!("event bus dispatcher exited");
            })?;

        let bus = Self {
            shared,
            emitter: Emitter {
                channel: Arc::clone(&channel),
            },
        };
        bus.once(&handshake_event, move |_| {
            info!("remote surface initialized");
            let _ = ready_tx.send(true);
        })?;

        let weak = Arc::downgrade(&bus.shared);
        channel.subscribe(Arc::new(move |raw: String| match weak.upgrade() {
            Some(shared) => shared.enqueue(raw),
            None => trace!("event bus is gone, inbound frame dropped"),
        }));
        Ok(bus)
    }

    /// Register `handler` for `event`. Handlers run in registration order.
    pub fn on<F>(&self, event: &str, handler: F) -> Result<Subscription, BridgeError>
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        ensure_event_name(event)?;
        let id = self.shared.next_id()?;
        self.shared.insert(event, id, Arc::new(handler));
        Ok(Subscription {
            event: event.to_string(),
            id,
        })
    }

    /// Register `handler` to run for the next `event` only.
    pub fn once<F>(&self, event: &str, handler: F) -> Result<Subscription, BridgeError>
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        ensure_event_name(event)?;
        let id = self.shared.next_id()?;
        let fired = AtomicBool::new(false);
        let weak = Arc::downgrade(&self.shared);
        let name = event.to_string();
        self.shared.insert(
            event,
            id,
            Arc::new(move |args: &[Value]| {
                if fired.swap(true, Ordering::SeqCst) {
                    return;
                }
                if let Some(shared) = weak.upgrade() {
                    shared.remove(&name, id);
                }
                handler(args);
            }),
        );
        Ok(Subscription {
            event: event.to_string(),
            id,
        })
    }

    /// Remove a registration. Fails with `NoSuchSubscription` when it is not
    /// (or no longer) registered.
    pub fn off(&self, subscription: &Subscription) -> Result<(), BridgeError> {
        if self.shared.remove(&subscription.event, subscription.id) {
            Ok(())
        } else {
            Err(BridgeError::NoSuchSubscription {
                event: subscription.event.clone(),
            })
        }
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.shared
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Serialize and send a frame to the remote surface.
    pub fn emit(&self, event: &str, args: Vec<Value>) -> Result<(), BridgeError> {
        self.emitter.emit(event, args)
    }

    pub fn emitter(&self) -> Emitter {
        self.emitter.clone()
    }

    pub fn handshake_event(&self) -> &str {
        &self.shared.handshake_event
    }

    pub fn is_remote_ready(&self) -> bool {
        *self.shared.ready.borrow()
    }

    /// Resolve once the remote surface has emitted the handshake event.
    /// Resolves immediately if it already has.
    pub async fn perform_handshake(&self) -> Result<(), BridgeError> {
        let mut ready = self.shared.ready.clone();
        ready
            .wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| BridgeError::ChannelClosed("handshake listener dropped".into()))
    }
}

fn ensure_event_name(event: &str) -> Result<(), BridgeError> {
    if event.is_empty() {
        Err(BridgeError::MalformedArgs("event name is empty".into()))
    } else {
        Ok(())
    }
}
