//! Stand-in component engine and application invoker for the demo page.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;
use weft_bridge::{ComponentEngine, InvocationRequest, RemoteEvent};
use weft_common::BridgeError;

/// Logs every UI event routed to its renderer.
pub struct LoggingEngine {
    renderer_id: u64,
    events: AtomicU64,
}

impl LoggingEngine {
    pub fn new(renderer_id: u64) -> Self {
        Self {
            renderer_id,
            events: AtomicU64::new(0),
        }
    }

    pub fn events_seen(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }
}

impl ComponentEngine for LoggingEngine {
    fn dispatch_event(&self, event: RemoteEvent) -> Result<(), BridgeError> {
        let seen = self.events.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            renderer_id = self.renderer_id,
            handler_id = event.handler_id,
            event_args = %event.event_args,
            seen,
            "UI event"
        );
        Ok(())
    }
}

/// Application methods callable from the page: `Echo` returns its arguments.
pub fn app_invoker(request: &InvocationRequest) -> Result<Option<String>, BridgeError> {
    match request.method_identifier.as_str() {
        "Echo" => Ok(request.args_json.clone()),
        other => Err(BridgeError::MalformedArgs(format!(
            "unknown method '{other}'"
        ))),
    }
}
