//! In-process channel into a native window's web surface.

use std::sync::Arc;

use weft_common::BridgeError;

use super::{ensure_payload, Channel, MessageSink, Sinks};
use crate::window::{HostEvent, WindowCommand, WindowHost};

/// Outbound frames become `PostMessage` commands on the window thread;
/// `WebMessage` events from the window become inbound messages.
pub struct DirectChannel {
    host: Arc<dyn WindowHost>,
    sinks: Arc<Sinks>,
}

impl DirectChannel {
    pub fn new(host: Arc<dyn WindowHost>) -> Self {
        let sinks = Arc::new(Sinks::default());
        let inbound = Arc::clone(&sinks);
        host.subscribe(Arc::new(move |event: &HostEvent| {
            if let HostEvent::WebMessage(body) = event {
                inbound.deliver(body);
            }
        }));
        Self { host, sinks }
    }
}

impl Channel for DirectChannel {
    fn send(&self, payload: &str) -> Result<(), BridgeError> {
        ensure_payload(payload)?;
        self.host
            .execute(WindowCommand::PostMessage(payload.to_string()))
    }

    fn subscribe(&self, sink: MessageSink) {
        self.sinks.add(sink);
    }
}
