//! Bidirectional text transports between the local process and the remote
//! web surface.
//!
//! Three implementations exist:
//! - [`DirectChannel`]: in-process, straight into a native window's webview.
//! - [`MemoryChannel`]: a linked pair of in-memory endpoints.
//! - [`PipeChannel`](crate::hot_reload::PipeChannel): frames wrapped in
//!   control envelopes and carried across two local pipes.

mod direct;
mod memory;

pub use direct::DirectChannel;
pub use memory::MemoryChannel;

pub use crate::hot_reload::PipeChannel;

use std::sync::{Arc, Mutex, PoisonError};

use weft_common::BridgeError;

/// Callback receiving each inbound text message.
pub type MessageSink = Arc<dyn Fn(String) + Send + Sync>;

pub trait Channel: Send + Sync {
    /// Deliver `payload` to the remote side.
    ///
    /// Fails with `EmptyPayload` for blank text and `ChannelClosed` once the
    /// remote endpoint is gone.
    fn send(&self, payload: &str) -> Result<(), BridgeError>;

    /// Register a sink for every message received from now on.
    fn subscribe(&self, sink: MessageSink);
}

pub(crate) fn ensure_payload(payload: &str) -> Result<(), BridgeError> {
    if payload.trim().is_empty() {
        Err(BridgeError::EmptyPayload)
    } else {
        Ok(())
    }
}

/// Subscriber list shared by the channel implementations.
#[derive(Default)]
pub(crate) struct Sinks {
    sinks: Mutex<Vec<MessageSink>>,
}

impl Sinks {
    pub(crate) fn add(&self, sink: MessageSink) {
        self.sinks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    pub(crate) fn deliver(&self, message: &str) {
        let sinks = self
            .sinks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if sinks.is_empty() {
            tracing::trace!("inbound message dropped, no subscribers");
        }
        for sink in sinks {
            sink(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_payloads_rejected() {
        assert!(matches!(ensure_payload(""), Err(BridgeError::EmptyPayload)));
        assert!(matches!(ensure_payload("  \n"), Err(BridgeError::EmptyPayload)));
        assert!(ensure_payload("{}").is_ok());
    }

    #[test]
    fn sinks_all_receive_message() {
        let sinks = Sinks::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            sinks.add(Arc::new(move |m| seen.lock().unwrap().push(m)));
        }
        sinks.deliver("hello");
        assert_eq!(*seen.lock().unwrap(), vec!["hello", "hello"]);
    }
}
