//! Linked in-memory channel endpoints.

use std::sync::{Arc, Weak};

use weft_common::BridgeError;

use super::{ensure_payload, Channel, MessageSink, Sinks};

/// One end of an in-memory pair. Sending on one end delivers synchronously
/// to the subscribers of the other.
pub struct MemoryChannel {
    name: &'static str,
    sinks: Arc<Sinks>,
    peer: Weak<Sinks>,
}

impl MemoryChannel {
    /// Create two linked endpoints, `(local, remote)`.
    pub fn pair() -> (Self, Self) {
        let local = Arc::new(Sinks::default());
        let remote = Arc::new(Sinks::default());
        let local_peer = Arc::downgrade(&remote);
        let remote_peer = Arc::downgrade(&local);
        (
            Self {
                name: "local",
                sinks: local,
                peer: local_peer,
            },
            Self {
                name: "remote",
                sinks: remote,
                peer: remote_peer,
            },
        )
    }
}

impl Channel for MemoryChannel {
    fn send(&self, payload: &str) -> Result<(), BridgeError> {
        ensure_payload(payload)?;
        let peer = self.peer.upgrade().ok_or_else(|| {
            BridgeError::ChannelClosed(format!("{} endpoint's peer was dropped", self.name))
        })?;
        peer.deliver(payload);
        Ok(())
    }

    fn subscribe(&self, sink: MessageSink) {
        self.sinks.add(sink);
    }
}
