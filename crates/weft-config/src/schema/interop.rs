//! Cross-boundary call configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteropConfig {
    /// Timeout applied to outbound calls, in milliseconds. 0 disables it and
    /// a call then waits for its result forever.
    pub call_timeout_ms: u64,
    /// Event the remote surface emits once its listeners are installed.
    pub handshake_event: String,
}

impl Default for InteropConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 0,
            handshake_event: "RemoteInitialized".into(),
        }
    }
}

impl InteropConfig {
    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_ms > 0).then(|| Duration::from_millis(self.call_timeout_ms))
    }
}
