//! Hot-reload pipe configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Names and location of the two one-directional pipes used between a
/// window host process and a client process.
///
/// The host listens on `host_pipe` and writes to `client_pipe`; the client
/// does the reverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotReloadConfig {
    /// Directory holding the pipe endpoints. Empty means the OS temp dir.
    pub pipe_dir: String,
    pub host_pipe: String,
    pub client_pipe: String,
    /// Delay between connection attempts while the peer is not listening.
    pub connect_retry_ms: u64,
}

impl Default for HotReloadConfig {
    fn default() -> Self {
        Self {
            pipe_dir: String::new(),
            host_pipe: "WeftWindowHost".into(),
            client_pipe: "WeftWindowClient".into(),
            connect_retry_ms: 50,
        }
    }
}

impl HotReloadConfig {
    /// Resolved pipe directory.
    pub fn pipe_dir(&self) -> PathBuf {
        if self.pipe_dir.trim().is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.pipe_dir)
        }
    }
}
