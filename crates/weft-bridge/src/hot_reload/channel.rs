use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};
use weft_common::BridgeError;
use weft_config::schema::HotReloadConfig;

use super::message::ControlMessage;
use super::transport::{self, pipe_path, read_message, PipeReader};
use crate::channel::{ensure_payload, Channel, MessageSink, Sinks};
use crate::listeners::Listeners;

/// Which side of the pipe pair this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeRole {
    /// Owns the window; reads `host_pipe`, writes `client_pipe`.
    Host,
    /// Runs the application; reads `client_pipe`, writes `host_pipe`.
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    WaitingForConnection,
    Reading,
    Decoding,
    Dispatching,
    Faulted,
}

struct Shared {
    sinks: Sinks,
    control: Listeners<ControlMessage>,
    state: Mutex<ListenerState>,
}

impl Shared {
    fn set_state(&self, state: ListenerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn handle(&self, pipe: &str, raw: &str) {
        self.set_state(ListenerState::Decoding);
        let message = match ControlMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(pipe, error = %e, body_len = raw.len(), "dropping control message");
                self.set_state(ListenerState::Idle);
                return;
            }
        };

        self.set_state(ListenerState::Dispatching);
        debug!(pipe, message_type = message.tag(), "control message received");
        if let ControlMessage::ForwardedFrame { json } = &message {
            self.sinks.deliver(json);
        }
        self.control.emit(&message);
        self.set_state(ListenerState::Idle);
    }

    /// Serve connections until accept fails.
    fn listen(&self, pipe: &str, reader: &PipeReader) -> io::Result<()> {
        loop {
            self.set_state(ListenerState::WaitingForConnection);
            let mut stream = reader.accept()?;

            self.set_state(ListenerState::Reading);
            let raw = read_message(&mut stream);
            drop(stream);
            match raw {
                Ok(raw) if raw.is_empty() => {
                    trace!(pipe, "empty connection ignored");
                    self.set_state(ListenerState::Idle);
                }
                Ok(raw) => self.handle(pipe, &raw),
                Err(e) => {
                    warn!(pipe, error = %e, "failed to read control message");
                    self.set_state(ListenerState::Idle);
                }
            }
        }
    }
}

/// [`Channel`] over a pair of one-directional local pipes.
pub struct PipeChannel {
    dir: PathBuf,
    pipe_in: String,
    pipe_out: String,
    retry: Duration,
    shared: Arc<Shared>,
}

impl PipeChannel {
    pub fn new(
        dir: impl Into<PathBuf>,
        pipe_in: impl Into<String>,
        pipe_out: impl Into<String>,
        retry: Duration,
    ) -> Self {
        Self {
            dir: dir.into(),
            pipe_in: pipe_in.into(),
            pipe_out: pipe_out.into(),
            retry,
            shared: Arc::new(Shared {
                sinks: Sinks::default(),
                control: Listeners::default(),
                state: Mutex::new(ListenerState::Idle),
            }),
        }
    }

    pub fn from_config(config: &HotReloadConfig, role: PipeRole) -> Self {
        let (pipe_in, pipe_out) = match role {
            PipeRole::Host => (&config.host_pipe, &config.client_pipe),
            PipeRole::Client => (&config.client_pipe, &config.host_pipe),
        };
        Self::new(
            config.pipe_dir(),
            pipe_in.as_str(),
            pipe_out.as_str(),
            Duration::from_millis(config.connect_retry_ms),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pipe_in(&self) -> &str {
        &self.pipe_in
    }

    pub fn pipe_out(&self) -> &str {
        &self.pipe_out
    }

    pub fn state(&self) -> ListenerState {
        *self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive every control message, forwarded frames included.
    pub fn on_control(&self, handler: impl Fn(&ControlMessage) + Send + Sync + 'static) {
        self.shared.control.add(Arc::new(handler));
    }

    /// Bind the inbound pipe and serve it on a `pipe-reader` thread.
    ///
    /// The pipe is listening when this returns. If the listener later hits
    /// an unrecoverable I/O error the process exits with status 1.
    pub fn start_listener(&self) -> Result<JoinHandle<()>, BridgeError> {
        let reader = PipeReader::bind(pipe_path(&self.dir, &self.pipe_in))?;
        let shared = Arc::clone(&self.shared);
        let pipe = self.pipe_in.clone();
        info!(pipe = %pipe, path = %reader.path().display(), "hot-reload listener started");

        let handle = thread::Builder::new()
            .name(format!("pipe-reader-{pipe}"))
            .spawn(move || {
                if let Err(e) = shared.listen(&pipe, &reader) {
                    shared.set_state(ListenerState::Faulted);
                    error!(pipe = %pipe, error = %e, "hot-reload listener failed, exiting");
                    std::process::exit(1);
                }
            })?;
        Ok(handle)
    }

    /// Write one control message to the peer. Blocks until the peer is
    /// listening.
    pub fn send_control(&self, message: &ControlMessage) -> Result<(), BridgeError> {
        let payload = message.encode()?;
        debug!(
            pipe = %self.pipe_out,
            message_type = message.tag(),
            body_len = payload.len(),
            "sending control message"
        );
        transport::send_message(&self.dir, &self.pipe_out, &payload, self.retry).map_err(|e| {
            match e.kind() {
                io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset => {
                    BridgeError::ChannelClosed(format!("pipe {}: {e}", self.pipe_out))
                }
                _ => BridgeError::Io(e),
            }
        })
    }

    pub fn send_reload(&self) -> Result<(), BridgeError> {
        self.send_control(&ControlMessage::Reload)
    }

    pub fn send_navigate_to_content(&self, content: impl Into<String>) -> Result<(), BridgeError> {
        self.send_control(&ControlMessage::NavigateToContent {
            content: content.into(),
        })
    }

    #[cfg(test)]
    pub(crate) fn handle_raw(&self, raw: &str) {
        self.shared.handle(&self.pipe_in, raw);
    }
}

impl Channel for PipeChannel {
    fn send(&self, payload: &str) -> Result<(), BridgeError> {
        ensure_payload(payload)?;
        self.send_control(&ControlMessage::ForwardedFrame {
            json: payload.to_string(),
        })
    }

    fn subscribe(&self, sink: MessageSink) {
        self.shared.sinks.add(sink);
    }
}
