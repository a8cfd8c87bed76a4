//! Thread-safe command queue standing between the bridge and the window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::trace;
use weft_bridge::window::HostListener;
use weft_bridge::{HostEvent, WindowCommand, WindowHost};
use weft_common::BridgeError;

/// [`WindowHost`] whose commands are drained by the event loop.
///
/// Any thread may queue commands; the window thread takes them in
/// [`drain`](Self::drain) and raises the resulting events through
/// [`raise`](Self::raise).
#[derive(Default)]
pub struct CommandQueue {
    commands: Mutex<Vec<WindowCommand>>,
    listeners: Mutex<Vec<HostListener>>,
    closed: AtomicBool,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued command, oldest first.
    pub fn drain(&self) -> Vec<WindowCommand> {
        let mut commands = self.commands.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *commands)
    }

    /// Tell every subscriber about `event`.
    pub fn raise(&self, event: HostEvent) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Refuse further commands; the window is gone.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.drain();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl WindowHost for CommandQueue {
    fn execute(&self, command: WindowCommand) -> Result<(), BridgeError> {
        if self.is_closed() {
            return Err(BridgeError::ChannelClosed("window is closed".into()));
        }
        trace!(?command, "window command queued");
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
        Ok(())
    }

    fn subscribe(&self, listener: HostListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}
