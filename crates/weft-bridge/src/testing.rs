//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use weft_common::BridgeError;

use crate::window::{HostEvent, HostListener, WindowCommand, WindowHost};

/// Window host that records commands and lets a test raise events.
#[derive(Default)]
pub(crate) struct RecordingHost {
    commands: Mutex<Vec<WindowCommand>>,
    listeners: Mutex<Vec<HostListener>>,
    closed: Mutex<bool>,
}

impl RecordingHost {
    pub(crate) fn commands(&self) -> Vec<WindowCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn raise(&self, event: HostEvent) {
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener(&event);
        }
    }

    pub(crate) fn shut(&self) {
        *self.closed.lock().unwrap() = true;
    }
}

impl WindowHost for RecordingHost {
    fn execute(&self, command: WindowCommand) -> Result<(), BridgeError> {
        if *self.closed.lock().unwrap() {
            return Err(BridgeError::ChannelClosed("window is gone".into()));
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }

    fn subscribe(&self, listener: HostListener) {
        self.listeners.lock().unwrap().push(listener);
    }
}

/// Convenience for building a shared recording host.
pub(crate) fn recording_host() -> Arc<RecordingHost> {
    Arc::new(RecordingHost::default())
}
