//! Native window capability.
//!
//! The bridge never touches a windowing toolkit directly. A platform layer
//! implements [`WindowHost`]: it accepts [`WindowCommand`]s from any thread
//! and executes them on its own window thread, and it reports
//! [`HostEvent`]s (web messages, geometry changes, closing) to subscribers.

mod hosted;

pub use hosted::HostedWindow;

use std::sync::Arc;

use weft_common::BridgeError;

// =============================================================================
// COMMANDS AND EVENTS
// =============================================================================

/// An action the window thread must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCommand {
    /// Deliver a frame to the embedded web surface.
    PostMessage(String),
    /// Replace the page with the given HTML document.
    NavigateToString(String),
    Reload,
    Minimize,
    Maximize,
    Restore,
    Move { x: i32, y: i32 },
    Close,
}

/// A notification raised by the native window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Raw text posted by the web surface.
    WebMessage(String),
    Moved { x: i32, y: i32 },
    Resized {
        width: u32,
        height: u32,
        is_maximized: bool,
    },
    Closing,
    Closed,
}

pub type HostListener = Arc<dyn Fn(&HostEvent) + Send + Sync>;

/// Platform window that executes commands on its own UI thread.
pub trait WindowHost: Send + Sync {
    /// Queue `command` for the window thread. Returns once queued; fails with
    /// `ChannelClosed` when the window is gone.
    fn execute(&self, command: WindowCommand) -> Result<(), BridgeError>;

    /// Receive every event the window raises from now on.
    fn subscribe(&self, listener: HostListener);
}
