//! Cross-process bridge used during development.
//!
//! A window host process and a client process each own one inbound pipe and
//! write to the other's. Event bus frames travel wrapped in
//! [`ControlMessage::ForwardedFrame`], so a bus on top of a [`PipeChannel`]
//! behaves exactly like one on top of a local window. `Reload` and
//! `NavigateToContent` drive the host window.

mod channel;
mod message;
pub mod transport;

#[cfg(all(test, unix))]
mod tests;

pub use channel::{ListenerState, PipeChannel, PipeRole};
pub use message::{ControlMessage, FORWARDED_FRAME_TAG, NAVIGATE_TO_CONTENT_TAG, RELOAD_TAG};
