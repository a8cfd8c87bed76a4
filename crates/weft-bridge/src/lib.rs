//! Cross-boundary synchronization core for Weft.
//!
//! Keeps a component tree running in-process in sync with a remote
//! rendering surface:
//! - A single-thread affinity scheduler for tree mutations and call bookkeeping
//! - Named-event pub/sub over a text channel (window, pipe, or loopback)
//! - Correlated remote calls in both directions
//! - Render batch delivery and UI event routing per renderer
//! - A two-pipe bridge for split-process hot reload

pub mod bridge;
pub mod bus;
pub mod channel;
pub mod hot_reload;
pub mod interop;
mod listeners;
pub mod page;
pub mod render;
pub mod scheduler;
pub mod window;

#[cfg(test)]
mod testing;

pub use bridge::Bridge;
pub use bus::{Emitter, EventBus, Frame, Subscription};
pub use channel::{Channel, DirectChannel, MemoryChannel, MessageSink, PipeChannel};
pub use hot_reload::{ControlMessage, PipeRole};
pub use interop::{Interop, InvocationRequest, LocalInvoker, PendingCall};
pub use page::{initial_html, js_receive_frame, PageScript, IPC_INIT_SCRIPT};
pub use render::{ComponentEngine, EventRouter, RemoteEvent, RenderDispatch, RendererRegistry};
pub use scheduler::AffinityScheduler;
pub use window::{HostEvent, HostedWindow, WindowCommand, WindowHost};
