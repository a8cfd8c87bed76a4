//! The three ways to start Weft.
//!
//! - `run`: window, bridge and application in one process.
//! - `host`: window only; frames are relayed to a client over local pipes.
//! - `client`: bridge and application only; drives a running host.

mod client;
mod host;
mod run;

pub use client::client;
pub use host::host;
pub use run::run;

use std::sync::Arc;

use tracing::{debug, warn};
use weft_bridge::{Bridge, LocalInvoker};
use weft_common::BridgeError;

use crate::engine::{app_invoker, LoggingEngine};
use crate::page::{greeting_batch, DEMO_RENDERER_ID};

/// Invoker for application methods the page may call.
fn application() -> Arc<dyn LocalInvoker> {
    Arc::new(app_invoker)
}

/// Register the demo renderer and redraw it every time the page announces
/// itself, so a reloaded page is drawn again.
fn install_demo_renderer(bridge: &Arc<Bridge>) -> Result<(), BridgeError> {
    bridge.register_renderer(DEMO_RENDERER_ID, Arc::new(LoggingEngine::new(DEMO_RENDERER_ID)))?;

    let weak = Arc::downgrade(bridge);
    let event = bridge.bus().handshake_event().to_string();
    bridge.bus().on(&event, move |_| {
        let Some(bridge) = weak.upgrade() else {
            return;
        };
        debug!(renderer_id = DEMO_RENDERER_ID, "drawing demo renderer");
        if let Err(e) = bridge.push_render_batch(DEMO_RENDERER_ID, greeting_batch()) {
            warn!(renderer_id = DEMO_RENDERER_ID, error = %e, "render batch not sent");
        }
    })?;
    Ok(())
}
