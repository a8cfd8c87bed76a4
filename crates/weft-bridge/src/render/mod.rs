//! Render dispatch between component engines and the remote surface.
//!
//! Render batches flow out as base64 inside `JS.RenderBatch` frames. UI
//! events flow in through the `DispatchEvent` method of the inbound call
//! path and are routed to the engine registered for their renderer.

mod registry;
mod router;

pub use registry::{ComponentEngine, RemoteEvent, RendererRegistry};
pub use router::{EventRouter, DISPATCH_EVENT_METHOD};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;
use tracing::{debug, trace};
use weft_common::BridgeError;

use crate::bus::EventBus;
use crate::scheduler::AffinityScheduler;

pub const RENDER_BATCH_EVENT: &str = "JS.RenderBatch";

pub struct RenderDispatch {
    bus: EventBus,
    scheduler: AffinityScheduler,
    registry: RendererRegistry,
}

impl RenderDispatch {
    pub fn new(bus: EventBus, scheduler: AffinityScheduler, registry: RendererRegistry) -> Self {
        Self {
            bus,
            scheduler,
            registry,
        }
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Send one serialized render batch. Fire-and-forget; refused with
    /// `RemoteNotReady` until the handshake has completed.
    pub fn push_render_batch(&self, renderer_id: u64, batch: &[u8]) -> Result<(), BridgeError> {
        if !self.bus.is_remote_ready() {
            return Err(BridgeError::RemoteNotReady);
        }
        trace!(renderer_id, batch_len = batch.len(), "pushing render batch");
        self.bus.emit(
            RENDER_BATCH_EVENT,
            vec![json!(renderer_id), json!(STANDARD.encode(batch))],
        )
    }

    /// Hand a remote UI event to its renderer. Must run on the scheduler
    /// thread; events for unknown renderers are dropped.
    pub fn dispatch_remote_event(
        &self,
        renderer_id: u64,
        event: RemoteEvent,
    ) -> Result<(), BridgeError> {
        self.scheduler.verify_affinity("dispatch_remote_event")?;
        let Some(engine) = self.registry.get(renderer_id) else {
            debug!(renderer_id, handler_id = event.handler_id, "event for unknown renderer dropped");
            return Ok(());
        };
        engine.dispatch_event(event)
    }
}

#[cfg(test)]
mod tests;
