//! Live renderers keyed by id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use weft_common::BridgeError;

/// A UI event raised on the remote surface, addressed to one handler of one
/// renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEvent {
    pub handler_id: u64,
    pub field_info: Option<Value>,
    /// Event payload as JSON text.
    pub event_args: String,
}

/// The component engine behind a renderer.
///
/// Called only on the affinity thread.
pub trait ComponentEngine: Send + Sync {
    fn dispatch_event(&self, event: RemoteEvent) -> Result<(), BridgeError>;
}

/// Shared, explicitly owned map of renderer id to engine.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: Arc<Mutex<HashMap<u64, Arc<dyn ComponentEngine>>>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `ProtocolMismatch` if `renderer_id` is already taken.
    pub fn register(
        &self,
        renderer_id: u64,
        engine: Arc<dyn ComponentEngine>,
    ) -> Result<(), BridgeError> {
        let mut renderers = self.renderers.lock().unwrap_or_else(PoisonError::into_inner);
        if renderers.contains_key(&renderer_id) {
            return Err(BridgeError::ProtocolMismatch(format!(
                "renderer {renderer_id} is already registered"
            )));
        }
        renderers.insert(renderer_id, engine);
        Ok(())
    }

    /// Returns whether a renderer was removed.
    pub fn unregister(&self, renderer_id: u64) -> bool {
        self.renderers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&renderer_id)
            .is_some()
    }

    pub fn contains(&self, renderer_id: u64) -> bool {
        self.renderers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&renderer_id)
    }

    pub fn get(&self, renderer_id: u64) -> Option<Arc<dyn ComponentEngine>> {
        self.renderers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&renderer_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.renderers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
