//! One-stop wiring of scheduler, bus, correlator and render dispatch.

use std::sync::Arc;

use tracing::{debug, info};
use weft_common::BridgeError;
use weft_config::schema::InteropConfig;

use crate::bus::EventBus;
use crate::channel::Channel;
use crate::hot_reload::{ControlMessage, PipeChannel};
use crate::interop::{Interop, LocalInvoker, PendingCall};
use crate::render::{ComponentEngine, EventRouter, RemoteEvent, RenderDispatch, RendererRegistry};
use crate::scheduler::AffinityScheduler;
use crate::window::HostedWindow;

pub const SCHEDULER_THREAD_NAME: &str = "weft-affinity";

/// Everything an application needs to drive one remote surface.
pub struct Bridge {
    scheduler: AffinityScheduler,
    bus: EventBus,
    interop: Interop,
    dispatch: Arc<RenderDispatch>,
    control: Option<Arc<PipeChannel>>,
}

impl Bridge {
    /// Build the stack over `channel`.
    ///
    /// `DispatchEvent` calls are routed to registered renderers; every other
    /// inbound method goes to `invoker`, and fails with `MalformedArgs` when
    /// there is none.
    pub fn new(
        channel: Arc<dyn Channel>,
        config: &InteropConfig,
        invoker: Option<Arc<dyn LocalInvoker>>,
    ) -> Result<Self, BridgeError> {
        let scheduler = AffinityScheduler::new(SCHEDULER_THREAD_NAME)?;
        let bus = EventBus::with_handshake_event(channel, config.handshake_event.as_str())?;
        let dispatch = Arc::new(RenderDispatch::new(
            bus.clone(),
            scheduler.clone(),
            RendererRegistry::new(),
        ));
        let router = Arc::new(EventRouter::new(Arc::clone(&dispatch), invoker));
        let interop = Interop::attach(bus.clone(), scheduler.clone(), router)?
            .with_call_timeout(config.call_timeout());

        info!(
            handshake_event = %config.handshake_event,
            call_timeout_ms = config.call_timeout_ms,
            "bridge ready"
        );
        Ok(Self {
            scheduler,
            bus,
            interop,
            dispatch,
            control: None,
        })
    }

    /// Route [`send_control_message`](Self::send_control_message) through a
    /// hot-reload pipe.
    pub fn with_control_channel(mut self, control: Arc<PipeChannel>) -> Self {
        self.control = Some(control);
        self
    }

    pub fn scheduler(&self) -> &AffinityScheduler {
        &self.scheduler
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn interop(&self) -> &Interop {
        &self.interop
    }

    pub fn registry(&self) -> &RendererRegistry {
        self.dispatch.registry()
    }

    pub fn register_renderer(
        &self,
        renderer_id: u64,
        engine: Arc<dyn ComponentEngine>,
    ) -> Result<(), BridgeError> {
        self.dispatch.registry().register(renderer_id, engine)?;
        debug!(renderer_id, "renderer registered");
        Ok(())
    }

    pub fn unregister_renderer(&self, renderer_id: u64) -> bool {
        let removed = self.dispatch.registry().unregister(renderer_id);
        debug!(renderer_id, removed, "renderer unregistered");
        removed
    }

    pub fn push_render_batch(&self, renderer_id: u64, batch: &[u8]) -> Result<(), BridgeError> {
        self.dispatch.push_render_batch(renderer_id, batch)
    }

    /// Queue a remote UI event for its renderer. Callable from any thread;
    /// the event is delivered on the scheduler.
    pub fn dispatch_remote_event(
        &self,
        renderer_id: u64,
        event: RemoteEvent,
    ) -> Result<(), BridgeError> {
        let dispatch = Arc::clone(&self.dispatch);
        self.scheduler
            .try_post(move || dispatch.dispatch_remote_event(renderer_id, event))
    }

    pub fn post_to_affinity_thread<F>(&self, action: F) -> Result<(), BridgeError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.scheduler.post(action)
    }

    /// Fails with `ChannelClosed` when no control channel is attached.
    pub fn send_control_message(&self, message: &ControlMessage) -> Result<(), BridgeError> {
        let Some(control) = &self.control else {
            return Err(BridgeError::ChannelClosed(
                "no control channel attached".into(),
            ));
        };
        control.send_control(message)
    }

    pub async fn perform_handshake(&self) -> Result<(), BridgeError> {
        self.bus.perform_handshake().await
    }

    pub fn begin_invoke_remote(
        &self,
        identifier: &str,
        args_json: Option<&str>,
    ) -> Result<PendingCall, BridgeError> {
        self.interop.begin_invoke(identifier, args_json)
    }

    pub async fn invoke_remote(
        &self,
        identifier: &str,
        args_json: Option<&str>,
    ) -> Result<Option<String>, BridgeError> {
        self.interop.invoke(identifier, args_json).await
    }

    /// Unregister `renderer_id` once `window` has closed.
    pub fn attach_window(&self, window: &HostedWindow, renderer_id: u64) {
        let registry = self.dispatch.registry().clone();
        window.on_closed(move || {
            if registry.unregister(renderer_id) {
                debug!(renderer_id, "renderer released with its window");
            }
        });
    }

    /// Fail every outstanding call and stop the scheduler after it drains.
    pub fn shutdown(&self) {
        let abandoned = self.interop.in_flight();
        self.interop.abandon_all();
        self.scheduler.stop();
        info!(abandoned, "bridge shut down");
    }
}
