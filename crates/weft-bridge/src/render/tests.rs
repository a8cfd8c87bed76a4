use super::*;

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use crate::bus::{Frame, DEFAULT_HANDSHAKE_EVENT};
use crate::channel::{Channel, MemoryChannel};
use crate::interop::{InvocationRequest, Interop, LocalInvoker, BEGIN_INVOKE_LOCAL, END_INVOKE_LOCAL};

const WAIT: Duration = Duration::from_secs(5);

struct RecordingEngine {
    events: Mutex<mpsc::Sender<(RemoteEvent, Option<String>)>>,
}

impl RecordingEngine {
    fn new() -> (Arc<Self>, mpsc::Receiver<(RemoteEvent, Option<String>)>) {
        let (tx, rx) = mpsc::channel();
        (
            Arc::new(Self {
                events: Mutex::new(tx),
            }),
            rx,
        )
    }
}

impl ComponentEngine for RecordingEngine {
    fn dispatch_event(&self, event: RemoteEvent) -> Result<(), BridgeError> {
        let thread = std::thread::current().name().map(str::to_string);
        self.events.lock().unwrap().send((event, thread)).unwrap();
        Ok(())
    }
}

struct Harness {
    bus: EventBus,
    scheduler: AffinityScheduler,
    dispatch: Arc<RenderDispatch>,
    remote: MemoryChannel,
    outbound: mpsc::Receiver<Frame>,
}

impl Harness {
    fn new() -> Self {
        let (local, remote) = MemoryChannel::pair();
        let bus = EventBus::new(Arc::new(local)).unwrap();
        let scheduler = AffinityScheduler::new("render-test").unwrap();
        let dispatch = Arc::new(RenderDispatch::new(
            bus.clone(),
            scheduler.clone(),
            RendererRegistry::new(),
        ));
        let (tx, outbound) = mpsc::channel();
        remote.subscribe(Arc::new(move |raw| {
            tx.send(Frame::decode(&raw).unwrap()).unwrap();
        }));
        Self {
            bus,
            scheduler,
            dispatch,
            remote,
            outbound,
        }
    }

    fn send_remote(&self, event: &str, args: Value) {
        let raw = json!({ "EventName": event, "Args": args }).to_string();
        self.remote.send(&raw).unwrap();
    }

    async fn handshake(&self) {
        self.send_remote(DEFAULT_HANDSHAKE_EVENT, json!([]));
        tokio::time::timeout(WAIT, self.bus.perform_handshake())
            .await
            .unwrap()
            .unwrap();
    }

    /// Run `dispatch_remote_event` on the scheduler and return its result.
    fn dispatch_on_scheduler(&self, renderer_id: u64, event: RemoteEvent) -> Result<(), BridgeError> {
        let (tx, rx) = mpsc::channel();
        let dispatch = Arc::clone(&self.dispatch);
        self.scheduler
            .send(move || {
                tx.send(dispatch.dispatch_remote_event(renderer_id, event))
                    .unwrap()
            })
            .unwrap();
        rx.recv_timeout(WAIT).unwrap()
    }
}

fn click(handler_id: u64) -> RemoteEvent {
    RemoteEvent {
        handler_id,
        field_info: None,
        event_args: r#"{"type":"click"}"#.into(),
    }
}

#[test]
fn batch_refused_before_handshake() {
    let h = Harness::new();
    assert!(matches!(
        h.dispatch.push_render_batch(1, &[0, 1, 2]),
        Err(BridgeError::RemoteNotReady)
    ));
    assert!(h.outbound.recv_timeout(Duration::from_millis(50)).is_err());
}

#[tokio::test]
async fn batch_is_base64_encoded() {
    let h = Harness::new();
    h.handshake().await;
    h.dispatch.push_render_batch(3, &[0, 1, 2, 255]).unwrap();

    let frame = h.outbound.recv_timeout(WAIT).unwrap();
    assert_eq!(frame.event_name, RENDER_BATCH_EVENT);
    assert_eq!(frame.args, vec![json!(3), json!("AAEC/w==")]);
}

#[test]
fn dispatch_off_scheduler_is_an_affinity_violation() {
    let h = Harness::new();
    assert!(matches!(
        h.dispatch.dispatch_remote_event(1, click(1)),
        Err(BridgeError::AffinityViolation(_))
    ));
}

#[test]
fn dispatch_to_unknown_renderer_is_a_no_op() {
    let h = Harness::new();
    let (engine, events) = RecordingEngine::new();
    h.dispatch.registry().register(1, engine).unwrap();

    h.dispatch_on_scheduler(2, click(5)).unwrap();
    assert!(events.recv_timeout(Duration::from_millis(50)).is_err());
}

#[test]
fn dispatch_reaches_registered_engine() {
    let h = Harness::new();
    let (engine, events) = RecordingEngine::new();
    h.dispatch.registry().register(1, engine).unwrap();

    h.dispatch_on_scheduler(1, click(5)).unwrap();
    let (event, thread) = events.recv_timeout(WAIT).unwrap();
    assert_eq!(event, click(5));
    assert_eq!(thread.as_deref(), Some("render-test"));
}

#[test]
fn dispatch_after_unregister_is_dropped() {
    let h = Harness::new();
    let (engine, events) = RecordingEngine::new();
    h.dispatch.registry().register(1, engine).unwrap();
    h.dispatch.registry().unregister(1);

    h.dispatch_on_scheduler(1, click(5)).unwrap();
    assert!(events.recv_timeout(Duration::from_millis(50)).is_err());
}

// =============================================================================
// EVENT ROUTER
// =============================================================================

#[test]
fn router_dispatches_remote_event_frames() {
    let h = Harness::new();
    let (engine, events) = RecordingEngine::new();
    h.dispatch.registry().register(1, engine).unwrap();

    let router = Arc::new(EventRouter::new(Arc::clone(&h.dispatch), None));
    let _interop = Interop::attach(h.bus.clone(), h.scheduler.clone(), router).unwrap();

    let args_json = json!([
        { "browserRendererId": 1, "eventHandlerId": 12, "eventFieldInfo": null },
        r#"{"type":"click","detail":1}"#
    ])
    .to_string();
    h.send_remote(
        BEGIN_INVOKE_LOCAL,
        json!(["30", null, DISPATCH_EVENT_METHOD, null, args_json]),
    );

    let (event, thread) = events.recv_timeout(WAIT).unwrap();
    assert_eq!(event.handler_id, 12);
    assert_eq!(event.field_info, None);
    assert_eq!(event.event_args, r#"{"type":"click","detail":1}"#);
    assert_eq!(thread.as_deref(), Some("render-test"));

    let end = h.outbound.recv_timeout(WAIT).unwrap();
    assert_eq!(end.event_name, END_INVOKE_LOCAL);
    assert_eq!(end.args, vec![json!("30"), json!(true)]);
}

#[test]
fn router_keeps_field_info() {
    let h = Harness::new();
    let (engine, events) = RecordingEngine::new();
    h.dispatch.registry().register(2, engine).unwrap();
    let router = EventRouter::new(Arc::clone(&h.dispatch), None);

    let request = InvocationRequest {
        call_id: None,
        assembly_name: None,
        method_identifier: DISPATCH_EVENT_METHOD.into(),
        target_object_id: None,
        args_json: Some(
            json!([
                {
                    "browserRendererId": 2,
                    "eventHandlerId": 4,
                    "eventFieldInfo": { "componentId": 9, "fieldValue": "abc" }
                },
                { "value": "abc" }
            ])
            .to_string(),
        ),
    };

    let (tx, rx) = mpsc::channel();
    h.scheduler
        .send(move || tx.send(router.invoke(&request)).unwrap())
        .unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap().unwrap(), None);

    let (event, _) = events.recv_timeout(WAIT).unwrap();
    assert_eq!(
        event.field_info,
        Some(json!({ "componentId": 9, "fieldValue": "abc" }))
    );
    assert_eq!(event.event_args, r#"{"value":"abc"}"#);
}

#[test]
fn router_rejects_bad_descriptor() {
    let h = Harness::new();
    let router = EventRouter::new(Arc::clone(&h.dispatch), None);
    let request = InvocationRequest {
        call_id: Some("1".into()),
        assembly_name: None,
        method_identifier: DISPATCH_EVENT_METHOD.into(),
        target_object_id: None,
        args_json: Some(r#"[{"eventHandlerId":1}]"#.into()),
    };
    assert!(matches!(
        router.invoke(&request),
        Err(BridgeError::MalformedArgs(_))
    ));
}

#[test]
fn router_delegates_other_methods() {
    let h = Harness::new();
    let fallback: Arc<dyn LocalInvoker> =
        Arc::new(|req: &InvocationRequest| -> Result<Option<String>, BridgeError> {
            Ok(Some(format!("\"{}\"", req.method_identifier)))
        });
    let router = EventRouter::new(Arc::clone(&h.dispatch), Some(fallback));
    let request = InvocationRequest {
        call_id: Some("2".into()),
        assembly_name: Some("App".into()),
        method_identifier: "Greet".into(),
        target_object_id: None,
        args_json: None,
    };
    assert_eq!(router.invoke(&request).unwrap().as_deref(), Some("\"Greet\""));
}

#[test]
fn router_without_fallback_rejects_unknown_methods() {
    let h = Harness::new();
    let router = EventRouter::new(Arc::clone(&h.dispatch), None);
    let request = InvocationRequest {
        call_id: Some("2".into()),
        assembly_name: None,
        method_identifier: "Greet".into(),
        target_object_id: None,
        args_json: None,
    };
    assert!(router.invoke(&request).is_err());
}
