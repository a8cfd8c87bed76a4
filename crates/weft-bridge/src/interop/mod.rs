//! Remote invocation correlator.
//!
//! Outbound calls get a task id, are announced with `JS.BeginInvokeJS` and
//! complete when the remote surface answers with `EndInvokeJS` (or the packed
//! `EndInvokeJSFromDotNet`). Inbound calls arrive as
//! `BeginInvokeDotNetFromJS`, run on the affinity scheduler through a
//! [`LocalInvoker`], and are answered with `JS.EndInvokeDotNet`.
//!
//! Frame handlers only decode. Matching completions against the pending
//! table and running local calls both happen on the scheduler thread.

mod args;
mod inbound;
mod outbound;


pub use inbound::{InvocationRequest, LocalInvoker};
pub use outbound::{PendingCall, PendingCalls};

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};
use weft_common::BridgeError;

use crate::bus::{Emitter, EventBus, Subscription};
use crate::scheduler::AffinityScheduler;
use inbound::{end_frame_args, Completion};

pub const BEGIN_INVOKE_REMOTE: &str = "JS.BeginInvokeJS";
pub const END_INVOKE_REMOTE: &str = "EndInvokeJS";
pub const END_INVOKE_REMOTE_PACKED: &str = "EndInvokeJSFromDotNet";
pub const BEGIN_INVOKE_LOCAL: &str = "BeginInvokeDotNetFromJS";
pub const END_INVOKE_LOCAL: &str = "JS.EndInvokeDotNet";

type CompletionDecoder = fn(&[Value]) -> Result<Completion, BridgeError>;

/// Call bookkeeping attached to one event bus.
pub struct Interop {
    bus: EventBus,
    emitter: Emitter,
    scheduler: AffinityScheduler,
    calls: Arc<PendingCalls>,
    call_timeout: Option<Duration>,
    subscriptions: Vec<Subscription>,
}

impl Interop {
    /// Install the call frame handlers on `bus`.
    pub fn attach(
        bus: EventBus,
        scheduler: AffinityScheduler,
        invoker: Arc<dyn LocalInvoker>,
    ) -> Result<Self, BridgeError> {
        let calls = PendingCalls::new();
        let emitter = bus.emitter();

        let subscriptions = vec![
            bus.on(
                END_INVOKE_REMOTE,
                completion_handler(END_INVOKE_REMOTE, Completion::decode, &scheduler, &calls),
            )?,
            bus.on(
                END_INVOKE_REMOTE_PACKED,
                completion_handler(
                    END_INVOKE_REMOTE_PACKED,
                    Completion::decode_packed,
                    &scheduler,
                    &calls,
                ),
            )?,
            bus.on(
                BEGIN_INVOKE_LOCAL,
                invocation_handler(&emitter, &scheduler, invoker),
            )?,
        ];

        Ok(Self {
            bus,
            emitter,
            scheduler,
            calls,
            call_timeout: None,
            subscriptions,
        })
    }

    /// Timeout applied by [`invoke`](Self::invoke). `None` waits forever.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Start a remote call under a freshly allocated task id.
    pub fn begin_invoke(
        &self,
        identifier: &str,
        args_json: Option<&str>,
    ) -> Result<PendingCall, BridgeError> {
        let call = self.calls.allocate()?;
        self.announce(call, identifier, args_json)
    }

    /// Start a remote call under a caller-chosen task id.
    pub fn begin_invoke_with_id(
        &self,
        task_id: u64,
        identifier: &str,
        args_json: Option<&str>,
    ) -> Result<PendingCall, BridgeError> {
        let call = self.calls.register(task_id)?;
        self.announce(call, identifier, args_json)
    }

    /// Call `identifier` remotely and wait for its result, honoring the
    /// configured timeout.
    pub async fn invoke(
        &self,
        identifier: &str,
        args_json: Option<&str>,
    ) -> Result<Option<String>, BridgeError> {
        let call = self.begin_invoke(identifier, args_json)?;
        match self.call_timeout {
            Some(timeout) => call.wait_timeout(timeout).await,
            None => call.wait().await,
        }
    }

    /// Resolve a pending call. Must run on the scheduler thread.
    pub fn complete(
        &self,
        task_id: u64,
        success: bool,
        result: Option<String>,
    ) -> Result<(), BridgeError> {
        self.scheduler.verify_affinity("complete")?;
        self.calls.complete(task_id, success, result)
    }

    pub fn in_flight(&self) -> usize {
        self.calls.in_flight()
    }

    /// Release every waiter with `CallAbandoned`.
    pub fn abandon_all(&self) {
        let abandoned = self.calls.abandon_all();
        if abandoned > 0 {
            debug!(abandoned, "abandoned in-flight calls");
        }
    }

    fn announce(
        &self,
        call: PendingCall,
        identifier: &str,
        args_json: Option<&str>,
    ) -> Result<PendingCall, BridgeError> {
        let task_id = call.task_id();
        debug!(task_id, identifier, "begin remote invocation");
        let args = vec![
            json!(task_id),
            json!(identifier),
            args_json.map_or(Value::Null, |a| json!(a)),
        ];
        if let Err(e) = self.emitter.emit(BEGIN_INVOKE_REMOTE, args) {
            self.calls.forget(task_id);
            return Err(e);
        }
        Ok(call)
    }
}

impl Drop for Interop {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            let _ = self.bus.off(&subscription);
        }
    }
}

fn completion_handler(
    event: &'static str,
    decode: CompletionDecoder,
    scheduler: &AffinityScheduler,
    calls: &Arc<PendingCalls>,
) -> impl Fn(&[Value]) + Send + Sync + 'static {
    let scheduler = scheduler.clone();
    let calls = Arc::clone(calls);
    move |frame_args: &[Value]| {
        let completion = match decode(frame_args) {
            Ok(completion) => completion,
            Err(e) => {
                warn!(event, error = %e, "dropping malformed completion frame");
                return;
            }
        };
        let calls = Arc::clone(&calls);
        let posted = scheduler.post(move || {
            let task_id = completion.task_id;
            if let Err(e) = calls.complete(task_id, completion.success, completion.result) {
                warn!(task_id, error = %e, "completion ignored");
            }
        });
        if let Err(e) = posted {
            warn!(event, error = %e, "could not schedule completion");
        }
    }
}

fn invocation_handler(
    emitter: &Emitter,
    scheduler: &AffinityScheduler,
    invoker: Arc<dyn LocalInvoker>,
) -> impl Fn(&[Value]) + Send + Sync + 'static {
    let emitter = emitter.clone();
    let scheduler = scheduler.clone();
    move |frame_args: &[Value]| {
        let request = match InvocationRequest::decode(frame_args) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "dropping malformed invocation frame");
                return;
            }
        };
        let invoker = Arc::clone(&invoker);
        let emitter = emitter.clone();
        let posted = scheduler.post(move || {
            let outcome = invoker.invoke(&request);
            if let Err(e) = &outcome {
                warn!(method = %request.method_identifier, error = %e, "local invocation failed");
            }
            let Some(call_id) = request.call_id.as_deref() else {
                return;
            };
            if let Err(e) = emitter.emit(END_INVOKE_LOCAL, end_frame_args(call_id, &outcome)) {
                warn!(call_id, error = %e, "could not send end-invoke frame");
            }
        });
        if let Err(e) = posted {
            warn!(error = %e, "could not schedule local invocation");
        }
    }
}
