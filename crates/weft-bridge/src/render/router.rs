//! Routes remote UI events out of the inbound call path.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use weft_common::BridgeError;

use super::{RemoteEvent, RenderDispatch};
use crate::interop::{InvocationRequest, LocalInvoker};

pub const DISPATCH_EVENT_METHOD: &str = "DispatchEvent";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDescriptor {
    browser_renderer_id: u64,
    event_handler_id: u64,
    #[serde(default)]
    event_field_info: Option<Value>,
}

/// [`LocalInvoker`] that handles `DispatchEvent` itself and hands every other
/// method to the application's invoker.
pub struct EventRouter {
    dispatch: Arc<RenderDispatch>,
    fallback: Option<Arc<dyn LocalInvoker>>,
}

impl EventRouter {
    pub fn new(dispatch: Arc<RenderDispatch>, fallback: Option<Arc<dyn LocalInvoker>>) -> Self {
        Self { dispatch, fallback }
    }

    fn route_event(&self, args_json: Option<&str>) -> Result<(), BridgeError> {
        let args_json = args_json
            .ok_or_else(|| BridgeError::MalformedArgs("DispatchEvent needs arguments".into()))?;
        let args: Vec<Value> = serde_json::from_str(args_json)?;
        let [descriptor, event_args, ..] = args.as_slice() else {
            return Err(BridgeError::MalformedArgs(
                "DispatchEvent expects [eventDescriptor, eventArgsJson]".into(),
            ));
        };
        let descriptor = EventDescriptor::deserialize(descriptor)?;
        let event_args = match event_args {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        self.dispatch.dispatch_remote_event(
            descriptor.browser_renderer_id,
            RemoteEvent {
                handler_id: descriptor.event_handler_id,
                field_info: descriptor.event_field_info.filter(|v| !v.is_null()),
                event_args,
            },
        )
    }
}

impl LocalInvoker for EventRouter {
    fn invoke(&self, request: &InvocationRequest) -> Result<Option<String>, BridgeError> {
        if request.method_identifier == DISPATCH_EVENT_METHOD {
            self.route_event(request.args_json.as_deref())?;
            return Ok(None);
        }
        match &self.fallback {
            Some(fallback) => fallback.invoke(request),
            None => Err(BridgeError::MalformedArgs(format!(
                "no local method named '{}'",
                request.method_identifier
            ))),
        }
    }
}
