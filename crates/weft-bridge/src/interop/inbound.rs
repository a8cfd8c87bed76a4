//! Calls initiated by the remote surface and executed locally.

use serde_json::{json, Value};
use weft_common::BridgeError;

use super::args;

/// A decoded `BeginInvokeDotNetFromJS` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// `None` for fire-and-forget calls; no end frame is sent for those.
    pub call_id: Option<String>,
    pub assembly_name: Option<String>,
    pub method_identifier: String,
    /// `None` (or 0) targets a static method.
    pub target_object_id: Option<i64>,
    pub args_json: Option<String>,
}

impl InvocationRequest {
    /// Positional decode of `[callId, assemblyName, methodIdentifier,
    /// targetObjectId, argsJson]`.
    pub fn decode(frame_args: &[Value]) -> Result<Self, BridgeError> {
        Ok(Self {
            call_id: args::nullable_text(frame_args, 0, "callId")?,
            assembly_name: args::nullable_text(frame_args, 1, "assemblyName")?,
            method_identifier: args::text(frame_args, 2, "methodIdentifier")?.to_string(),
            target_object_id: args::nullable_i64(frame_args, 3, "targetObjectId")?,
            args_json: args::nullable_text(frame_args, 4, "argsJson")?,
        })
    }

    pub fn is_fire_and_forget(&self) -> bool {
        self.call_id.is_none()
    }
}

/// Executes remote-initiated calls on the affinity thread.
///
/// `Ok(Some(json))` is a result, `Ok(None)` a void completion.
pub trait LocalInvoker: Send + Sync {
    fn invoke(&self, request: &InvocationRequest) -> Result<Option<String>, BridgeError>;
}

impl<F> LocalInvoker for F
where
    F: Fn(&InvocationRequest) -> Result<Option<String>, BridgeError> + Send + Sync,
{
    fn invoke(&self, request: &InvocationRequest) -> Result<Option<String>, BridgeError> {
        self(request)
    }
}

/// Arguments of the `JS.EndInvokeDotNet` frame answering `call_id`.
pub(crate) fn end_frame_args(
    call_id: &str,
    outcome: &Result<Option<String>, BridgeError>,
) -> Vec<Value> {
    match outcome {
        Ok(None) => vec![json!(call_id), json!(true)],
        Ok(Some(result)) => vec![json!(call_id), json!(true), json!(result)],
        Err(e) => vec![json!(call_id), json!(false), json!(e.to_string())],
    }
}

/// The remote side's completion of an outbound call, in either the plain
/// `[taskId, success, result?]` or the packed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Completion {
    pub task_id: u64,
    pub success: bool,
    pub result: Option<String>,
}

impl Completion {
    pub(crate) fn decode(frame_args: &[Value]) -> Result<Self, BridgeError> {
        Ok(Self {
            task_id: args::id(frame_args, 0, "taskId")?,
            success: args::flag(frame_args, 1, "success")?,
            result: args::payload(frame_args, 2),
        })
    }

    /// `[taskId, success, argumentsJson]` where `argumentsJson` is the JSON
    /// text of `[taskId, success, result]`. The packed array is authoritative.
    pub(crate) fn decode_packed(frame_args: &[Value]) -> Result<Self, BridgeError> {
        args::id(frame_args, 0, "taskId")?;
        args::flag(frame_args, 1, "success")?;
        let packed = args::text(frame_args, 2, "argumentsJson")?;
        let inner: Vec<Value> = serde_json::from_str(packed).map_err(|e| {
            BridgeError::MalformedArgs(format!("argumentsJson is not a JSON array: {e}"))
        })?;
        Self::decode(&inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_request() {
        let args = [json!("5"), json!("App"), json!("Increment"), json!(0), json!("[1]")];
        let req = InvocationRequest::decode(&args).unwrap();
        assert_eq!(req.call_id.as_deref(), Some("5"));
        assert_eq!(req.assembly_name.as_deref(), Some("App"));
        assert_eq!(req.method_identifier, "Increment");
        assert_eq!(req.target_object_id, Some(0));
        assert_eq!(req.args_json.as_deref(), Some("[1]"));
        assert!(!req.is_fire_and_forget());
    }

    #[test]
    fn null_call_id_is_fire_and_forget() {
        let args = [Value::Null, Value::Null, json!("Log"), Value::Null, Value::Null];
        let req = InvocationRequest::decode(&args).unwrap();
        assert!(req.is_fire_and_forget());
        assert_eq!(req.args_json, None);
    }

    #[test]
    fn short_request_is_malformed() {
        let args = [json!("1"), json!("App")];
        assert!(matches!(
            InvocationRequest::decode(&args),
            Err(BridgeError::MalformedArgs(_))
        ));
    }

    #[test]
    fn ill_typed_method_is_malformed() {
        let args = [json!("1"), Value::Null, json!(12), Value::Null, Value::Null];
        assert!(matches!(
            InvocationRequest::decode(&args),
            Err(BridgeError::MalformedArgs(_))
        ));
    }

    #[test]
    fn end_frame_shapes() {
        assert_eq!(end_frame_args("3", &Ok(None)), vec![json!("3"), json!(true)]);
        assert_eq!(
            end_frame_args("3", &Ok(Some("{\"n\":1}".into()))),
            vec![json!("3"), json!(true), json!("{\"n\":1}")]
        );
        let failed = end_frame_args("3", &Err(BridgeError::MalformedArgs("bad".into())));
        assert_eq!(failed[1], json!(false));
        assert!(failed[2].as_str().unwrap().contains("bad"));
    }

    #[test]
    fn plain_completion() {
        let c = Completion::decode(&[json!(7), json!(true), json!("42")]).unwrap();
        assert_eq!(
            c,
            Completion {
                task_id: 7,
                success: true,
                result: Some("42".into())
            }
        );
        let void = Completion::decode(&[json!(8), json!(true)]).unwrap();
        assert_eq!(void.result, None);
    }

    #[test]
    fn packed_completion() {
        let args = [json!(7), json!(true), json!("[7,true,{\"v\":1}]")];
        let c = Completion::decode_packed(&args).unwrap();
        assert_eq!(c.task_id, 7);
        assert!(c.success);
        assert_eq!(c.result.as_deref(), Some(r#"{"v":1}"#));
    }

    #[test]
    fn packed_completion_requires_array() {
        let args = [json!(7), json!(true), json!("not json")];
        assert!(matches!(
            Completion::decode_packed(&args),
            Err(BridgeError::MalformedArgs(_))
        ));
    }
}
