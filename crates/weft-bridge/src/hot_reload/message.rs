//! Control messages exchanged between a window host and a client process.
//!
//! Wire form is an envelope `{"messageType": "<Tag>", "messageBody": "<json>"}`
//! where the body is itself JSON text for the tagged payload.

use serde::{Deserialize, Serialize};
use weft_common::BridgeError;

pub const RELOAD_TAG: &str = "Reload";
pub const NAVIGATE_TO_CONTENT_TAG: &str = "NavigateToContent";
pub const FORWARDED_FRAME_TAG: &str = "ForwardedFrame";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// Reload the page in the host window.
    Reload,
    /// Replace the host window's page with an HTML document.
    NavigateToContent { content: String },
    /// An event bus frame relayed verbatim.
    ForwardedFrame { json: String },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    message_type: String,
    message_body: String,
}

#[derive(Serialize, Deserialize)]
struct ReloadBody {}

#[derive(Serialize, Deserialize)]
struct NavigateBody {
    content: String,
}

#[derive(Serialize, Deserialize)]
struct ForwardedBody {
    json: String,
}

impl ControlMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Reload => RELOAD_TAG,
            Self::NavigateToContent { .. } => NAVIGATE_TO_CONTENT_TAG,
            Self::ForwardedFrame { .. } => FORWARDED_FRAME_TAG,
        }
    }

    pub fn encode(&self) -> Result<String, BridgeError> {
        let body = match self {
            Self::Reload => serde_json::to_string(&ReloadBody {})?,
            Self::NavigateToContent { content } => serde_json::to_string(&NavigateBody {
                content: content.clone(),
            })?,
            Self::ForwardedFrame { json } => {
                serde_json::to_string(&ForwardedBody { json: json.clone() })?
            }
        };
        let envelope = Envelope {
            message_type: self.tag().to_string(),
            message_body: body,
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Fails with `UnknownMessageType` for tags outside the closed set.
    pub fn decode(raw: &str) -> Result<Self, BridgeError> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        let body = envelope.message_body.as_str();
        match envelope.message_type.as_str() {
            RELOAD_TAG => Ok(Self::Reload),
            NAVIGATE_TO_CONTENT_TAG => {
                let NavigateBody { content } = serde_json::from_str(body)?;
                Ok(Self::NavigateToContent { content })
            }
            FORWARDED_FRAME_TAG => {
                let ForwardedBody { json } = serde_json::from_str(body)?;
                Ok(Self::ForwardedFrame { json })
            }
            other => Err(BridgeError::UnknownMessageType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_wire_form() {
        assert_eq!(
            ControlMessage::Reload.encode().unwrap(),
            r#"{"messageType":"Reload","messageBody":"{}"}"#
        );
    }

    #[test]
    fn navigate_round_trip() {
        let msg = ControlMessage::NavigateToContent {
            content: "<html><body><app></app></body></html>".into(),
        };
        let decoded = ControlMessage::decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn forwarded_frame_keeps_inner_json_verbatim() {
        let inner = r#"{"EventName":"JS.RenderBatch","Args":[1,"AA=="]}"#;
        let msg = ControlMessage::ForwardedFrame { json: inner.into() };
        let wire = msg.encode().unwrap();
        assert!(wire.contains(r#""messageType":"ForwardedFrame""#));
        match ControlMessage::decode(&wire).unwrap() {
            ControlMessage::ForwardedFrame { json } => assert_eq!(json, inner),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_rejected() {
        let raw = r#"{"messageType":"Bogus","messageBody":"{}"}"#;
        assert!(matches!(
            ControlMessage::decode(raw),
            Err(BridgeError::UnknownMessageType(tag)) if tag == "Bogus"
        ));
    }

    #[test]
    fn malformed_envelope_is_json_error() {
        assert!(matches!(
            ControlMessage::decode("{}"),
            Err(BridgeError::Json(_))
        ));
        let bad_body = r#"{"messageType":"NavigateToContent","messageBody":"42"}"#;
        assert!(matches!(
            ControlMessage::decode(bad_body),
            Err(BridgeError::Json(_))
        ));
    }
}
