//! Wire frame exchanged over every channel.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use weft_common::BridgeError;

/// `{"EventName": "...", "Args": [...]}`. A null or missing `Args` decodes
/// as an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Frame {
    pub event_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: Vec<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Frame {
    pub fn new(event_name: impl Into<String>, args: Vec<Value>) -> Result<Self, BridgeError> {
        let event_name = event_name.into();
        if event_name.is_empty() {
            return Err(BridgeError::MalformedArgs("event name is empty".into()));
        }
        Ok(Self { event_name, args })
    }

    pub fn decode(raw: &str) -> Result<Self, BridgeError> {
        let frame: Frame = serde_json::from_str(raw)?;
        if frame.event_name.is_empty() {
            return Err(BridgeError::MalformedArgs("event name is empty".into()));
        }
        Ok(frame)
    }

    pub fn encode(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }
}
