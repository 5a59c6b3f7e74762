use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{JsonError, Result};

pub const REGISTER_REQUEST: &str = "REGISTER_REQUEST";
pub const REGISTER_SUCCESS: &str = "REGISTER_SUCCESS";
pub const OFFER: &str = "OFFER";
pub const ANSWER: &str = "ANSWER";
pub const ICE: &str = "ICE";

/// One signaling frame. A message is classified by its `type` field alone;
/// unknown inbound fields are ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignalMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl SignalMessage {
    /// The registration handshake request, addressed to the server with an
    /// empty data body.
    pub fn register_request() -> Self {
        Self {
            kind: REGISTER_REQUEST.to_string(),
            to: Some("Server".to_string()),
            from: None,
            data: Some(Value::Object(serde_json::Map::new())),
        }
    }

    pub fn register_success() -> Self {
        Self {
            kind: REGISTER_SUCCESS.to_string(),
            to: None,
            from: Some("Server".to_string()),
            data: None,
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            JsonError {
                line: e.line(),
                column: e.column(),
                message: e.to_string(),
            }
            .into()
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            JsonError {
                line: e.line(),
                column: e.column(),
                message: e.to_string(),
            }
            .into()
        })
    }

    pub fn is_register_success(&self) -> bool {
        self.kind == REGISTER_SUCCESS
    }
}
