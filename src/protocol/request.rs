use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::EnvelopeError;

/// JSON-RPC 2.0 ID, either a number or a string.
///
/// Numbers keep their JSON form, so `1.5` or a full-range `u64` is echoed
/// back exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(serde_json::Number),
    Str(String),
}

impl From<i64> for RpcId {
    fn from(n: i64) -> Self {
        RpcId::Number(n.into())
    }
}

impl From<&str> for RpcId {
    fn from(s: &str) -> Self {
        RpcId::Str(s.to_string())
    }
}

/// JSON-RPC 2.0 request envelope.
///
/// `id` is `None` for notifications, whether the field is missing or `null`.
/// A missing or non-string `method` reads as the empty string, which no
/// operation answers to.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<Value>,
    #[serde(default)]
    pub id: Option<RpcId>,
    #[serde(default, deserialize_with = "method_name")]
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Parse one inbound line. Only a JSON object is an envelope.
    pub fn parse(line: &str) -> Result<Self, EnvelopeError> {
        match serde_json::from_str::<Value>(line)? {
            value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
            _ => Err(EnvelopeError::NotAnObject),
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

fn method_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => name,
        _ => String::new(),
    })
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Parameters for `resources/read`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceReadParams {
    pub uri: String,
}
