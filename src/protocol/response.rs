use serde::Serialize;
use serde_json::Value;

use super::request::RpcId;

/// MCP protocol revision advertised in the startup notification.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name advertised in `serverInfo`.
pub const SERVER_NAME: &str = "rube-mcp-bridge";

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 response layer
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 response envelope.
///
/// `id` is always written; it is `null` when the request identity could not
/// be recovered.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<RpcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RpcId>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub fn parse_error() -> Self {
        Self { code: Self::PARSE_ERROR, message: "Parse error".into() }
    }

    pub fn method_not_found() -> Self {
        Self { code: Self::METHOD_NOT_FOUND, message: "Method not found".into() }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self { code: Self::INTERNAL_ERROR, message: message.into() }
    }
}

/// JSON-RPC 2.0 notification (no `id`, no reply expected).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Value,
}

impl JsonRpcNotification {
    /// The unsolicited `initialize` message sent before any input is read.
    pub fn initialize() -> Self {
        Self {
            jsonrpc: "2.0",
            method: "initialize".into(),
            params: serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {},
                    "resources": {},
                    "prompts": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MCP result layer (returned inside a *successful* JSON-RPC response)
// ---------------------------------------------------------------------------

/// Result of `tools/list`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolsListResult {
    pub tools: Vec<Value>,
}

/// Result of `tools/call`. `isError` is always present.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCallResult {
    pub content: Vec<Value>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

/// Result of `resources/list`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourcesListResult {
    pub resources: Vec<Value>,
}

/// Result of `resources/read`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceReadResult {
    pub contents: Vec<Value>,
}
