pub mod call_tool;
pub mod list_resources;
pub mod list_tools;
pub mod read_resource;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::HandlerError;
use crate::gateway::Gateway;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required). Handler
/// failures become `-32603` errors carrying the request id; the cause is
/// logged and never sent to the caller.
pub async fn dispatch<G>(req: &JsonRpcRequest, gateway: &G) -> Option<JsonRpcResponse>
where
    G: Gateway + ?Sized,
{
    if req.is_notification() {
        debug!(method = %req.method, "Ignoring notification");
        return None;
    }

    let outcome = match req.method.as_str() {
        "tools/list" => list_tools::handle(gateway)
            .await
            .map(into_value)
            .map_err(|e| (e, "Internal error")),

        "tools/call" => {
            let outcome = match parse_params(req) {
                Ok(params) => call_tool::handle(params, gateway).await.map(into_value),
                Err(e) => Err(e),
            };
            outcome.map_err(|e| (e, "Tool call failed"))
        }

        "resources/list" => list_resources::handle(gateway)
            .await
            .map(into_value)
            .map_err(|e| (e, "Internal error")),

        "resources/read" => {
            let outcome = match parse_params(req) {
                Ok(params) => read_resource::handle(params, gateway).await.map(into_value),
                Err(e) => Err(e),
            };
            outcome.map_err(|e| (e, "Resource read failed"))
        }

        _ => {
            debug!(method = %req.method, id = ?req.id, "Method not found");
            return Some(JsonRpcResponse::error(
                req.id.clone(),
                JsonRpcError::method_not_found(),
            ));
        }
    };

    Some(match outcome {
        Ok(result) => JsonRpcResponse::success(req.id.clone(), result),
        Err((err, message)) => {
            error!(method = %req.method, id = ?req.id, error = %err, "Request failed");
            JsonRpcResponse::error(req.id.clone(), JsonRpcError::internal_error(message))
        }
    })
}

fn into_value<T: Serialize>(result: T) -> Value {
    serde_json::to_value(result).expect("result types must serialize to JSON Value")
}

fn parse_params<T: DeserializeOwned>(req: &JsonRpcRequest) -> Result<T, HandlerError> {
    match &req.params {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| HandlerError::InvalidParams(format!("{}: {e}", req.method))),
        None => Err(HandlerError::InvalidParams(format!(
            "missing params for {}",
            req.method
        ))),
    }
}

// ---------------------------------------------------------------------------
// Backend reply normalization
// ---------------------------------------------------------------------------

/// Read a list reply as a sequence.
///
/// Accepts a bare array, `null` (empty), or an object wrapping the array
/// under `field`.
fn reply_sequence(reply: Value, field: &str) -> Result<Vec<Value>, HandlerError> {
    match reply {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        Value::Object(mut map) if map.contains_key(field) => take_sequence(&mut map, field),
        other => Err(HandlerError::UnexpectedReply(format!(
            "expected a sequence of {field}, got {}",
            kind(&other)
        ))),
    }
}

/// Read an object reply; `null` counts as an object with no fields.
fn reply_object(reply: Value) -> Result<Map<String, Value>, HandlerError> {
    match reply {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(HandlerError::UnexpectedReply(format!(
            "expected an object, got {}",
            kind(&other)
        ))),
    }
}

/// Remove `field` from `map`; absent or `null` yields an empty sequence.
fn take_sequence(map: &mut Map<String, Value>, field: &str) -> Result<Vec<Value>, HandlerError> {
    match map.remove(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(HandlerError::UnexpectedReply(format!(
            "field '{field}' should be a sequence, got {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
