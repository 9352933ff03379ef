use serde_json::{Map, Value};

use crate::error::HandlerError;
use crate::gateway::{Gateway, Verb};
use crate::protocol::{ToolCallParams, ToolCallResult};

use super::{reply_object, take_sequence};

/// Handle `tools/call`.
///
/// Posts `{name, arguments}` to the backend and folds the reply into a
/// result that always carries `content` and `isError`. A missing
/// `arguments` is left out of the body rather than sent as `null`.
pub async fn handle<G>(params: ToolCallParams, gateway: &G) -> Result<ToolCallResult, HandlerError>
where
    G: Gateway + ?Sized,
{
    let mut body = Map::new();
    body.insert("name".into(), Value::String(params.name));
    if let Some(arguments) = params.arguments {
        body.insert("arguments".into(), arguments);
    }

    let reply = gateway
        .request("/tools/call", Verb::Post, Some(&Value::Object(body)))
        .await?;
    let mut reply = reply_object(reply)?;

    Ok(ToolCallResult {
        content: take_sequence(&mut reply, "content")?,
        is_error: reply.get("isError").and_then(Value::as_bool).unwrap_or(false),
    })
}
