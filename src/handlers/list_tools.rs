use crate::error::HandlerError;
use crate::gateway::{Gateway, Verb};
use crate::protocol::ToolsListResult;

use super::reply_sequence;

/// Handle `tools/list` by fetching the backend's tool descriptors.
///
/// Descriptors pass through untouched; only the outer sequence is checked.
pub async fn handle<G>(gateway: &G) -> Result<ToolsListResult, HandlerError>
where
    G: Gateway + ?Sized,
{
    let reply = gateway.request("/tools/list", Verb::Get, None).await?;
    Ok(ToolsListResult {
        tools: reply_sequence(reply, "tools")?,
    })
}
