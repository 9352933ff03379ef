use crate::error::HandlerError;
use crate::gateway::{Gateway, Verb};
use crate::protocol::ResourcesListResult;

use super::reply_sequence;

/// Handle `resources/list`.
pub async fn handle<G>(gateway: &G) -> Result<ResourcesListResult, HandlerError>
where
    G: Gateway + ?Sized,
{
    let reply = gateway.request("/resources/list", Verb::Get, None).await?;
    Ok(ResourcesListResult {
        resources: reply_sequence(reply, "resources")?,
    })
}
