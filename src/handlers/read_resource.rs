use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::HandlerError;
use crate::gateway::{Gateway, Verb};
use crate::protocol::{ResourceReadParams, ResourceReadResult};

use super::{reply_object, take_sequence};

/// Characters left as-is in a query component: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `raw` for use as a single query-string value.
///
/// Reserved characters such as `/`, `?`, `&` and `=` are encoded, as is
/// every non-ASCII byte of the UTF-8 representation.
pub fn encode_uri_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// Handle `resources/read`.
pub async fn handle<G>(
    params: ResourceReadParams,
    gateway: &G,
) -> Result<ResourceReadResult, HandlerError>
where
    G: Gateway + ?Sized,
{
    let path = format!("/resources/read?uri={}", encode_uri_component(&params.uri));
    let reply = gateway.request(&path, Verb::Get, None).await?;
    let mut reply = reply_object(reply)?;

    Ok(ResourceReadResult {
        contents: take_sequence(&mut reply, "contents")?,
    })
}
