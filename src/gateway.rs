//! Remote gateway: one HTTP round trip to the Rube backend per call.
//!
//! The gateway knows nothing about JSON-RPC. It joins a path onto the
//! configured endpoint, attaches the bearer token, and hands back the parsed
//! JSON body. There is no retry; a failed call fails the one request that
//! issued it.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::error::GatewayError;

/// Longest backend error body kept for the diagnostic log.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP verb used for a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
        }
    }
}

/// Backend round trip, replaceable by a test double.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send `body` (if any) to `path` with `verb` and return the parsed reply.
    async fn request(
        &self,
        path: &str,
        verb: Verb,
        body: Option<&Value>,
    ) -> Result<Value, GatewayError>;
}

/// [`Gateway`] backed by a reqwest client.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    config: BridgeConfig,
}

impl HttpGateway {
    pub fn new(config: BridgeConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().build().map_err(GatewayError::Client)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn request(
        &self,
        path: &str,
        verb: Verb,
        body: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        let url = self.config.endpoint.join(path).map_err(|source| GatewayError::Url {
            path: path.to_string(),
            source,
        })?;

        debug!(verb = ?verb, url = %url, "Forwarding request to backend");

        let mut builder = self
            .client
            .request(verb.method(), url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, self.config.bearer_header());

        if let Some(timeout) = self.config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!(url = %url, status = %status, bytes = bytes.len(), "Backend replied");

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            let body: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(url = %url, status = %status, "Backend returned error status");
            return Err(GatewayError::Status { status, body });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
