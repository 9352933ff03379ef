use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

/// Backend origin used when `RUBE_ENDPOINT` is not set.
pub const DEFAULT_ENDPOINT: &str = "https://api.rube.app";

/// Bridge configuration loaded from environment variables.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub endpoint: Url,
    pub auth_token: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl BridgeConfig {
    /// Config pointing at `endpoint` with no token and no timeout.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            auth_token: None,
            request_timeout: None,
        }
    }

    /// Load configuration from environment.
    ///
    /// - `RUBE_ENDPOINT` (optional, default `https://api.rube.app`) — backend origin
    /// - `RUBE_AUTH_TOKEN` (optional) — bearer token sent on every backend call
    /// - `RUBE_REQUEST_TIMEOUT_SECS` (optional) — per-call timeout, unbounded when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`BridgeConfig::from_env`], reading variables through `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_endpoint = lookup("RUBE_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = parse_endpoint(&raw_endpoint)?;

        let auth_token = lookup("RUBE_AUTH_TOKEN").filter(|t| !t.trim().is_empty());

        let request_timeout = match lookup("RUBE_REQUEST_TIMEOUT_SECS") {
            Some(val) => match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => return Err(ConfigError::InvalidTimeout(val)),
            },
            None => None,
        };

        Ok(Self {
            endpoint,
            auth_token,
            request_timeout,
        })
    }

    /// Value for the `Authorization` header.
    ///
    /// Without a token this is still a well-formed bearer header, which the
    /// backend is expected to reject.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.auth_token.as_deref().unwrap_or_default())
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
