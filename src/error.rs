use reqwest::StatusCode;

/// Startup configuration failures. These are the only fatal errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid RUBE_ENDPOINT '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("RUBE_REQUEST_TIMEOUT_SECS must be a positive integer, got '{0}'")]
    InvalidTimeout(String),
}

/// An inbound line that cannot be read as a request envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message is not a JSON object")]
    NotAnObject,
}

/// Failures of a single backend round trip.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("cannot build backend URL for '{path}': {source}")]
    Url {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("backend returned a non-JSON body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures while executing one recognized operation.
///
/// Every variant is reported to the caller as a JSON-RPC internal error;
/// the text is only written to the diagnostic log.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("unexpected backend reply: {0}")]
    UnexpectedReply(String),
}
