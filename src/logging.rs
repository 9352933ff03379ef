use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Diagnostics go to stderr only; stdout carries the JSON-RPC stream.
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
}
