use rube_mcp_bridge::config::BridgeConfig;
use rube_mcp_bridge::gateway::HttpGateway;
use rube_mcp_bridge::logging::init_logging;
use rube_mcp_bridge::server::BridgeServer;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let config = match BridgeConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };

    if config.auth_token.is_none() {
        warn!("RUBE_AUTH_TOKEN is not set; backend calls will carry an empty bearer token");
    }

    let gateway = match HttpGateway::new(config) {
        Ok(g) => g,
        Err(e) => {
            error!(error = %e, "Cannot create backend client");
            std::process::exit(1);
        }
    };

    info!(
        endpoint = %gateway.config().endpoint,
        version = env!("CARGO_PKG_VERSION"),
        "Starting rube-mcp-bridge"
    );

    let server = BridgeServer::new(gateway);
    if let Err(e) = server.run().await {
        error!(error = %e, "Fatal I/O error");
        std::process::exit(1);
    }
}
