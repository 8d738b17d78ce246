use gitlab_push::logging::{FileLogger, setup_logging};
use gitlab_push::{AppState, Forwarder, ForwarderConfig, api, load_config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let file_logger = std::env::var("LOG_DIR")
        .ok()
        .map(|dir| FileLogger::new(PathBuf::from(dir)));
    let _log_guard = match setup_logging(file_logger.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging setup error: {}", e);
            std::process::exit(1);
        }
    };

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());

    // A config file takes precedence over the environment
    let config = match std::env::var("FORWARDER_CONFIG") {
        Ok(path) => match load_config(&path) {
            Ok(cfg) => {
                info!("Using config at {:?}", path);
                cfg
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
        Err(_) => ForwarderConfig::from_env(),
    };

    if !config.has_gateway() {
        warn!("gateway_url is not set; push events cannot be forwarded");
    }
    info!(
        "Status reporting is {}",
        if config.report_status { "enabled" } else { "disabled" }
    );

    let state = Arc::new(AppState::new(Forwarder::new(config)));
    let app = api::router(state);

    info!("Listening on {}", bind_address);
    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", bind_address, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
