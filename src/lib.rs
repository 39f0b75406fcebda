pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod resolve;
pub mod server;
pub mod state;
pub mod tools;
pub mod utils;
pub mod workbook;

pub use config::{CliArgs, ServerConfig, TransportKind};
pub use error::{ErrorCode, ReportError};
pub use logging::{LoggingConfig, init_logging};
pub use server::BidbookServer;

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

const HTTP_SERVICE_PATH: &str = "/mcp";

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    config.ensure_report_dir()?;

    let state = Arc::new(AppState::new(config.clone()));

    tracing::info!(
        transport = %config.transport,
        report_dir = %config.report_dir.display(),
        pattern = %config.report_pattern,
        "starting bidbook MCP server",
    );

    match startup_scan(&state) {
        Ok(Some(path)) => {
            tracing::info!(report = %path.display(), "startup scan resolved latest report");
        }
        Ok(None) => {
            tracing::info!("startup scan found no matching report");
        }
        Err(error) => {
            tracing::warn!(?error, "startup scan failed");
        }
    }

    match config.transport {
        TransportKind::Stdio => {
            let server = BidbookServer::from_state(state);
            server.run_stdio().await
        }
        TransportKind::Http => run_stream_http_transport(config, state).await,
    }
}

/// One resolver pass at boot, purely informational. A failure here is
/// logged and served as an error payload later; it never blocks startup.
pub fn startup_scan(state: &Arc<AppState>) -> Result<Option<PathBuf>, ReportError> {
    state.resolve_latest()
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn run_stream_http_transport(config: Arc<ServerConfig>, state: Arc<AppState>) -> Result<()> {
    let service_state = state.clone();
    let service = StreamableHttpService::new(
        move || Ok(BidbookServer::from_state(service_state.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = Router::new()
        .nest_service(HTTP_SERVICE_PATH, service)
        .route("/health", axum::routing::get(health_handler));
    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(transport = "http", bind = %actual_addr, path = HTTP_SERVICE_PATH, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(anyhow::Error::from)
}
