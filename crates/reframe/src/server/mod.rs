//! HTTP server: multipart upload in, zip archive out.
//!
//! One POST endpoint does the work; everything else is plumbing. The router
//! carries a permissive CORS layer because browser upload widgets are the
//! primary client, and a body limit sized from the configured upload cap.

mod error;
mod upload;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use clap::Args;
use reframe_core::{Config, Reframe};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart framing and the JSON spec field on top of the raw
/// image cap.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Shared state for all request handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    pub reframe: Arc<Reframe>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let bind = args.host.unwrap_or_else(|| config.server.bind.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{bind}:{port}");

    let reframe = Arc::new(Reframe::new(config));
    let router = build_router(reframe);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Could not bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Build the application router around one shared [`Reframe`] instance.
pub(crate) fn build_router(reframe: Arc<Reframe>) -> Router {
    let body_limit = reframe.config().max_upload_bytes() as usize + UPLOAD_OVERHEAD_BYTES;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/resizer/upload", post(upload::upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { reframe })
}

async fn health() -> &'static str {
    "OK"
}

/// Resolve when the process receives Ctrl+C.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
