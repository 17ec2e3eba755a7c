//! codereview server - HTTP API and CLI for AI-assisted code review.
//!
//! This crate provides:
//! - `POST /api/analyze` and `POST /api/analyze/upload` for pasted and uploaded code
//! - `POST /api/webhook` to review GitHub pull requests as they are opened or updated
//! - `GET /health`
//! - the `analyze` CLI command for reviewing a local file
//!
//! Reviews come from the provider chain in `codereview-engine`; when no provider
//! answers, the rule-based scanner does.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Room for multipart boundaries and headers on top of the upload limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Run the server with the given configuration.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    run_with_shutdown(config, std::future::pending()).await
}

/// Run the server with graceful shutdown support.
pub async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = config.listen_addr.parse()?;
    let drain = Duration::from_secs(config.shutdown_timeout);
    let state = Arc::new(AppState::new(config)?);

    let providers = state.chain.configured_providers();
    if providers.is_empty() {
        warn!("No review providers configured, every review will use the rule-based scanner");
    } else {
        info!(?providers, "Review providers configured");
    }
    if state.webhook_secret().is_none() {
        warn!("WEBHOOK_SECRET not set, the GitHub webhook is disabled");
    }

    let app = create_router_with_state(state);

    info!("Starting codereview server on {}", addr);
    let listener = TcpListener::bind(addr).await?;

    let (started_tx, started_rx) = oneshot::channel();
    let graceful = async move {
        shutdown.await;
        let _ = started_tx.send(());
    };
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .into_future();

    serve_until_drained(server, started_rx, drain).await?;
    Ok(())
}

/// Drive `server` to completion, but stop waiting for in-flight requests
/// `drain` after `shutdown_started` fires.
async fn serve_until_drained<S>(
    server: S,
    shutdown_started: oneshot::Receiver<()>,
    drain: Duration,
) -> std::io::Result<()>
where
    S: Future<Output = std::io::Result<()>>,
{
    let deadline = async move {
        match shutdown_started.await {
            Ok(()) => tokio::time::sleep(drain).await,
            Err(_) => std::future::pending().await,
        }
    };

    tokio::select! {
        result = server => result,
        () = deadline => {
            warn!(
                drain_secs = drain.as_secs(),
                "Shutdown timeout elapsed, dropping in-flight requests"
            );
            Ok(())
        }
    }
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    create_router_with_state(Arc::new(state))
}

/// Create the application router with an Arc-wrapped state.
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .limits
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .merge(api::root_routes())
        .nest("/api", api::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::timing_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
