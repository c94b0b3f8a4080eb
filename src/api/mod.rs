//! REST API for a completed TEA run.
//!
//! Provides three GET endpoints:
//! - `/state`: scenario inputs and the cost report
//! - `/series`: per-step cost records with optional case and range filters
//! - `/chart`: chart series for one secondary view

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use log::info;

use crate::sim::TeaRun;
use crate::sim::report::TeaReport;

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the run completes and wrapped in `Arc`; no locks
/// are needed since all data is read-only.
pub struct AppState {
    /// The completed run.
    pub run: TeaRun,
    /// Report derived from `run`.
    pub report: TeaReport,
}

impl AppState {
    /// Wraps a run together with its report.
    pub fn new(run: TeaRun) -> Self {
        let report = TeaReport::from_run(&run);
        Self { run, report }
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/series", get(handlers::get_series))
        .route("/chart", get(handlers::get_chart))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind to `addr` or the
/// server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on http://{addr}");
    axum::serve(listener, app).await
}
