//! Workshop Backend · partner training games and partnership dashboards
//!
//! - Axum HTTP + WebSocket API
//! - Quiz/classification games driven over WebSocket, one session per socket
//! - Checklist completion sets persisted as JSON files
//! - Partnership dashboards from a remote data API or static config records
//! - Static dashboard pages served from ./static
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   WORKSHOP_CONFIG_PATH  : path to TOML config (games, dashboard records, partners)
//!   COMPLETION_STORE_DIR  : checklist directory (default "./data/checklists")
//!   DASHBOARD_API_URL     : partnership data API; unset serves config records
//!   DASHBOARD_API_KEY     : bearer token for the data API
//!   ENGAGEMENT_ENDPOINT   : receives tab dwell records; unset logs them instead
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod state;
mod protocol;
mod deck;
mod engine;
mod timer;
mod engagement;
mod completion;
mod dashboard;
mod partners;
mod session;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Games, checklist store, dashboard source and partner profiles.
  let state = Arc::new(AppState::new());

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "workshop", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "workshop", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "workshop", error = %e, "Failed to listen for Ctrl+C");
    std::future::pending::<()>().await;
  }
  info!(target: "workshop", "Shutdown requested");
}
