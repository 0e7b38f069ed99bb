//! Essay band-scoring service.
//!
//! - Axum HTTP API (`/api/v1/health`, `/api/v1/assess`, `/api/v1/profile`)
//! - Optional OpenAI evaluator (via environment variables); local heuristics otherwise
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   OPENAI_API_KEY        : enables the OpenAI evaluator if present
//!   OPENAI_BASE_URL       : default "https://api.openai.com/v1"
//!   OPENAI_STRONG_MODEL   : default "gpt-4o"
//!   ASSESSOR_CONFIG_PATH  : path to TOML config (prompts, scoring, fallback, patterns)
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use bandscore::routes::build_router;
use bandscore::state::AppState;
use bandscore::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let state = Arc::new(AppState::from_env());
  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "bandscore", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "bandscore", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "bandscore", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
