//! Gambling Assessment & Counselor · Backend
//!
//! - Axum HTTP API: questionnaire scoring and an AI counselor chat
//! - Optional Azure OpenAI integration (via environment variables)
//!
//! Important env variables:
//!   PORT                          : u16 (default 8000)
//!   ALLOWED_ORIGINS               : comma-separated CORS origins
//!   AZURE_OPENAI_API_KEY          : enables the counselor model if present
//!   AZURE_OPENAI_ENDPOINT         : required with the key
//!   AZURE_OPENAI_DEPLOYMENT_NAME  : required with the key
//!   AZURE_OPENAI_API_VERSION      : default "2024-02-01"
//!   MODEL_TIMEOUT_SECS            : default 30
//!   COUNSEL_CONFIG_PATH           : path to TOML config (prompts, crisis content, questionnaire)
//!   LOG_LEVEL                     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT                    : "pretty" (default) or "json"

mod assessment;
mod config;
mod counsel;
mod crisis;
mod domain;
mod error;
mod openai;
mod protocol;
mod routes;
mod seeds;
mod state;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Configuration problems are fatal here, never per request.
  let settings = config::load_from_env().map_err(|e| {
    error!(target: "gamcounsel", error = %e, "Startup aborted");
    e
  })?;

  let state = Arc::new(AppState::new(&settings).map_err(|e| {
    error!(target: "gamcounsel", error = %e, "Startup aborted");
    e
  })?);

  let app = build_router(state, &settings.allowed_origins);

  let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "gamcounsel", %addr, name = %settings.app_name, version = %settings.app_version, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "gamcounsel", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "gamcounsel", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
