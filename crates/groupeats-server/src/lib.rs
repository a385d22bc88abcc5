//! HTTP server assembly for GroupEats.
//!
//! Wires the JSON API from `groupeats-api` behind HTTP Basic auth, adds
//! request tracing and a health probe, and exposes the [`ServerConfig`] and
//! [`AppState`] used by the server binary.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::{Request, State},
  middleware::{self, Next},
  response::{IntoResponse, Response},
  routing::get,
};
use groupeats_core::store::ReviewStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, verify_auth};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`. Only the
/// store path and credentials are mandatory; the listen address defaults to
/// localhost.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8080
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the router.
#[derive(Clone)]
pub struct AppState<S: ReviewStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full server router: `/api/*` (authenticated) plus `/health`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ReviewStore + Clone + Send + Sync + 'static,
{
  let api = groupeats_api::api_router(state.store.clone()).layer(
    middleware::from_fn_with_state(state.auth.clone(), require_auth),
  );

  Router::new()
    // Unauthenticated liveness probe.
    .route("/health", get(|| async { "ok" }))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn require_auth(
  State(auth): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  match verify_auth(req.headers(), &auth) {
    Ok(()) => next.run(req).await,
    Err(e) => e.into_response(),
  }
}

// ─── Integration tests ───────────────────────────────────────────────────────
