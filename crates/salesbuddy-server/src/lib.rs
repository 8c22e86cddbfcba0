//! HTTP server for SalesBuddy.
//!
//! Mounts the API routers from [`salesbuddy_api`] under `/auth` and `/api`
//! and wraps them in request tracing. The binary in `main.rs` loads
//! [`ServerConfig`], opens the store and serves [`router`].

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use salesbuddy_api::{ApiConfig, ApiState, Collaborators};
use salesbuddy_core::store::CrmStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SALESBUDDY_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub session_ttl_hours:    u64,
  pub chat_reply_delay_ms:  u64,
  pub upload_step_delay_ms: u64,
  pub max_upload_bytes:     usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_string(),
      port:                 8080,
      store_path:           PathBuf::from("~/.local/share/salesbuddy/salesbuddy.db"),
      session_ttl_hours:    7 * 24,
      chat_reply_delay_ms:  1000,
      upload_step_delay_ms: 500,
      max_upload_bytes:     10 * 1024 * 1024,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      session_ttl:      Duration::from_secs(self.session_ttl_hours * 60 * 60),
      reply_delay:      Duration::from_millis(self.chat_reply_delay_ms),
      max_upload_bytes: self.max_upload_bytes,
    }
  }

  pub fn collaborators(&self) -> Collaborators {
    Collaborators::stubbed(Duration::from_millis(self.upload_step_delay_ms))
  }

  /// Application state over `store` using this configuration.
  pub fn state<S: CrmStore>(&self, store: S) -> ApiState<S> {
    ApiState::new(Arc::new(store), self.collaborators(), self.api_config())
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .nest("/auth", salesbuddy_api::auth_router(state.clone()))
    .nest("/api", salesbuddy_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
