//! JSON REST API for SalesBuddy.
//!
//! Exposes axum [`Router`]s backed by any [`salesbuddy_core::store::CrmStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new()
//!   .nest("/auth", salesbuddy_api::auth_router(state.clone()))
//!   .nest("/api", salesbuddy_api::api_router(state))
//! ```

pub mod auth;
pub mod chat;
pub mod company;
pub mod error;
pub mod events;
pub mod extract;
pub mod leads;
pub mod presentation;
pub mod scoring;
pub mod stubs;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post, put},
};
use salesbuddy_core::{
  collaborators::{FileUploader, NumberValidator, OtpSender, ReplyGenerator},
  store::CrmStore,
};

pub use error::ApiError;
pub use events::ChangeFeed;

// ─── State ───────────────────────────────────────────────────────────────────

/// Tunables the handlers read at request time.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Lifetime of a bearer token issued at sign-in.
  pub session_ttl:      Duration,
  /// Pause before a chat reply is written.
  pub reply_delay:      Duration,
  /// Largest accepted upload body.
  pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      session_ttl:      Duration::from_secs(7 * 24 * 60 * 60),
      reply_delay:      Duration::from_millis(1000),
      max_upload_bytes: 10 * 1024 * 1024,
    }
  }
}

/// The external services handlers call out to.
#[derive(Clone)]
pub struct Collaborators {
  pub otp:     Arc<dyn OtpSender>,
  pub numbers: Arc<dyn NumberValidator>,
  pub replies: Arc<dyn ReplyGenerator>,
  pub uploads: Arc<dyn FileUploader>,
}

impl Collaborators {
  /// Every collaborator replaced by its local stand-in.
  pub fn stubbed(upload_step_delay: Duration) -> Self {
    Self {
      otp:     Arc::new(stubs::StubOtpSender),
      numbers: Arc::new(stubs::FormatNumberValidator),
      replies: Arc::new(stubs::CannedReplyGenerator),
      uploads: Arc::new(stubs::SimulatedUploader::new(upload_step_delay)),
    }
  }
}

/// Shared state threaded through all API handlers.
#[derive(Clone)]
pub struct ApiState<S: CrmStore> {
  pub store:         Arc<S>,
  pub feed:          ChangeFeed,
  pub collaborators: Collaborators,
  pub config:        Arc<ApiConfig>,
}

impl<S: CrmStore> ApiState<S> {
  pub fn new(store: Arc<S>, collaborators: Collaborators, config: ApiConfig) -> Self {
    Self {
      store,
      feed: ChangeFeed::new(),
      collaborators,
      config: Arc::new(config),
    }
  }
}

// ─── Routers ─────────────────────────────────────────────────────────────────

/// Sign-up, sign-in and the mobile verification step.
pub fn auth_router<S>(state: ApiState<S>) -> Router<()>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/sign-up", post(auth::sign_up::<S>))
    .route("/sign-in", post(auth::sign_in::<S>))
    .route("/sign-out", post(auth::sign_out::<S>))
    .route("/session", get(auth::session::<S>))
    .route("/mobile/validate", post(auth::validate_mobile::<S>))
    .route("/otp/send", post(auth::send_otp::<S>))
    .route("/otp/verify", post(auth::verify_otp::<S>))
    .with_state(state)
}

/// Everything behind the session gate, plus the public route resolver.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let upload_limit = state.config.max_upload_bytes;
  Router::new()
    // Company setup
    .route("/company", get(company::get_company::<S>).put(company::save::<S>))
    .route("/company/setup", get(company::setup_status::<S>))
    .route(
      "/company/uploads",
      post(company::upload::<S>).layer(DefaultBodyLimit::max(upload_limit)),
    )
    .route("/company/events", get(company::events::<S>))
    // Leads
    .route("/leads", get(leads::list::<S>).post(leads::create::<S>))
    .route("/leads/{id}", get(leads::get_one::<S>).delete(leads::delete_one::<S>))
    .route("/leads/{id}/activities", get(leads::activities::<S>))
    // Scoring
    .route("/leads/{id}/score", get(scoring::get_card::<S>).put(scoring::put_score::<S>))
    .route("/leads/{id}/stage", put(scoring::put_stage::<S>))
    .route("/scoring/evaluate", post(scoring::evaluate::<S>))
    // Chat
    .route(
      "/leads/{id}/messages",
      get(chat::list::<S>).post(chat::send::<S>),
    )
    .route("/leads/{id}/messages/events", get(chat::events::<S>))
    .route("/assistant", post(chat::assistant::<S>))
    // Presentation pages
    .route("/dashboard", get(presentation::dashboard::<S>))
    .route("/navigation", get(presentation::navigation::<S>))
    .route("/route", get(presentation::route::<S>))
    .route("/qualification/enrich", post(presentation::enrich::<S>))
    .route("/quotation/sample", get(presentation::quotation_sample::<S>))
    .route("/quotation/evaluate", post(presentation::quotation_evaluate::<S>))
    .route("/quotation/send", post(presentation::quotation_send::<S>))
    .route("/demo-delivery", get(presentation::delivery_board::<S>))
    .route("/demo-delivery/send", post(presentation::delivery_send::<S>))
    .route("/analytics", get(presentation::analytics::<S>))
    .with_state(state)
}
