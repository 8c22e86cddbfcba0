//! Pages whose content is computed or canned rather than stored.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dashboard` | Headline stats and the setup banner flag |
//! | `GET`  | `/navigation` | Sidebar, setup-gated items locked |
//! | `GET`  | `/route?path=` | Public; the page a path maps to and who may see it |
//! | `POST` | `/qualification/enrich` | Needs an email or website |
//! | `GET`  | `/quotation/sample` | The opening worksheet |
//! | `POST` | `/quotation/evaluate` | Totals, margin bands and hints; 400 on out-of-range numbers |
//! | `POST` | `/quotation/send` | 400 unless the quote is valid and approved |
//! | `GET`  | `/demo-delivery` | Catalogs, recent sends and weekly stats |
//! | `POST` | `/demo-delivery/send` | Needs a catalog or a document file |
//! | `GET`  | `/analytics` | Static report |

use axum::{
  extract::State,
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use chrono::Utc;
use salesbuddy_core::{
  analytics::{self, AnalyticsReport, Metric},
  delivery::{self, DeliveryBoard, DeliveryLog, DeliveryRequest},
  enrichment::{self, Enrichment, EnrichmentRequest},
  navigation::{self, Access, NavItem, Route},
  profile::SetupState,
  quotation::{Quote, QuoteSummary, SendVia},
  store::CrmStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  auth::{CurrentUser, authenticate},
  company::setup_state,
  error::ApiError,
  extract::{Json, Query},
};

// ─── Dashboard and navigation ────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Dashboard {
  pub stats:             Vec<Metric>,
  /// Show the "finish company setup" banner.
  pub show_setup_banner: bool,
  pub setup:             SetupState,
}

/// `GET /dashboard`
pub async fn dashboard<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
) -> Result<Json<Dashboard>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let setup = setup_state(&state, current.id()).await?;
  Ok(Json(Dashboard {
    stats: analytics::dashboard_stats(),
    show_setup_banner: !setup.is_complete(),
    setup,
  }))
}

/// `GET /navigation`
pub async fn navigation<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
) -> Result<Json<Vec<NavItem>>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let setup = setup_state(&state, current.id()).await?;
  Ok(Json(navigation::sidebar(setup)))
}

#[derive(Debug, Deserialize)]
pub struct RouteParams {
  #[serde(default)]
  pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteDecision {
  pub route:         Route,
  pub access:        Access,
  pub authenticated: bool,
  /// What `/` shows this visitor. `None` for anonymous visitors.
  pub home:          Option<Route>,
}

/// `GET /route?path=<path>`
///
/// Anonymous callers are allowed; an invalid or expired token is treated the
/// same as no token.
pub async fn route<S>(
  State(state): State<ApiState<S>>,
  headers: HeaderMap,
  Query(params): Query<RouteParams>,
) -> Result<Json<RouteDecision>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let route = Route::resolve(&params.path);
  let current = match authenticate(&headers, &state).await {
    Ok(current) => Some(current),
    Err(ApiError::Unauthorized) => None,
    Err(e) => return Err(e),
  };

  let home = match &current {
    Some(current) => {
      Some(navigation::home_page(setup_state(&state, current.id()).await?))
    }
    None => None,
  };

  Ok(Json(RouteDecision {
    access: navigation::access(&route, current.is_some()),
    authenticated: current.is_some(),
    route,
    home,
  }))
}

// ─── Qualification ───────────────────────────────────────────────────────────

/// `POST /qualification/enrich`
pub async fn enrich<S>(
  _current: CurrentUser,
  Json(body): Json<EnrichmentRequest>,
) -> Result<Json<Enrichment>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(enrichment::enrich(&body)?))
}

// ─── Quotation ───────────────────────────────────────────────────────────────

/// `GET /quotation/sample`
pub async fn quotation_sample<S>(_current: CurrentUser) -> Json<Quote>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Json(Quote::sample())
}

/// `POST /quotation/evaluate`
pub async fn quotation_evaluate<S>(
  _current: CurrentUser,
  Json(quote): Json<Quote>,
) -> Result<Json<QuoteSummary>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(quote.summarize()?))
}

#[derive(Debug, Deserialize)]
pub struct SendQuoteBody {
  pub quote: Quote,
  pub via:   SendVia,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteSent {
  pub sent:  bool,
  pub via:   SendVia,
  pub to:    String,
  pub total: f64,
}

/// `POST /quotation/send`
pub async fn quotation_send<S>(
  _current: CurrentUser,
  Json(body): Json<SendQuoteBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.quote.ensure_sendable()?;
  tracing::info!(via = ?body.via, customer = %body.quote.customer, "quote send stubbed");
  Ok((
    StatusCode::CREATED,
    Json(QuoteSent {
      sent:  true,
      via:   body.via,
      to:    body.quote.email.clone(),
      total: body.quote.total(),
    }),
  ))
}

// ─── Demo delivery ───────────────────────────────────────────────────────────

/// `GET /demo-delivery`
pub async fn delivery_board<S>(_current: CurrentUser) -> Json<DeliveryBoard>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Json(delivery::board())
}

/// `POST /demo-delivery/send`
pub async fn delivery_send<S>(
  _current: CurrentUser,
  Json(body): Json<DeliveryRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let log: DeliveryLog = body.dispatch(Utc::now())?;
  tracing::info!(method = ?log.method, material = %log.catalog, "demo send stubbed");
  Ok((StatusCode::CREATED, Json(log)))
}

// ─── Analytics ───────────────────────────────────────────────────────────────

/// `GET /analytics`
pub async fn analytics<S>(_current: CurrentUser) -> Json<AnalyticsReport>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Json(analytics::report())
}
