//! Handlers for `/company` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/company` | `{profile, products}` |
//! | `PUT`  | `/company` | Company form plus `products`; publishes a profile change |
//! | `GET`  | `/company/setup` | `{has_company_setup, state}` |
//! | `POST` | `/company/uploads?filename=` | Raw body; CSVs are parsed into products |
//! | `GET`  | `/company/events` | SSE stream of profile changes |

use axum::{
  body::Bytes,
  extract::State,
  http::{HeaderMap, header},
  response::IntoResponse,
};
use salesbuddy_core::{
  catalog::{is_csv, parse_products_csv},
  collaborators::UploadedFile,
  profile::{
    CompanyDetails, NewProduct, Product, Profile, SetupState, clean_products,
  },
  store::CrmStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  auth::CurrentUser,
  error::ApiError,
  events::{self, Change, ChangeEvent, EntityKey},
  extract::{Json, Query},
};

// ─── Read ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyView {
  pub profile:  Option<Profile>,
  pub products: Vec<Product>,
}

/// `GET /company`
pub async fn get_company<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
) -> Result<Json<CompanyView>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = state
    .store
    .get_profile(current.id())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let products = state
    .store
    .list_products(current.id())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(CompanyView { profile, products }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetupStatus {
  pub has_company_setup: bool,
  pub state:             SetupState,
}

/// Whether the caller has finished company setup. Store failures surface as
/// errors rather than as an incomplete setup.
pub async fn setup_state<S>(
  state: &ApiState<S>,
  user_id: uuid::Uuid,
) -> Result<SetupState, ApiError>
where
  S: CrmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = state
    .store
    .get_profile(user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(SetupState::of(profile.as_ref()))
}

/// `GET /company/setup`
pub async fn setup_status<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
) -> Result<Json<SetupStatus>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let setup = setup_state(&state, current.id()).await?;
  Ok(Json(SetupStatus {
    has_company_setup: setup.is_complete(),
    state:             setup,
  }))
}

// ─── Save ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveBody {
  #[serde(flatten)]
  pub details:  CompanyDetails,
  #[serde(default)]
  pub products: Vec<NewProduct>,
}

/// `PUT /company`
pub async fn save<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Json(body): Json<SaveBody>,
) -> Result<Json<CompanyView>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let details = body.details.validate()?;
  let products = clean_products(body.products);
  let user_id = current.id();

  let profile = state
    .store
    .upsert_company(user_id, details)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let products = state
    .store
    .replace_products(user_id, products)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let notified = state.feed.publish(ChangeEvent::new(
    EntityKey::Profile(user_id),
    Change::ProfileUpdated,
  ));
  tracing::info!(%user_id, products = products.len(), notified, "company saved");

  Ok(Json(CompanyView { profile: Some(profile), products }))
}

// ─── Upload ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResult {
  pub file:     UploadedFile,
  /// Rows read from a CSV catalog. Empty for any other file type.
  pub products: Vec<NewProduct>,
}

/// `POST /company/uploads?filename=<name>`
pub async fn upload<S>(
  State(state): State<ApiState<S>>,
  _current: CurrentUser,
  Query(params): Query<UploadParams>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let file_name = params.filename.trim();
  if file_name.is_empty() {
    return Err(salesbuddy_core::Error::MissingField("filename").into());
  }

  let file = state
    .collaborators
    .uploads
    .upload_file(file_name, &body)
    .await?;

  let content_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok());
  let products = if is_csv(file_name, content_type) {
    parse_products_csv(&String::from_utf8_lossy(&body))
  } else {
    Vec::new()
  };

  Ok(Json(UploadResult { file, products }))
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// `GET /company/events`
pub async fn events<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
) -> impl IntoResponse
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  events::sse(state.feed.subscribe(EntityKey::Profile(current.id())))
}
