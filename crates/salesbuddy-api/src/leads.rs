//! Handlers for `/leads` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/leads` | Newest first, each with `total_score` |
//! | `POST`   | `/leads` | Body: `{"name", ..}`; 400 on a blank name |
//! | `GET`    | `/leads/:id` | 404 if missing or not the caller's |
//! | `DELETE` | `/leads/:id` | 204; score, messages and activity go with it |
//! | `GET`    | `/leads/:id/activities` | Oldest first |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use salesbuddy_core::{
  lead::{Activity, ActivityType, Lead, LeadSummary, NewActivity, NewLead},
  store::CrmStore,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
  ApiState,
  auth::CurrentUser,
  error::ApiError,
  extract::{Json, Path},
};

/// Fetch a lead the caller owns, or 404. Every per-lead handler goes through
/// this before touching child rows.
pub async fn owned_lead<S>(
  state: &ApiState<S>,
  current: &CurrentUser,
  lead_id: Uuid,
) -> Result<Lead, ApiError>
where
  S: CrmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_lead(current.id(), lead_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("lead {lead_id} not found")))
}

/// Append to a lead's activity log.
pub async fn record<S>(
  state: &ApiState<S>,
  activity: NewActivity,
) -> Result<Activity, ApiError>
where
  S: CrmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .record_activity(activity)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /leads`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
) -> Result<Json<Vec<LeadSummary>>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let leads = state
    .store
    .list_leads(current.id())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(leads))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /leads`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Json(body): Json<NewLead>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let input = body.validate()?;
  let lead = state
    .store
    .create_lead(current.id(), input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  record(
    &state,
    NewActivity::new(
      lead.lead_id,
      ActivityType::LeadCreated,
      format!("Lead {} created", lead.name),
    )
    .with_data(json!({ "lead_type": lead.lead_type })),
  )
  .await?;

  tracing::info!(lead_id = %lead.lead_id, "lead created");
  Ok((StatusCode::CREATED, Json(lead)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /leads/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Lead>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(owned_lead(&state, &current, id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /leads/:id`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = state
    .store
    .delete_lead(current.id(), id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !deleted {
    return Err(ApiError::NotFound(format!("lead {id} not found")));
  }
  tracing::info!(lead_id = %id, "lead deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Activity ─────────────────────────────────────────────────────────────────

/// `GET /leads/:id/activities`
pub async fn activities<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Activity>>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_lead(&state, &current, id).await?;
  let activities = state
    .store
    .list_activities(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(activities))
}
