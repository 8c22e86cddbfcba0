//! Handlers for lead scores and the pipeline stage.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/leads/:id/score` | Zeroes and Initial Contact when unscored |
//! | `PUT`  | `/leads/:id/score` | Body: `{"budget","authority","need","timeline"}` |
//! | `PUT`  | `/leads/:id/stage` | Body: `{"stage":"negotiation"}` |
//! | `POST` | `/scoring/evaluate` | Worksheet; nothing is stored |
//!
//! Setting a stage is lossy: all four sub-scores are overwritten with the
//! stage's representative value.

use axum::extract::State;
use salesbuddy_core::{
  lead::{ActivityType, NewActivity},
  scoring::{self, Bant, Evaluation, ScoreCard, Stage},
  store::CrmStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  ApiState,
  auth::CurrentUser,
  error::ApiError,
  extract::{Json, Path},
  leads::{owned_lead, record},
};

/// `GET /leads/:id/score`
pub async fn get_card<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<ScoreCard>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_lead(&state, &current, id).await?;
  let score = state
    .store
    .get_score(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(ScoreCard::new(score.map(|s| s.bant))))
}

/// `PUT /leads/:id/score`
pub async fn put_score<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
  Json(bant): Json<Bant>,
) -> Result<Json<ScoreCard>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  bant.validate()?;
  owned_lead(&state, &current, id).await?;

  let score = state
    .store
    .upsert_score(id, bant)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  record(
    &state,
    NewActivity::new(
      id,
      ActivityType::ScoreUpdated,
      format!("Score updated to {:.0}", score.total_score),
    )
    .with_data(json!(score.bant)),
  )
  .await?;

  Ok(Json(ScoreCard::new(Some(score.bant))))
}

#[derive(Debug, Deserialize)]
pub struct StageBody {
  pub stage: Stage,
}

/// `PUT /leads/:id/stage`
pub async fn put_stage<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<StageBody>,
) -> Result<Json<ScoreCard>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_lead(&state, &current, id).await?;

  let previous = state
    .store
    .get_score(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .map(|s| Stage::from_total(s.total_score));

  let score = state
    .store
    .upsert_score(id, Bant::uniform(body.stage.synthetic_score()))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  record(
    &state,
    NewActivity::new(
      id,
      ActivityType::StageChanged,
      format!("Stage changed to {}", body.stage),
    )
    .with_data(json!({ "from": previous, "to": body.stage })),
  )
  .await?;

  Ok(Json(ScoreCard::new(Some(score.bant))))
}

/// `POST /scoring/evaluate`
pub async fn evaluate<S>(
  _current: CurrentUser,
  Json(bant): Json<Bant>,
) -> Result<Json<Evaluation>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(scoring::evaluate(bant)?))
}
