//! Handlers for lead chat threads and the assistant.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/leads/:id/messages` | Oldest first |
//! | `POST` | `/leads/:id/messages` | Body: `{"message"}`; a bot reply follows |
//! | `GET`  | `/leads/:id/messages/events` | SSE stream of thread changes |
//! | `POST` | `/assistant` | Body: `{"message"}`; nothing is stored |
//!
//! A posted message is answered asynchronously: the handler returns once the
//! user's message is stored, and a background task writes the reply after
//! the configured delay. Watch the thread's event stream to see it land.

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use salesbuddy_core::{
  chat::{ChatMessage, ReplyChannel, Sender, clean_message},
  lead::{ActivityType, NewActivity},
  store::CrmStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
  ApiState,
  auth::CurrentUser,
  error::ApiError,
  events::{self, Change, ChangeEvent, EntityKey},
  extract::{Json, Path},
  leads::{owned_lead, record},
};

#[derive(Debug, Deserialize)]
pub struct MessageBody {
  #[serde(default)]
  pub message: String,
}

// ─── Thread ───────────────────────────────────────────────────────────────────

/// `GET /leads/:id/messages`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_lead(&state, &current, id).await?;
  let messages = state
    .store
    .list_messages(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(messages))
}

/// `POST /leads/:id/messages`
pub async fn send<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<MessageBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let text = clean_message(&body.message)?;
  owned_lead(&state, &current, id).await?;

  let message = state
    .store
    .add_message(id, Sender::User, text.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  record(
    &state,
    NewActivity::new(id, ActivityType::MessageSent, "Message sent")
      .with_data(json!({ "message_id": message.message_id })),
  )
  .await?;

  state.feed.publish(ChangeEvent::new(
    EntityKey::LeadThread(id),
    Change::MessageAdded { message_id: message.message_id },
  ));

  tokio::spawn(reply_later(state, id, text));

  Ok((StatusCode::CREATED, Json(message)))
}

/// Wait out the reply delay, then store and announce the bot's answer. Runs
/// detached from the request; failures are logged and dropped.
async fn reply_later<S>(state: ApiState<S>, lead_id: Uuid, text: String)
where
  S: CrmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  tokio::time::sleep(state.config.reply_delay).await;

  let channel = ReplyChannel::LeadThread;
  let reply = match state
    .collaborators
    .replies
    .generate_reply(channel, &text)
    .await
  {
    Ok(reply) => reply,
    Err(e) => {
      tracing::warn!(%lead_id, error = %e, "reply generation failed");
      return;
    }
  };

  match state.store.add_message(lead_id, channel.sender(), reply).await {
    Ok(message) => {
      state.feed.publish(ChangeEvent::new(
        EntityKey::LeadThread(lead_id),
        Change::MessageAdded { message_id: message.message_id },
      ));
    }
    // The lead may have been deleted while the reply was pending.
    Err(e) => tracing::warn!(%lead_id, error = %e, "failed to store reply"),
  }
}

/// `GET /leads/:id/messages/events`
pub async fn events<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_lead(&state, &current, id).await?;
  Ok(events::sse(state.feed.subscribe(EntityKey::LeadThread(id))))
}

// ─── Assistant ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct AssistantReply {
  pub sender:     Sender,
  pub message:    String,
  pub created_at: DateTime<Utc>,
}

/// `POST /assistant`
pub async fn assistant<S>(
  State(state): State<ApiState<S>>,
  _current: CurrentUser,
  Json(body): Json<MessageBody>,
) -> Result<Json<AssistantReply>, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let text = clean_message(&body.message)?;
  tokio::time::sleep(state.config.reply_delay).await;

  let channel = ReplyChannel::Assistant;
  let message = state
    .collaborators
    .replies
    .generate_reply(channel, &text)
    .await?;

  Ok(Json(AssistantReply {
    sender: channel.sender(),
    message,
    created_at: Utc::now(),
  }))
}
