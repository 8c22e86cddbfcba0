//! Accounts, sessions and the bearer-token extractor.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sign-up` | Body: `{"email","password","full_name"}`; 201 + token, 409 if taken |
//! | `POST` | `/sign-in` | Body: `{"email","password"}`; 401 on mismatch |
//! | `POST` | `/sign-out` | Bearer token required; 204 |
//! | `GET`  | `/session` | Bearer token required |
//! | `POST` | `/mobile/validate` | Body: `{"country_code","mobile_number"}` |
//! | `POST` | `/otp/send` | Same body; validates then dispatches a code |
//! | `POST` | `/otp/verify` | Adds `"code"`; any 6 digits pass |
//!
//! Passwords are hashed with argon2. A session token is 32 random bytes,
//! URL-safe base64 encoded for the client; the store only sees its SHA-256.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::{FromRequestParts, State},
  http::{HeaderMap, StatusCode, header, request::Parts},
  response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::Utc;
use rand_core::{OsRng, RngCore as _};
use salesbuddy_core::{
  account::{NewUser, Session, User, validate_email, validate_password},
  collaborators::{NumberCheck, OtpDispatch},
  phone::{MobileNumber, validate_otp},
  store::CrmStore,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{ApiState, error::ApiError, extract::Json};

// ─── Tokens and hashes ───────────────────────────────────────────────────────

/// A fresh opaque bearer token.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  B64.encode(bytes)
}

/// The form a token is stored and looked up in.
pub fn token_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Store(format!("argon2 error: {e}").into()))
}

pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc).is_ok_and(|parsed| {
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  })
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The signed-in user. Present in a handler means the request carried a live
/// session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub user:       User,
  pub token_hash: String,
}

impl CurrentUser {
  pub fn id(&self) -> uuid::Uuid { self.user.user_id }
}

/// Resolve the `Authorization: Bearer` header to a user. Used by the
/// extractor and by handlers where signing in is optional.
pub async fn authenticate<S>(
  headers: &HeaderMap,
  state: &ApiState<S>,
) -> Result<CurrentUser, ApiError>
where
  S: CrmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(ApiError::Unauthorized)?;

  let token_hash = token_digest(token);
  let session = state
    .store
    .get_session(&token_hash)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::Unauthorized)?;

  if session.is_expired(Utc::now()) {
    state
      .store
      .delete_session(&token_hash)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    return Err(ApiError::Unauthorized);
  }

  let user = state
    .store
    .get_user(session.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::Unauthorized)?;

  Ok(CurrentUser { user, token_hash })
}

impl<S> FromRequestParts<ApiState<S>> for CurrentUser
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(&parts.headers, state).await
  }
}

// ─── Sign-up / sign-in ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
  pub email:     String,
  pub password:  String,
  #[serde(default)]
  pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionGrant {
  pub token: String,
  pub user:  User,
}

async fn start_session<S>(
  state: &ApiState<S>,
  user: User,
) -> Result<SessionGrant, ApiError>
where
  S: CrmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let token = generate_token();
  let now = Utc::now();
  let ttl = chrono::Duration::from_std(state.config.session_ttl)
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  state
    .store
    .create_session(Session {
      token_hash: token_digest(&token),
      user_id:    user.user_id,
      created_at: now,
      expires_at: now + ttl,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(SessionGrant { token, user })
}

/// `POST /sign-up`
pub async fn sign_up<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<SignUpBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CrmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let email = body.email.trim();
  validate_email(email)?;
  validate_password(&body.password)?;
  let full_name = body.full_name.trim();
  if full_name.is_empty() {
    return Err(salesbuddy_core::Error::MissingField("full name").into());
  }

  let already_registered =
    || ApiError::Conflict(format!("{email} is already registered"));

  // Skips hashing for the common case; the insert below is what decides.
  let existing = state
    .store
    .find_credentials(email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if existing.is_some() {
    return Err(already_registered());
  }

  let user = state
    .store
    .create_user(NewUser {
      email:         email.to_owned(),
      full_name:     full_name.to_owned(),
      password_hash: hash_password(&body.password)?,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(already_registered)?;

  tracing::info!(user_id = %user.user_id, "user signed up");
  let grant = start_session(&state, user).await?;
  Ok((StatusCode::CREATED, Json(grant)))
}

/// `POST /sign-in`
pub async fn sign_in<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<SignInBody>,
) -> Result<Json<SessionGrant>, ApiError>
where
  S: CrmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let creds = state
    .store
    .find_credentials(&body.email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::Unauthorized)?;

  if !verify_password(&body.password, &creds.password_hash) {
    tracing::debug!(user_id = %creds.user.user_id, "password mismatch");
    return Err(ApiError::Unauthorized);
  }

  Ok(Json(start_session(&state, creds.user).await?))
}

/// `POST /sign-out`
pub async fn sign_out<S>(
  State(state): State<ApiState<S>>,
  current: CurrentUser,
) -> Result<StatusCode, ApiError>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .delete_session(&current.token_hash)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /session`
pub async fn session<S>(current: CurrentUser) -> Json<User>
where
  S: CrmStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Json(current.user)
}

// ─── Mobile verification ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  #[serde(flatten)]
  pub number: MobileNumber,
  pub code:   String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Verified {
  pub verified: bool,
  pub number:   String,
}

/// `POST /mobile/validate`
pub async fn validate_mobile<S>(
  State(state): State<ApiState<S>>,
  Json(number): Json<MobileNumber>,
) -> Result<Json<NumberCheck>, ApiError>
where
  S: CrmStore,
{
  if let Err(e) = number.validate() {
    return Ok(Json(NumberCheck {
      is_valid:  false,
      country:   None,
      carrier:   None,
      line_type: None,
      error:     Some(e.to_string()),
    }));
  }
  let check = state.collaborators.numbers.validate_number(&number).await?;
  Ok(Json(check))
}

/// `POST /otp/send`
pub async fn send_otp<S>(
  State(state): State<ApiState<S>>,
  Json(number): Json<MobileNumber>,
) -> Result<Json<OtpDispatch>, ApiError>
where
  S: CrmStore,
{
  number.validate()?;
  let check = state.collaborators.numbers.validate_number(&number).await?;
  if !check.is_valid {
    return Err(ApiError::BadRequest(
      check.error.unwrap_or_else(|| "invalid mobile number".into()),
    ));
  }
  let dispatch = state.collaborators.otp.send_otp(&number).await?;
  Ok(Json(dispatch))
}

/// `POST /otp/verify`
pub async fn verify_otp<S>(
  State(_state): State<ApiState<S>>,
  Json(body): Json<VerifyBody>,
) -> Result<Json<Verified>, ApiError>
where
  S: CrmStore,
{
  body.number.validate()?;
  validate_otp(&body.code)?;
  Ok(Json(Verified { verified: true, number: body.number.formatted() }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokens_are_unique_and_url_safe() {
    let a = generate_token();
    let b = generate_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 43);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
  }

  #[test]
  fn digest_is_stable_hex() {
    let digest = token_digest("abc");
    assert_eq!(digest.len(), 64);
    assert_eq!(digest, token_digest("abc"));
    assert_ne!(digest, token_digest("abd"));
  }

  #[test]
  fn password_round_trip() {
    let phc = hash_password("hunter22").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("hunter22", &phc));
    assert!(!verify_password("hunter23", &phc));
    assert!(!verify_password("hunter22", "not-a-phc-string"));
  }
}
