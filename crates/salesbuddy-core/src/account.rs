//! Accounts and sessions.
//!
//! A user signs up with an email, a password and a display name. Passwords are
//! hashed before they reach this layer; the store only ever sees the PHC
//! string. Sessions are keyed by a digest of the bearer token, never the token
//! itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub email:      String,
  pub full_name:  String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`CrmStore::create_user`](crate::store::CrmStore::create_user).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub full_name:     String,
  /// argon2 PHC string.
  pub password_hash: String,
}

/// A user together with the stored password hash, as needed by sign-in.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}

/// Lowercase and trim an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

/// Shallow shape check: `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> Result<()> {
  let invalid = || Error::InvalidEmail(email.to_owned());
  if email.chars().any(char::is_whitespace) {
    return Err(invalid());
  }
  let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
  let dotted = domain
    .split_once('.')
    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
  if local.is_empty() || domain.contains('@') || !dotted {
    return Err(invalid());
  }
  Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::PasswordTooShort(MIN_PASSWORD_LEN));
  }
  Ok(())
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  /// SHA-256 hex digest of the bearer token.
  pub token_hash: String,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  #[test]
  fn email_shape() {
    assert!(validate_email("jane@acme.com").is_ok());
    assert!(validate_email("jane.doe@mail.acme.io").is_ok());
    assert!(validate_email("").is_err());
    assert!(validate_email("jane").is_err());
    assert!(validate_email("@acme.com").is_err());
    assert!(validate_email("jane@acme").is_err());
    assert!(validate_email("jane@.com").is_err());
    assert!(validate_email("ja ne@acme.com").is_err());
  }

  #[test]
  fn normalizes_case_and_whitespace() {
    assert_eq!(normalize_email("  Jane@ACME.com "), "jane@acme.com");
  }

  #[test]
  fn short_password_rejected() {
    assert!(matches!(
      validate_password("12345"),
      Err(Error::PasswordTooShort(6))
    ));
    assert!(validate_password("123456").is_ok());
  }

  #[test]
  fn session_expiry_is_inclusive() {
    let now = Utc::now();
    let session = Session {
      token_hash: "ab".into(),
      user_id:    Uuid::new_v4(),
      created_at: now - Duration::hours(1),
      expires_at: now,
    };
    assert!(session.is_expired(now));
    assert!(!session.is_expired(now - Duration::seconds(1)));
  }
}
