//! Error types for `salesbuddy-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("password must be at least {0} characters")]
  PasswordTooShort(usize),

  #[error("the terms and conditions must be accepted")]
  TermsNotAccepted,

  #[error("{field} score {value} is outside 0..=100")]
  ScoreOutOfRange { field: &'static str, value: u8 },

  #[error("unknown stage: {0:?}")]
  UnknownStage(String),

  #[error("unknown lead type: {0:?}")]
  UnknownLeadType(String),

  #[error("unknown sender: {0:?}")]
  UnknownSender(String),

  #[error("unknown activity type: {0:?}")]
  UnknownActivityType(String),

  #[error("invalid mobile number: {0}")]
  InvalidPhone(String),

  #[error("verification code must be 6 digits")]
  InvalidOtp,

  #[error("invalid quote: {0}")]
  InvalidQuote(String),

  #[error("quote must be approved before it is sent")]
  QuoteNotApproved,

  #[error("select a catalog or upload a file to send")]
  NothingToDeliver,

  #[error("unsupported file type: {0:?}")]
  UnsupportedFile(String),

  #[error("email or website is required for enrichment")]
  NothingToEnrich,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
