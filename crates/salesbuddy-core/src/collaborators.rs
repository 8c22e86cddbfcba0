//! External services the application talks to.
//!
//! Each collaborator is a single-method trait so a real provider (SMS
//! gateway, number lookup, language model, object storage) can replace the
//! bundled stub without touching request handlers. Methods return boxed
//! futures so implementations can live behind `Arc<dyn _>`.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{chat::ReplyChannel, phone::MobileNumber};

/// Failure reported by an external collaborator.
#[derive(Debug, Error)]
#[error("{service} unavailable: {message}")]
pub struct CollaboratorError {
  pub service: &'static str,
  pub message: String,
}

impl CollaboratorError {
  pub fn new(service: &'static str, message: impl Into<String>) -> Self {
    Self { service, message: message.into() }
  }
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

// ─── OTP ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpDispatch {
  /// The number the code went to, in `<country><digits>` form.
  pub sent_to:            String,
  pub expires_in_seconds: u32,
}

pub trait OtpSender: Send + Sync {
  fn send_otp<'a>(
    &'a self,
    number: &'a MobileNumber,
  ) -> BoxFuture<'a, CollaboratorResult<OtpDispatch>>;
}

// ─── Number lookup ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberCheck {
  pub is_valid:  bool,
  pub country:   Option<String>,
  pub carrier:   Option<String>,
  pub line_type: Option<String>,
  pub error:     Option<String>,
}

pub trait NumberValidator: Send + Sync {
  fn validate_number<'a>(
    &'a self,
    number: &'a MobileNumber,
  ) -> BoxFuture<'a, CollaboratorResult<NumberCheck>>;
}

// ─── Replies ─────────────────────────────────────────────────────────────────

pub trait ReplyGenerator: Send + Sync {
  /// Produce the text answering `message` on `channel`.
  fn generate_reply<'a>(
    &'a self,
    channel: ReplyChannel,
    message: &'a str,
  ) -> BoxFuture<'a, CollaboratorResult<String>>;
}

// ─── Uploads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
  pub file_name: String,
  pub size:      usize,
  /// Progress percentages reported while the transfer ran, ending at 100.
  pub progress:  Vec<u8>,
}

pub trait FileUploader: Send + Sync {
  fn upload_file<'a>(
    &'a self,
    file_name: &'a str,
    bytes: &'a [u8],
  ) -> BoxFuture<'a, CollaboratorResult<UploadedFile>>;
}
