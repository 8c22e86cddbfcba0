//! Stand-in collaborators.
//!
//! None of these reach a real service. They log what a real provider would
//! have been asked to do and return a plausible answer.

use std::time::Duration;

use futures::future::BoxFuture;
use salesbuddy_core::{
  chat::ReplyChannel,
  collaborators::{
    CollaboratorResult, FileUploader, NumberCheck, NumberValidator,
    OtpDispatch, OtpSender, ReplyGenerator, UploadedFile,
  },
  phone::MobileNumber,
};

/// How long a stubbed one-time code claims to be valid for.
const OTP_TTL_SECONDS: u32 = 300;

// ─── OTP ─────────────────────────────────────────────────────────────────────

/// Pretends to text a code. Any six-digit code verifies.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubOtpSender;

impl OtpSender for StubOtpSender {
  fn send_otp<'a>(
    &'a self,
    number: &'a MobileNumber,
  ) -> BoxFuture<'a, CollaboratorResult<OtpDispatch>> {
    Box::pin(async move {
      let sent_to = number.formatted();
      tracing::info!(to = %sent_to, "otp dispatch stubbed, no SMS sent");
      Ok(OtpDispatch { sent_to, expires_in_seconds: OTP_TTL_SECONDS })
    })
  }
}

// ─── Number lookup ───────────────────────────────────────────────────────────

/// Applies the local length rules and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatNumberValidator;

impl NumberValidator for FormatNumberValidator {
  fn validate_number<'a>(
    &'a self,
    number: &'a MobileNumber,
  ) -> BoxFuture<'a, CollaboratorResult<NumberCheck>> {
    Box::pin(async move {
      let check = match number.validate() {
        Ok(()) => NumberCheck {
          is_valid:  true,
          country:   None,
          carrier:   None,
          line_type: Some("mobile".into()),
          error:     None,
        },
        Err(e) => NumberCheck {
          is_valid:  false,
          country:   None,
          carrier:   None,
          line_type: None,
          error:     Some(e.to_string()),
        },
      };
      tracing::debug!(number = %number.formatted(), valid = check.is_valid, "number lookup stubbed");
      Ok(check)
    })
  }
}

// ─── Replies ─────────────────────────────────────────────────────────────────

/// Echoes the message back inside a fixed sentence.
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedReplyGenerator;

impl CannedReplyGenerator {
  pub fn reply(channel: ReplyChannel, message: &str) -> String {
    match channel {
      ReplyChannel::LeadThread => format!(
        "Thanks for your message about \"{message}\". I'll help you with this \
         lead qualification process."
      ),
      ReplyChannel::Assistant => format!(
        "Thank you for your message: \"{message}\". This is a simulated \
         response. Once you connect your backend model, I'll provide more \
         intelligent responses!"
      ),
    }
  }
}

impl ReplyGenerator for CannedReplyGenerator {
  fn generate_reply<'a>(
    &'a self,
    channel: ReplyChannel,
    message: &'a str,
  ) -> BoxFuture<'a, CollaboratorResult<String>> {
    Box::pin(async move { Ok(Self::reply(channel, message)) })
  }
}

// ─── Uploads ─────────────────────────────────────────────────────────────────

/// Fakes a transfer by ticking progress in fixed steps. Nothing is stored and
/// a started upload always runs to completion.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedUploader {
  pub step_delay: Duration,
}

impl SimulatedUploader {
  /// Percentages reported at each tick.
  pub const STEPS: [u8; 4] = [25, 50, 75, 100];

  pub fn new(step_delay: Duration) -> Self { Self { step_delay } }
}

impl FileUploader for SimulatedUploader {
  fn upload_file<'a>(
    &'a self,
    file_name: &'a str,
    bytes: &'a [u8],
  ) -> BoxFuture<'a, CollaboratorResult<UploadedFile>> {
    Box::pin(async move {
      let mut progress = Vec::with_capacity(Self::STEPS.len());
      for step in Self::STEPS {
        tokio::time::sleep(self.step_delay).await;
        tracing::debug!(file = file_name, progress = step, "upload progress");
        progress.push(step);
      }
      tracing::info!(file = file_name, size = bytes.len(), "upload simulated");
      Ok(UploadedFile {
        file_name: file_name.to_owned(),
        size: bytes.len(),
        progress,
      })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lead_thread_reply_text() {
    assert_eq!(
      CannedReplyGenerator::reply(ReplyChannel::LeadThread, "pricing"),
      "Thanks for your message about \"pricing\". I'll help you with this lead \
       qualification process."
    );
  }

  #[tokio::test]
  async fn assistant_reply_mentions_message() {
    let reply = CannedReplyGenerator
      .generate_reply(ReplyChannel::Assistant, "hello")
      .await
      .unwrap();
    assert!(reply.starts_with("Thank you for your message: \"hello\"."));
    assert!(reply.contains("simulated response"));
  }

  #[tokio::test]
  async fn upload_reports_every_step() {
    let uploader = SimulatedUploader::new(Duration::ZERO);
    let file = uploader.upload_file("catalog.csv", b"a,b").await.unwrap();
    assert_eq!(file.progress, SimulatedUploader::STEPS);
    assert_eq!(file.size, 3);
  }

  #[tokio::test]
  async fn validator_reports_format_errors() {
    let check = FormatNumberValidator
      .validate_number(&MobileNumber::new("+1", "555"))
      .await
      .unwrap();
    assert!(!check.is_valid);
    assert!(check.error.is_some());
  }

  #[tokio::test]
  async fn otp_goes_to_formatted_number() {
    let dispatch = StubOtpSender
      .send_otp(&MobileNumber::new("+44", "07700 900123"))
      .await
      .unwrap();
    assert_eq!(dispatch.sent_to, "+4407700900123");
  }
}
