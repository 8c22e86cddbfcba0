//! Per-lead chat threads.
//!
//! Messages are append-only. Every user message is answered by a reply from
//! the configured [`ReplyGenerator`](crate::collaborators::ReplyGenerator)
//! a short time later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
  User,
  Bot,
  Assistant,
}

impl Sender {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownSender(s.to_owned()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub message_id: Uuid,
  pub lead_id:    Uuid,
  pub sender:     Sender,
  pub message:    String,
  pub created_at: DateTime<Utc>,
}

/// Where a generated reply will be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyChannel {
  /// The qualification thread attached to a lead.
  LeadThread,
  /// The free-standing AI assistant page.
  Assistant,
}

impl ReplyChannel {
  /// Which sender a reply on this channel is recorded as.
  pub fn sender(self) -> Sender {
    match self {
      Self::LeadThread => Sender::Bot,
      Self::Assistant => Sender::Assistant,
    }
  }
}

/// Trim a user-typed message, rejecting one that is blank.
pub fn clean_message(message: &str) -> Result<String> {
  let message = message.trim();
  if message.is_empty() {
    return Err(Error::MissingField("message"));
  }
  Ok(message.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_message_rejected() {
    assert!(clean_message("  \n").is_err());
    assert_eq!(clean_message(" hi ").unwrap(), "hi");
  }

  #[test]
  fn channel_sender() {
    assert_eq!(ReplyChannel::LeadThread.sender(), Sender::Bot);
    assert_eq!(ReplyChannel::Assistant.sender(), Sender::Assistant);
    assert_eq!(Sender::parse("assistant").unwrap(), Sender::Assistant);
    assert!(Sender::parse("robot").is_err());
  }
}
