//! Leads and their activity timeline.
//!
//! A lead is a prospective customer owned by one user. It optionally carries a
//! BANT score (see [`crate::scoring`]) and a chat thread (see [`crate::chat`]).
//! Every change the application makes to a lead is also appended to its
//! activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, profile::non_blank};

/// Status assigned to leads created without one.
pub const DEFAULT_STATUS: &str = "new";

// ─── Lead ────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
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
pub enum LeadType {
  #[default]
  B2b,
  B2c,
}

impl LeadType {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownLeadType(s.to_owned()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
  pub lead_id:    Uuid,
  pub user_id:    Uuid,
  pub name:       String,
  pub email:      Option<String>,
  pub company:    Option<String>,
  pub phone:      Option<String>,
  pub website:    Option<String>,
  pub lead_type:  LeadType,
  pub status:     String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A lead as shown in the list view, with its current score total embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadSummary {
  #[serde(flatten)]
  pub lead:        Lead,
  pub total_score: Option<f64>,
}

/// Input for creating a lead. Only `name` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLead {
  #[serde(default)]
  pub name:      String,
  pub email:     Option<String>,
  pub company:   Option<String>,
  pub phone:     Option<String>,
  pub website:   Option<String>,
  #[serde(default)]
  pub lead_type: LeadType,
  pub status:    Option<String>,
}

impl NewLead {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Default::default() }
  }

  /// Reject a blank name and normalise the optional fields.
  ///
  /// Runs before any store call; a lead that fails here never reaches the
  /// database.
  pub fn validate(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::MissingField("lead name"));
    }
    Ok(Self {
      name,
      email: non_blank(self.email),
      company: non_blank(self.company),
      phone: non_blank(self.phone),
      website: non_blank(self.website),
      lead_type: self.lead_type,
      status: non_blank(self.status).or_else(|| Some(DEFAULT_STATUS.into())),
    })
  }
}

// ─── Activity ────────────────────────────────────────────────────────────────

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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityType {
  LeadCreated,
  ScoreUpdated,
  StageChanged,
  MessageSent,
}

impl ActivityType {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownActivityType(s.to_owned()))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
  pub activity_id:   Uuid,
  pub lead_id:       Uuid,
  pub activity_type: ActivityType,
  pub description:   String,
  pub data:          serde_json::Value,
  pub created_at:    DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
  pub lead_id:       Uuid,
  pub activity_type: ActivityType,
  pub description:   String,
  pub data:          serde_json::Value,
}

impl NewActivity {
  pub fn new(
    lead_id: Uuid,
    activity_type: ActivityType,
    description: impl Into<String>,
  ) -> Self {
    Self {
      lead_id,
      activity_type,
      description: description.into(),
      data: serde_json::Value::Null,
    }
  }

  pub fn with_data(mut self, data: serde_json::Value) -> Self {
    self.data = data;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn name_only_is_enough() {
    let lead = NewLead::named("Acme Corp").validate().unwrap();
    assert_eq!(lead.name, "Acme Corp");
    assert_eq!(lead.lead_type, LeadType::B2b);
    assert_eq!(lead.status.as_deref(), Some(DEFAULT_STATUS));
    assert_eq!(lead.email, None);
  }

  #[test]
  fn blank_name_rejected() {
    for name in ["", "   ", "\t\n"] {
      assert!(matches!(
        NewLead::named(name).validate(),
        Err(Error::MissingField("lead name"))
      ));
    }
  }

  #[test]
  fn missing_name_field_deserializes_then_fails_validation() {
    let lead: NewLead =
      serde_json::from_str(r#"{"email":"a@b.co","lead_type":"b2c"}"#).unwrap();
    assert_eq!(lead.lead_type, LeadType::B2c);
    assert!(lead.validate().is_err());
  }

  #[test]
  fn lead_type_text_form() {
    assert_eq!(LeadType::B2c.as_ref(), "b2c");
    assert_eq!(LeadType::parse("b2b").unwrap(), LeadType::B2b);
    assert!(matches!(
      LeadType::parse("b2x"),
      Err(Error::UnknownLeadType(_))
    ));
  }

  #[test]
  fn activity_type_text_form() {
    assert_eq!(ActivityType::StageChanged.as_ref(), "stage_changed");
    assert_eq!(
      ActivityType::parse("message_sent").unwrap(),
      ActivityType::MessageSent
    );
  }
}
