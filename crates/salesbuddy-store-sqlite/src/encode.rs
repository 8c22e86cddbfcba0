//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (nanosecond
//! precision, `Z` suffix) so that lexicographic `ORDER BY` matches
//! chronological order. Enums are stored as their lowercase text form and
//! UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use salesbuddy_core::{
  account::{Credentials, Session, User},
  chat::{ChatMessage, Sender},
  lead::{Activity, ActivityType, Lead, LeadSummary, LeadType},
  profile::{Product, Profile},
  scoring::{Bant, LeadScore},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Users and sessions ──────────────────────────────────────────────────────

/// Raw strings read from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub full_name:     String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub const COLUMNS: &'static str =
    "user_id, email, full_name, password_hash, created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get("user_id")?,
      email:         row.get("email")?,
      full_name:     row.get("full_name")?,
      password_hash: row.get("password_hash")?,
      created_at:    row.get("created_at")?,
    })
  }

  pub fn into_credentials(self) -> Result<Credentials> {
    Ok(Credentials {
      user:          User {
        user_id:    decode_uuid(&self.user_id)?,
        email:      self.email,
        full_name:  self.full_name,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}

pub struct RawSession {
  pub token_hash: String,
  pub user_id:    String,
  pub created_at: String,
  pub expires_at: String,
}

impl RawSession {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      token_hash: row.get("token_hash")?,
      user_id:    row.get("user_id")?,
      created_at: row.get("created_at")?,
      expires_at: row.get("expires_at")?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      token_hash: self.token_hash,
      user_id:    decode_uuid(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}

// ─── Company ─────────────────────────────────────────────────────────────────

pub struct RawProfile {
  pub user_id:      String,
  pub company_name: Option<String>,
  pub email:        Option<String>,
  pub full_name:    Option<String>,
  pub industry:     Option<String>,
  pub headquarters: Option<String>,
  pub website:      Option<String>,
  pub linkedin_url: Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawProfile {
  pub const COLUMNS: &'static str = "user_id, company_name, email, full_name, \
                                     industry, headquarters, website, \
                                     linkedin_url, created_at, updated_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get("user_id")?,
      company_name: row.get("company_name")?,
      email:        row.get("email")?,
      full_name:    row.get("full_name")?,
      industry:     row.get("industry")?,
      headquarters: row.get("headquarters")?,
      website:      row.get("website")?,
      linkedin_url: row.get("linkedin_url")?,
      created_at:   row.get("created_at")?,
      updated_at:   row.get("updated_at")?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:      decode_uuid(&self.user_id)?,
      company_name: self.company_name,
      email:        self.email,
      full_name:    self.full_name,
      industry:     self.industry,
      headquarters: self.headquarters,
      website:      self.website,
      linkedin_url: self.linkedin_url,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawProduct {
  pub product_id:  String,
  pub user_id:     String,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  String,
}

impl RawProduct {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:  row.get("product_id")?,
      user_id:     row.get("user_id")?,
      name:        row.get("name")?,
      description: row.get("description")?,
      created_at:  row.get("created_at")?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      product_id:  decode_uuid(&self.product_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

// ─── Leads ───────────────────────────────────────────────────────────────────

/// Raw strings read from a `leads` row, optionally joined with its score.
pub struct RawLead {
  pub lead_id:     String,
  pub user_id:     String,
  pub name:        String,
  pub email:       Option<String>,
  pub company:     Option<String>,
  pub phone:       Option<String>,
  pub website:     Option<String>,
  pub lead_type:   String,
  pub status:      String,
  pub created_at:  String,
  pub updated_at:  String,
  // lead_scores join
  pub total_score: Option<f64>,
}

impl RawLead {
  /// Column list for a `leads` table aliased as `l`.
  pub const COLUMNS: &'static str =
    "l.lead_id AS lead_id, l.user_id AS user_id, l.name AS name, \
     l.email AS email, l.company AS company, l.phone AS phone, \
     l.website AS website, l.lead_type AS lead_type, l.status AS status, \
     l.created_at AS created_at, l.updated_at AS updated_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lead_id:     row.get("lead_id")?,
      user_id:     row.get("user_id")?,
      name:        row.get("name")?,
      email:       row.get("email")?,
      company:     row.get("company")?,
      phone:       row.get("phone")?,
      website:     row.get("website")?,
      lead_type:   row.get("lead_type")?,
      status:      row.get("status")?,
      created_at:  row.get("created_at")?,
      updated_at:  row.get("updated_at")?,
      total_score: None,
    })
  }

  /// As [`RawLead::from_row`], also reading the joined `total_score`.
  pub fn from_scored_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let total_score = row.get("total_score")?;
    Ok(Self { total_score, ..Self::from_row(row)? })
  }

  pub fn into_lead(self) -> Result<Lead> {
    Ok(Lead {
      lead_id:    decode_uuid(&self.lead_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      email:      self.email,
      company:    self.company,
      phone:      self.phone,
      website:    self.website,
      lead_type:  LeadType::parse(&self.lead_type)?,
      status:     self.status,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }

  pub fn into_summary(self) -> Result<LeadSummary> {
    let total_score = self.total_score;
    Ok(LeadSummary { lead: self.into_lead()?, total_score })
  }
}

pub struct RawScore {
  pub lead_id:     String,
  pub bant:        Bant,
  pub total_score: f64,
  pub updated_at:  String,
}

impl RawScore {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lead_id:     row.get("lead_id")?,
      bant:        Bant {
        budget:    row.get("budget")?,
        authority: row.get("authority")?,
        need:      row.get("need")?,
        timeline:  row.get("timeline")?,
      },
      total_score: row.get("total_score")?,
      updated_at:  row.get("updated_at")?,
    })
  }

  pub fn into_score(self) -> Result<LeadScore> {
    Ok(LeadScore {
      lead_id:     decode_uuid(&self.lead_id)?,
      bant:        self.bant,
      total_score: self.total_score,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Chat and activity ───────────────────────────────────────────────────────

pub struct RawMessage {
  pub message_id: String,
  pub lead_id:    String,
  pub sender:     String,
  pub message:    String,
  pub created_at: String,
}

impl RawMessage {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id: row.get("message_id")?,
      lead_id:    row.get("lead_id")?,
      sender:     row.get("sender")?,
      message:    row.get("message")?,
      created_at: row.get("created_at")?,
    })
  }

  pub fn into_message(self) -> Result<ChatMessage> {
    Ok(ChatMessage {
      message_id: decode_uuid(&self.message_id)?,
      lead_id:    decode_uuid(&self.lead_id)?,
      sender:     Sender::parse(&self.sender)?,
      message:    self.message,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawActivity {
  pub activity_id:   String,
  pub lead_id:       String,
  pub activity_type: String,
  pub description:   String,
  pub data:          String,
  pub created_at:    String,
}

impl RawActivity {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      activity_id:   row.get("activity_id")?,
      lead_id:       row.get("lead_id")?,
      activity_type: row.get("activity_type")?,
      description:   row.get("description")?,
      data:          row.get("data")?,
      created_at:    row.get("created_at")?,
    })
  }

  pub fn into_activity(self) -> Result<Activity> {
    Ok(Activity {
      activity_id:   decode_uuid(&self.activity_id)?,
      lead_id:       decode_uuid(&self.lead_id)?,
      activity_type: ActivityType::parse(&self.activity_type)?,
      description:   self.description,
      data:          serde_json::from_str(&self.data)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexicographically() {
    let earlier = Utc.with_ymd_and_hms(2024, 1, 15, 9, 59, 59).unwrap();
    let later = earlier + chrono::Duration::nanoseconds(1);
    let (a, b) = (encode_dt(earlier), encode_dt(later));
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), later);
  }

  #[test]
  fn bad_timestamp_is_an_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
