//! Demo and catalog delivery.
//!
//! The catalog library and delivery log are fixed demo data; a send request is
//! validated and echoed back as a new log entry without being stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, catalog::ensure_document, quotation::SendVia};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
  pub id:           String,
  pub name:         String,
  pub size:         String,
  pub last_updated: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
  Sent,
  Delivered,
  Opened,
  Clicked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryLog {
  pub id:        String,
  pub recipient: String,
  pub company:   String,
  pub method:    SendVia,
  pub catalog:   String,
  pub sent_at:   String,
  pub status:    DeliveryStatus,
  pub opened_at: Option<String>,
  pub clicks:    u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
  pub sent:    u32,
  pub opened:  u32,
  pub clicked: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryBoard {
  pub catalogs: Vec<Catalog>,
  pub logs:     Vec<DeliveryLog>,
  pub stats:    WeeklyStats,
}

fn catalog(id: &str, name: &str, size: &str, last_updated: &str) -> Catalog {
  Catalog {
    id:           id.into(),
    name:         name.into(),
    size:         size.into(),
    last_updated: last_updated.into(),
  }
}

pub fn catalogs() -> Vec<Catalog> {
  vec![
    catalog("1", "Product Catalog 2024", "2.3 MB", "2024-01-15"),
    catalog("2", "Service Portfolio", "1.8 MB", "2024-01-10"),
    catalog("3", "Premium Solutions", "3.1 MB", "2024-01-08"),
  ]
}

pub fn board() -> DeliveryBoard {
  let logs = vec![
    DeliveryLog {
      id:        "1".into(),
      recipient: "john@acme.com".into(),
      company:   "Acme Corporation".into(),
      method:    SendVia::Email,
      catalog:   "Product Catalog 2024".into(),
      sent_at:   "2024-01-15 10:30 AM".into(),
      status:    DeliveryStatus::Opened,
      opened_at: Some("2024-01-15 11:45 AM".into()),
      clicks:    3,
    },
    DeliveryLog {
      id:        "2".into(),
      recipient: "sarah@techcorp.com".into(),
      company:   "TechCorp Ltd".into(),
      method:    SendVia::Whatsapp,
      catalog:   "Service Portfolio".into(),
      sent_at:   "2024-01-15 09:15 AM".into(),
      status:    DeliveryStatus::Delivered,
      opened_at: None,
      clicks:    0,
    },
    DeliveryLog {
      id:        "3".into(),
      recipient: "mike@startup.io".into(),
      company:   "Startup Inc".into(),
      method:    SendVia::Email,
      catalog:   "Premium Solutions".into(),
      sent_at:   "2024-01-14 04:20 PM".into(),
      status:    DeliveryStatus::Clicked,
      opened_at: Some("2024-01-14 04:35 PM".into()),
      clicks:    7,
    },
  ];
  DeliveryBoard {
    catalogs: catalogs(),
    logs,
    stats: WeeklyStats { sent: 12, opened: 8, clicked: 5 },
  }
}

/// A request to send demo material to a prospect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRequest {
  pub method:     SendVia,
  #[serde(default)]
  pub recipient:  String,
  pub company:    Option<String>,
  pub catalog_id: Option<String>,
  /// Name of a file uploaded alongside the request.
  pub file_name:  Option<String>,
  pub message:    Option<String>,
}

impl DeliveryRequest {
  /// Resolve what is being sent and build the resulting log entry.
  pub fn dispatch(&self, now: DateTime<Utc>) -> Result<DeliveryLog> {
    let recipient = self.recipient.trim();
    if recipient.is_empty() {
      return Err(Error::MissingField("recipient"));
    }
    let material = match (&self.catalog_id, &self.file_name) {
      (Some(id), _) if !id.is_empty() => catalogs()
        .into_iter()
        .find(|c| &c.id == id)
        .map(|c| c.name)
        .ok_or(Error::NothingToDeliver)?,
      (_, Some(file)) if !file.trim().is_empty() => {
        ensure_document(file.trim())?;
        file.trim().to_owned()
      }
      _ => return Err(Error::NothingToDeliver),
    };
    Ok(DeliveryLog {
      id:        Uuid::new_v4().to_string(),
      recipient: recipient.to_owned(),
      company:   self.company.clone().unwrap_or_default(),
      method:    self.method,
      catalog:   material,
      sent_at:   now.format("%Y-%m-%d %I:%M %p").to_string(),
      status:    DeliveryStatus::Sent,
      opened_at: None,
      clicks:    0,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request() -> DeliveryRequest {
    DeliveryRequest {
      method:     SendVia::Email,
      recipient:  "jane@acme.com".into(),
      company:    Some("Acme".into()),
      catalog_id: None,
      file_name:  None,
      message:    None,
    }
  }

  #[test]
  fn board_matches_stats() {
    let board = board();
    assert_eq!(board.catalogs.len(), 3);
    assert_eq!(board.logs.len(), 3);
    assert_eq!(board.stats, WeeklyStats { sent: 12, opened: 8, clicked: 5 });
  }

  #[test]
  fn needs_catalog_or_file() {
    assert!(matches!(
      request().dispatch(Utc::now()),
      Err(Error::NothingToDeliver)
    ));
  }

  #[test]
  fn catalog_send_names_catalog() {
    let log = DeliveryRequest {
      catalog_id: Some("2".into()),
      ..request()
    }
    .dispatch(Utc::now())
    .unwrap();
    assert_eq!(log.catalog, "Service Portfolio");
    assert_eq!(log.status, DeliveryStatus::Sent);
  }

  #[test]
  fn unknown_catalog_rejected() {
    let req = DeliveryRequest { catalog_id: Some("9".into()), ..request() };
    assert!(req.dispatch(Utc::now()).is_err());
  }

  #[test]
  fn uploaded_file_must_be_a_document() {
    let ok = DeliveryRequest {
      file_name: Some("deck.pptx".into()),
      ..request()
    };
    assert_eq!(ok.dispatch(Utc::now()).unwrap().catalog, "deck.pptx");

    let bad = DeliveryRequest {
      file_name: Some("virus.exe".into()),
      ..request()
    };
    assert!(matches!(
      bad.dispatch(Utc::now()),
      Err(Error::UnsupportedFile(_))
    ));
  }
}
