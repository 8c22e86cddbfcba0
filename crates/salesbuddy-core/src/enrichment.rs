//! Lead enrichment.
//!
//! There is no data provider behind this yet. Any request that names an
//! email or website gets the same canned company profile back.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, lead::LeadType, profile::non_blank};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentRequest {
  #[serde(default)]
  pub name:      String,
  pub email:     Option<String>,
  pub company:   Option<String>,
  pub phone:     Option<String>,
  pub website:   Option<String>,
  #[serde(default)]
  pub lead_type: LeadType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedinProfile {
  pub profile:    String,
  pub title:      String,
  pub company:    String,
  pub experience: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
  pub name:     String,
  pub industry: String,
  pub size:     String,
  pub revenue:  String,
  pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteInfo {
  pub technology:   Vec<String>,
  pub last_updated: String,
  pub traffic_rank: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
  pub linkedin: LinkedinProfile,
  pub company:  CompanyInfo,
  pub website:  WebsiteInfo,
}

pub fn enrich(request: &EnrichmentRequest) -> Result<Enrichment> {
  let has_email = non_blank(request.email.clone()).is_some();
  let has_website = non_blank(request.website.clone()).is_some();
  if !has_email && !has_website {
    return Err(Error::NothingToEnrich);
  }

  Ok(Enrichment {
    linkedin: LinkedinProfile {
      profile:    "https://linkedin.com/in/john-doe".into(),
      title:      "VP of Sales".into(),
      company:    "Acme Corporation".into(),
      experience: "8+ years in B2B sales".into(),
    },
    company:  CompanyInfo {
      name:     "Acme Corporation".into(),
      industry: "Technology".into(),
      size:     "500-1000 employees".into(),
      revenue:  "$50M - $100M".into(),
      location: "San Francisco, CA".into(),
    },
    website:  WebsiteInfo {
      technology:   ["React", "Salesforce", "HubSpot"].map(String::from).to_vec(),
      last_updated: "2024-01-15".into(),
      traffic_rank: "Medium".into(),
    },
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn needs_email_or_website() {
    let request = EnrichmentRequest {
      name: "Jane".into(),
      email: Some("  ".into()),
      ..Default::default()
    };
    assert!(matches!(enrich(&request), Err(Error::NothingToEnrich)));
  }

  #[test]
  fn website_alone_is_enough() {
    let request = EnrichmentRequest {
      website: Some("acme.com".into()),
      ..Default::default()
    };
    let enrichment = enrich(&request).unwrap();
    assert_eq!(enrichment.company.name, "Acme Corporation");
    assert_eq!(enrichment.website.technology.len(), 3);
  }
}
