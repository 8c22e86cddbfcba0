//! Company profile and product catalog.
//!
//! Each user owns exactly one profile row, created blank at sign-up. The
//! company setup flow fills it in and replaces the user's product list
//! wholesale. A profile with a non-empty `company_name` marks setup as
//! complete; everything in the navigation shell keys off that one signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:      Uuid,
  pub company_name: Option<String>,
  pub email:        Option<String>,
  pub full_name:    Option<String>,
  pub industry:     Option<String>,
  pub headquarters: Option<String>,
  pub website:      Option<String>,
  pub linkedin_url: Option<String>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl Profile {
  pub fn has_company_setup(&self) -> bool {
    self
      .company_name
      .as_deref()
      .is_some_and(|name| !name.trim().is_empty())
  }
}

/// Whether onboarding is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupState {
  Complete,
  Incomplete,
}

impl SetupState {
  /// A missing profile counts as incomplete. A failed lookup is not a
  /// missing profile, so callers must resolve the store result first.
  pub fn of(profile: Option<&Profile>) -> Self {
    match profile {
      Some(p) if p.has_company_setup() => Self::Complete,
      _ => Self::Incomplete,
    }
  }

  pub fn is_complete(self) -> bool { self == Self::Complete }
}

/// The company setup form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyDetails {
  #[serde(default)]
  pub company_name: String,
  #[serde(default)]
  pub email:        String,
  pub industry:     Option<String>,
  pub headquarters: Option<String>,
  pub website:      Option<String>,
  pub linkedin_url: Option<String>,
  #[serde(default)]
  pub accept_terms: bool,
}

impl CompanyDetails {
  /// Trim every field, blank optionals become `None`, and require a company
  /// name, an email and accepted terms.
  pub fn validate(self) -> Result<Self> {
    let company_name = self.company_name.trim().to_owned();
    let email = self.email.trim().to_owned();
    if company_name.is_empty() {
      return Err(Error::MissingField("company name"));
    }
    if email.is_empty() {
      return Err(Error::MissingField("email"));
    }
    if !self.accept_terms {
      return Err(Error::TermsNotAccepted);
    }
    Ok(Self {
      company_name,
      email,
      industry: non_blank(self.industry),
      headquarters: non_blank(self.headquarters),
      website: non_blank(self.website),
      linkedin_url: non_blank(self.linkedin_url),
      accept_terms: true,
    })
  }
}

// ─── Products ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub product_id:  Uuid,
  pub user_id:     Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
  pub name:        String,
  #[serde(default)]
  pub description: String,
}

impl NewProduct {
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self { name: name.into(), description: description.into() }
  }
}

/// Drop rows whose name is blank and trim the rest. The setup form allows
/// empty placeholder rows which should never be persisted.
pub fn clean_products(products: Vec<NewProduct>) -> Vec<NewProduct> {
  products
    .into_iter()
    .filter_map(|p| {
      let name = p.name.trim();
      (!name.is_empty()).then(|| NewProduct::new(name, p.description.trim()))
    })
    .collect()
}

/// Trim an optional text field, mapping blank to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile(company_name: Option<&str>) -> Profile {
    let now = Utc::now();
    Profile {
      user_id:      Uuid::new_v4(),
      company_name: company_name.map(str::to_owned),
      email:        None,
      full_name:    Some("Jane".into()),
      industry:     None,
      headquarters: None,
      website:      None,
      linkedin_url: None,
      created_at:   now,
      updated_at:   now,
    }
  }

  #[test]
  fn setup_state_follows_company_name() {
    assert_eq!(SetupState::of(None), SetupState::Incomplete);
    assert_eq!(SetupState::of(Some(&profile(None))), SetupState::Incomplete);
    assert_eq!(
      SetupState::of(Some(&profile(Some("   ")))),
      SetupState::Incomplete
    );
    assert_eq!(
      SetupState::of(Some(&profile(Some("Acme")))),
      SetupState::Complete
    );
  }

  #[test]
  fn company_details_require_terms() {
    let details = CompanyDetails {
      company_name: "Acme".into(),
      email: "sales@acme.com".into(),
      ..Default::default()
    };
    assert!(matches!(details.validate(), Err(Error::TermsNotAccepted)));
  }

  #[test]
  fn company_details_trim_and_blank_optionals() {
    let details = CompanyDetails {
      company_name: "  Acme ".into(),
      email: "sales@acme.com".into(),
      website: Some("  ".into()),
      industry: Some(" SaaS ".into()),
      accept_terms: true,
      ..Default::default()
    }
    .validate()
    .unwrap();
    assert_eq!(details.company_name, "Acme");
    assert_eq!(details.website, None);
    assert_eq!(details.industry.as_deref(), Some("SaaS"));
  }

  #[test]
  fn company_name_required() {
    let details = CompanyDetails {
      email: "sales@acme.com".into(),
      accept_terms: true,
      ..Default::default()
    };
    assert!(matches!(
      details.validate(),
      Err(Error::MissingField("company name"))
    ));
  }

  #[test]
  fn blank_product_rows_dropped() {
    let cleaned = clean_products(vec![
      NewProduct::new(" Widget ", " small "),
      NewProduct::new("   ", "orphan description"),
    ]);
    assert_eq!(cleaned, vec![NewProduct::new("Widget", "small")]);
  }
}
