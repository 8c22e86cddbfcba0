//! Page routing and the sidebar.
//!
//! The front end asks the server which page a path maps to and whether the
//! current visitor may see it, so the redirect rules live in one place.

use serde::{Deserialize, Serialize};

use crate::profile::SetupState;

// ─── Sidebar ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
  pub name:   String,
  pub href:   String,
  pub locked: bool,
}

/// `(name, href, requires company setup)`
const NAV_ITEMS: &[(&str, &str, bool)] = &[
  ("Dashboard", "/", false),
  ("AI Assistant", "/chatbot", false),
  ("Leads", "/leads", true),
  ("Company Setup", "/company-setup", false),
  ("Lead Qualification", "/lead-qualification", true),
  ("Lead Scoring", "/lead-scoring", true),
  ("Demo Delivery", "/demo-delivery", true),
  ("Quotation", "/quotation", true),
  ("Analytics", "/analytics", true),
];

/// Sidebar entries, with setup-gated pages locked until onboarding is done.
pub fn sidebar(setup: SetupState) -> Vec<NavItem> {
  NAV_ITEMS
    .iter()
    .map(|&(name, href, gated)| NavItem {
      name:   name.into(),
      href:   href.into(),
      locked: gated && !setup.is_complete(),
    })
    .collect()
}

// ─── Routes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Route {
  Auth,
  ForgotPassword,
  Home,
  Dashboard,
  CompanySetup,
  Leads,
  LeadChat { lead_id: String },
  LeadQualification,
  LeadScoring,
  DemoDelivery,
  Quotation,
  Analytics,
  Chatbot,
  Settings,
  Terms,
  NotFound,
}

impl Route {
  pub fn resolve(path: &str) -> Self {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    match trimmed {
      "" => Self::Home,
      "/auth" => Self::Auth,
      "/forgot-password" => Self::ForgotPassword,
      "/dashboard" => Self::Dashboard,
      "/company-setup" => Self::CompanySetup,
      "/leads" => Self::Leads,
      "/lead-qualification" => Self::LeadQualification,
      "/lead-scoring" => Self::LeadScoring,
      "/demo-delivery" => Self::DemoDelivery,
      "/quotation" => Self::Quotation,
      "/analytics" => Self::Analytics,
      "/chatbot" => Self::Chatbot,
      "/settings" => Self::Settings,
      "/terms" => Self::Terms,
      other => match other.strip_prefix("/lead/") {
        Some(id) if !id.is_empty() && !id.contains('/') => {
          Self::LeadChat { lead_id: id.to_owned() }
        }
        _ => Self::NotFound,
      },
    }
  }

  /// Pages reachable without signing in.
  pub fn is_public(&self) -> bool {
    matches!(
      self,
      Self::Auth | Self::ForgotPassword | Self::Terms | Self::NotFound
    )
  }

  /// Pages a signed-in user is bounced away from.
  pub fn is_guest_only(&self) -> bool { matches!(self, Self::Auth) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Access {
  Allow,
  Redirect { to: String },
}

/// Decide whether a visitor may see `route`.
pub fn access(route: &Route, authenticated: bool) -> Access {
  if authenticated && route.is_guest_only() {
    return Access::Redirect { to: "/".into() };
  }
  if !authenticated && !route.is_public() {
    return Access::Redirect { to: "/auth".into() };
  }
  Access::Allow
}

/// What the home path shows: the setup form until onboarding is complete,
/// then the dashboard.
pub fn home_page(setup: SetupState) -> Route {
  match setup {
    SetupState::Complete => Route::Dashboard,
    SetupState::Incomplete => Route::CompanySetup,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn locked_until_setup() {
    let locked: Vec<_> = sidebar(SetupState::Incomplete)
      .into_iter()
      .filter(|i| i.locked)
      .map(|i| i.name)
      .collect();
    assert_eq!(
      locked,
      [
        "Leads",
        "Lead Qualification",
        "Lead Scoring",
        "Demo Delivery",
        "Quotation",
        "Analytics"
      ]
    );
    assert!(sidebar(SetupState::Complete).iter().all(|i| !i.locked));
  }

  #[test]
  fn resolves_known_paths() {
    assert_eq!(Route::resolve("/"), Route::Home);
    assert_eq!(Route::resolve("/leads/"), Route::Leads);
    assert_eq!(Route::resolve("/quotation?tab=2"), Route::Quotation);
    assert_eq!(
      Route::resolve("/lead/abc-123"),
      Route::LeadChat { lead_id: "abc-123".into() }
    );
    assert_eq!(Route::resolve("/lead/"), Route::NotFound);
    assert_eq!(Route::resolve("/lead/a/b"), Route::NotFound);
    assert_eq!(Route::resolve("/nope"), Route::NotFound);
  }

  #[test]
  fn guests_sent_to_sign_in() {
    assert_eq!(
      access(&Route::Leads, false),
      Access::Redirect { to: "/auth".into() }
    );
    assert_eq!(access(&Route::Auth, false), Access::Allow);
    assert_eq!(access(&Route::Terms, false), Access::Allow);
    assert_eq!(access(&Route::NotFound, false), Access::Allow);
  }

  #[test]
  fn signed_in_users_leave_auth_page() {
    assert_eq!(
      access(&Route::Auth, true),
      Access::Redirect { to: "/".into() }
    );
    assert_eq!(access(&Route::ForgotPassword, true), Access::Allow);
    assert_eq!(access(&Route::Settings, true), Access::Allow);
  }

  #[test]
  fn home_depends_on_setup() {
    assert_eq!(home_page(SetupState::Incomplete), Route::CompanySetup);
    assert_eq!(home_page(SetupState::Complete), Route::Dashboard);
  }
}
