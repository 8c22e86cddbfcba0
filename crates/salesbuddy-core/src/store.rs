//! The `CrmStore` trait.
//!
//! Implemented by storage backends (e.g. `salesbuddy-store-sqlite`). The API
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Credentials, NewUser, Session, User},
  chat::{ChatMessage, Sender},
  lead::{Activity, Lead, LeadSummary, NewActivity, NewLead},
  profile::{CompanyDetails, NewProduct, Product, Profile},
  scoring::{Bant, LeadScore},
};

/// Abstraction over a SalesBuddy storage backend.
///
/// Every row a user creates is scoped by `user_id`; lead-level methods take a
/// lead id that callers have already checked ownership of via
/// [`CrmStore::get_lead`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CrmStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Create a user and their blank profile row in one transaction. Returns
  /// `None`, and writes nothing, when the email is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and password hash by (normalised) email.
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  /// Returns `true` if a session was removed.
  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Company ───────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Insert or update the company fields of a user's profile. `full_name`
  /// and `created_at` are left untouched on update.
  fn upsert_company(
    &self,
    user_id: Uuid,
    details: CompanyDetails,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  fn list_products(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  /// Delete every product the user owns and insert `products` in their
  /// place, atomically.
  fn replace_products(
    &self,
    user_id: Uuid,
    products: Vec<NewProduct>,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  // ── Leads ─────────────────────────────────────────────────────────────

  /// All of a user's leads, newest first, each with its score total.
  fn list_leads(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<LeadSummary>, Self::Error>> + Send + '_;

  /// Persist a lead. The input is expected to have passed
  /// [`NewLead::validate`].
  fn create_lead(
    &self,
    user_id: Uuid,
    input: NewLead,
  ) -> impl Future<Output = Result<Lead, Self::Error>> + Send + '_;

  /// Fetch a lead owned by `user_id`. Another user's lead reads as `None`.
  fn get_lead(
    &self,
    user_id: Uuid,
    lead_id: Uuid,
  ) -> impl Future<Output = Result<Option<Lead>, Self::Error>> + Send + '_;

  /// Delete a lead together with its score, messages and activity. Returns
  /// `true` if the lead existed.
  fn delete_lead(
    &self,
    user_id: Uuid,
    lead_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Scores ────────────────────────────────────────────────────────────

  fn get_score(
    &self,
    lead_id: Uuid,
  ) -> impl Future<Output = Result<Option<LeadScore>, Self::Error>> + Send + '_;

  /// Insert or replace the lead's score. The stored total is always
  /// recomputed from `bant`.
  fn upsert_score(
    &self,
    lead_id: Uuid,
    bant: Bant,
  ) -> impl Future<Output = Result<LeadScore, Self::Error>> + Send + '_;

  // ── Chat ──────────────────────────────────────────────────────────────

  /// Messages in a lead's thread, oldest first.
  fn list_messages(
    &self,
    lead_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChatMessage>, Self::Error>> + Send + '_;

  fn add_message(
    &self,
    lead_id: Uuid,
    sender: Sender,
    message: String,
  ) -> impl Future<Output = Result<ChatMessage, Self::Error>> + Send + '_;

  // ── Activity ──────────────────────────────────────────────────────────

  fn record_activity(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  /// A lead's activity log, oldest first.
  fn list_activities(
    &self,
    lead_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;
}
