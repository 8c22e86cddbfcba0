//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use salesbuddy_core::{
  account::{NewUser, Session, User},
  chat::Sender,
  lead::{ActivityType, LeadType, NewActivity, NewLead},
  profile::{CompanyDetails, NewProduct, SetupState},
  scoring::{Bant, Stage},
  store::CrmStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, email: &str) -> User {
  s.create_user(NewUser {
    email:         email.into(),
    full_name:     "Jane Doe".into(),
    password_hash: "$argon2id$fake".into(),
  })
  .await
  .unwrap()
  .expect("email not yet registered")
}

fn acme() -> CompanyDetails {
  CompanyDetails {
    company_name: "Acme".into(),
    email: "sales@acme.com".into(),
    industry: Some("Technology".into()),
    accept_terms: true,
    ..Default::default()
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_user_normalizes_email_and_creates_profile() {
  let s = store().await;
  let u = user(&s, "  Jane@Example.COM ").await;
  assert_eq!(u.email, "jane@example.com");

  let creds = s.find_credentials("JANE@example.com").await.unwrap().unwrap();
  assert_eq!(creds.user, u);
  assert_eq!(creds.password_hash, "$argon2id$fake");

  let profile = s.get_profile(u.user_id).await.unwrap().unwrap();
  assert_eq!(profile.full_name.as_deref(), Some("Jane Doe"));
  assert_eq!(profile.email.as_deref(), Some("jane@example.com"));
  assert_eq!(SetupState::of(Some(&profile)), SetupState::Incomplete);
}

#[tokio::test]
async fn duplicate_email_rejected() {
  let s = store().await;
  user(&s, "jane@example.com").await;
  let again = s
    .create_user(NewUser {
      email:         "JANE@example.com".into(),
      full_name:     "Other".into(),
      password_hash: "x".into(),
    })
    .await;
  assert!(again.unwrap().is_none());

  // The original account is untouched.
  let creds = s.find_credentials("jane@example.com").await.unwrap().unwrap();
  assert_eq!(creds.user.full_name, "Jane Doe");
  assert_eq!(creds.password_hash, "$argon2id$fake");
}

#[tokio::test]
async fn unknown_email_has_no_credentials() {
  let s = store().await;
  assert!(s.find_credentials("nobody@example.com").await.unwrap().is_none());
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn session_lifecycle() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;
  let now = Utc::now();
  let session = Session {
    token_hash: "deadbeef".into(),
    user_id:    u.user_id,
    created_at: now,
    expires_at: now + Duration::hours(1),
  };
  s.create_session(session.clone()).await.unwrap();

  let fetched = s.get_session("deadbeef").await.unwrap().unwrap();
  assert_eq!(fetched, session);

  assert!(s.delete_session("deadbeef").await.unwrap());
  assert!(!s.delete_session("deadbeef").await.unwrap());
  assert!(s.get_session("deadbeef").await.unwrap().is_none());
}

// ─── Company ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_company_completes_setup_and_keeps_name() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;

  let profile = s.upsert_company(u.user_id, acme()).await.unwrap();
  assert!(profile.has_company_setup());
  assert_eq!(profile.company_name.as_deref(), Some("Acme"));
  assert_eq!(profile.full_name.as_deref(), Some("Jane Doe"));

  let updated = s
    .upsert_company(u.user_id, CompanyDetails {
      company_name: "Acme Inc".into(),
      ..acme()
    })
    .await
    .unwrap();
  assert_eq!(updated.company_name.as_deref(), Some("Acme Inc"));
  assert_eq!(updated.created_at, profile.created_at);
  assert!(updated.updated_at >= profile.updated_at);
}

#[tokio::test]
async fn replace_products_swaps_whole_list() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;
  let other = user(&s, "other@example.com").await;

  s.replace_products(other.user_id, vec![NewProduct::new("Theirs", "")])
    .await
    .unwrap();
  s.replace_products(u.user_id, vec![
    NewProduct::new("Widget", "A nice widget"),
    NewProduct::new("Gadget", ""),
  ])
  .await
  .unwrap();

  let replaced = s
    .replace_products(u.user_id, vec![NewProduct::new("Gizmo", "new")])
    .await
    .unwrap();
  assert_eq!(replaced.len(), 1);

  let listed = s.list_products(u.user_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].name, "Gizmo");
  assert_eq!(listed[0].description.as_deref(), Some("new"));

  let theirs = s.list_products(other.user_id).await.unwrap();
  assert_eq!(theirs.len(), 1);
  assert_eq!(theirs[0].description, None);
}

#[tokio::test]
async fn replace_products_with_empty_list_clears() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;
  s.replace_products(u.user_id, vec![NewProduct::new("Widget", "")])
    .await
    .unwrap();
  s.replace_products(u.user_id, Vec::new()).await.unwrap();
  assert!(s.list_products(u.user_id).await.unwrap().is_empty());
}

// ─── Leads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_lead_with_only_name() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;

  let input = NewLead::named("Acme Corp").validate().unwrap();
  let lead = s.create_lead(u.user_id, input).await.unwrap();
  assert_eq!(lead.lead_type, LeadType::B2b);
  assert_eq!(lead.status, "new");

  let fetched = s.get_lead(u.user_id, lead.lead_id).await.unwrap().unwrap();
  assert_eq!(fetched, lead);
}

#[tokio::test]
async fn leads_listed_newest_first_with_scores() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;

  let first = s
    .create_lead(u.user_id, NewLead::named("First").validate().unwrap())
    .await
    .unwrap();
  let second = s
    .create_lead(u.user_id, NewLead::named("Second").validate().unwrap())
    .await
    .unwrap();
  s.upsert_score(first.lead_id, Bant {
    budget:    80,
    authority: 60,
    need:      70,
    timeline:  50,
  })
  .await
  .unwrap();

  let leads = s.list_leads(u.user_id).await.unwrap();
  assert_eq!(leads.len(), 2);
  assert_eq!(leads[0].lead.lead_id, second.lead_id);
  assert_eq!(leads[0].total_score, None);
  assert_eq!(leads[1].lead.lead_id, first.lead_id);
  assert_eq!(leads[1].total_score, Some(65.0));
}

#[tokio::test]
async fn leads_are_scoped_to_owner() {
  let s = store().await;
  let owner = user(&s, "jane@example.com").await;
  let other = user(&s, "other@example.com").await;

  let lead = s
    .create_lead(owner.user_id, NewLead::named("Mine").validate().unwrap())
    .await
    .unwrap();

  assert!(s.list_leads(other.user_id).await.unwrap().is_empty());
  assert!(s.get_lead(other.user_id, lead.lead_id).await.unwrap().is_none());
  assert!(!s.delete_lead(other.user_id, lead.lead_id).await.unwrap());
  assert!(s.get_lead(owner.user_id, lead.lead_id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_lead_cascades_and_spares_others() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;

  let doomed = s
    .create_lead(u.user_id, NewLead::named("Doomed").validate().unwrap())
    .await
    .unwrap();
  let kept = s
    .create_lead(u.user_id, NewLead::named("Kept").validate().unwrap())
    .await
    .unwrap();

  for lead_id in [doomed.lead_id, kept.lead_id] {
    s.upsert_score(lead_id, Bant::uniform(50)).await.unwrap();
    s.add_message(lead_id, Sender::User, "hello".into()).await.unwrap();
    s.record_activity(NewActivity::new(
      lead_id,
      ActivityType::LeadCreated,
      "created",
    ))
    .await
    .unwrap();
  }

  assert!(s.delete_lead(u.user_id, doomed.lead_id).await.unwrap());

  assert!(s.get_lead(u.user_id, doomed.lead_id).await.unwrap().is_none());
  assert!(s.get_score(doomed.lead_id).await.unwrap().is_none());
  assert!(s.list_messages(doomed.lead_id).await.unwrap().is_empty());
  assert!(s.list_activities(doomed.lead_id).await.unwrap().is_empty());

  let remaining = s.list_leads(u.user_id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].lead.lead_id, kept.lead_id);
  assert!(s.get_score(kept.lead_id).await.unwrap().is_some());
  assert_eq!(s.list_messages(kept.lead_id).await.unwrap().len(), 1);
  assert_eq!(s.list_activities(kept.lead_id).await.unwrap().len(), 1);
}

// ─── Scores ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_score_recomputes_total() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;
  let lead = s
    .create_lead(u.user_id, NewLead::named("Scored").validate().unwrap())
    .await
    .unwrap();

  assert!(s.get_score(lead.lead_id).await.unwrap().is_none());

  let bant = Bant { budget: 75, authority: 60, need: 85, timeline: 40 };
  let written = s.upsert_score(lead.lead_id, bant).await.unwrap();
  assert_eq!(written.total_score, 65.0);

  let overwritten = s
    .upsert_score(lead.lead_id, Bant::uniform(Stage::Closed.synthetic_score()))
    .await
    .unwrap();
  let read = s.get_score(lead.lead_id).await.unwrap().unwrap();
  assert_eq!(read.bant, Bant::uniform(85));
  assert_eq!(read.total_score, read.bant.total());
  assert_eq!(read.total_score, overwritten.total_score);
  assert_eq!(Stage::from_total(read.total_score), Stage::Closed);
}

#[tokio::test]
async fn out_of_range_score_never_written() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;
  let lead = s
    .create_lead(u.user_id, NewLead::named("Scored").validate().unwrap())
    .await
    .unwrap();

  let result = s
    .upsert_score(lead.lead_id, Bant { budget: 120, ..Bant::uniform(10) })
    .await;
  assert!(matches!(result, Err(Error::Core(_))));
  assert!(s.get_score(lead.lead_id).await.unwrap().is_none());
}

// ─── Chat and activity ───────────────────────────────────────────────────────

#[tokio::test]
async fn messages_in_order() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;
  let lead = s
    .create_lead(u.user_id, NewLead::named("Chatty").validate().unwrap())
    .await
    .unwrap();

  s.add_message(lead.lead_id, Sender::User, "first".into())
    .await
    .unwrap();
  s.add_message(lead.lead_id, Sender::Bot, "second".into())
    .await
    .unwrap();

  let thread = s.list_messages(lead.lead_id).await.unwrap();
  let texts: Vec<_> = thread.iter().map(|m| m.message.as_str()).collect();
  assert_eq!(texts, ["first", "second"]);
  assert_eq!(thread[1].sender, Sender::Bot);
}

#[tokio::test]
async fn activity_keeps_json_payload() {
  let s = store().await;
  let u = user(&s, "jane@example.com").await;
  let lead = s
    .create_lead(u.user_id, NewLead::named("Tracked").validate().unwrap())
    .await
    .unwrap();

  s.record_activity(
    NewActivity::new(lead.lead_id, ActivityType::StageChanged, "Moved to Closed")
      .with_data(serde_json::json!({ "stage": "closed", "score": 85 })),
  )
  .await
  .unwrap();

  let log = s.list_activities(lead.lead_id).await.unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].activity_type, ActivityType::StageChanged);
  assert_eq!(log[0].data["score"], 85);
}

#[tokio::test]
async fn message_for_missing_lead_violates_foreign_key() {
  let s = store().await;
  let result = s
    .add_message(Uuid::new_v4(), Sender::User, "orphan".into())
    .await;
  assert!(matches!(result, Err(Error::Database(_))));
}
