//! [`SqliteStore`]: the SQLite implementation of [`CrmStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use salesbuddy_core::{
  account::{Credentials, NewUser, Session, User, normalize_email},
  chat::{ChatMessage, Sender},
  lead::{Activity, DEFAULT_STATUS, Lead, LeadSummary, NewActivity, NewLead},
  profile::{CompanyDetails, NewProduct, Product, Profile},
  scoring::{Bant, LeadScore},
  store::CrmStore,
};

use crate::{
  Error, Result,
  encode::{
    RawActivity, RawLead, RawMessage, RawProduct, RawProfile, RawScore,
    RawSession, RawUser, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SalesBuddy store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All access is
/// serialised through the connection's worker thread, so overlapping writes
/// to one row resolve as last-writer-wins.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CrmStore impl ───────────────────────────────────────────────────────────

impl CrmStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = User {
      user_id:    Uuid::new_v4(),
      email:      normalize_email(&input.email),
      full_name:  input.full_name.trim().to_owned(),
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let at_str   = encode_dt(user.created_at);
    let email    = user.email.clone();
    let name     = user.full_name.clone();
    let hash     = input.password_hash;

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT INTO users (user_id, email, full_name, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![id_str, email, name, hash, at_str],
        )?;
        // Email taken; dropping `tx` rolls back.
        if inserted == 0 {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO profiles (user_id, email, full_name, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![id_str, email, name, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(created.then_some(user))
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
    let email = normalize_email(email);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM users WHERE email = ?1", RawUser::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![email], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_credentials).transpose()
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawUser::into_credentials).transpose()?.map(|c| c.user))
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, session: Session) -> Result<()> {
    let user_str    = encode_uuid(session.user_id);
    let created_str = encode_dt(session.created_at);
    let expires_str = encode_dt(session.expires_at);
    let token_hash  = session.token_hash;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_hash, user_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_session(&self, token_hash: &str) -> Result<Option<Session>> {
    let token_hash = token_hash.to_owned();

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT token_hash, user_id, created_at, expires_at
               FROM sessions WHERE token_hash = ?1",
              rusqlite::params![token_hash],
              RawSession::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn delete_session(&self, token_hash: &str) -> Result<bool> {
    let token_hash = token_hash.to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Company ───────────────────────────────────────────────────────────────

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM profiles WHERE user_id = ?1",
          RawProfile::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawProfile::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn upsert_company(
    &self,
    user_id: Uuid,
    details: CompanyDetails,
  ) -> Result<Profile> {
    let id_str = encode_uuid(user_id);
    let now    = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             user_id, company_name, email, industry, headquarters,
             website, linkedin_url, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
           ON CONFLICT(user_id) DO UPDATE SET
             company_name = excluded.company_name,
             email        = excluded.email,
             industry     = excluded.industry,
             headquarters = excluded.headquarters,
             website      = excluded.website,
             linkedin_url = excluded.linkedin_url,
             updated_at   = excluded.updated_at",
          rusqlite::params![
            id_str,
            details.company_name,
            details.email,
            details.industry,
            details.headquarters,
            details.website,
            details.linkedin_url,
            now,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.get_profile(user_id).await?.ok_or(Error::Missing(user_id))
  }

  async fn list_products(&self, user_id: Uuid) -> Result<Vec<Product>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawProduct> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT product_id, user_id, name, description, created_at
           FROM products WHERE user_id = ?1
           ORDER BY created_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawProduct::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProduct::into_product).collect()
  }

  async fn replace_products(
    &self,
    user_id: Uuid,
    products: Vec<NewProduct>,
  ) -> Result<Vec<Product>> {
    let created_at = Utc::now();
    let products: Vec<Product> = products
      .into_iter()
      .map(|p| Product {
        product_id: Uuid::new_v4(),
        user_id,
        name: p.name,
        description: Some(p.description).filter(|d| !d.is_empty()),
        created_at,
      })
      .collect();

    let user_str = encode_uuid(user_id);
    let at_str   = encode_dt(created_at);
    let rows: Vec<(String, String, Option<String>)> = products
      .iter()
      .map(|p| (encode_uuid(p.product_id), p.name.clone(), p.description.clone()))
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM products WHERE user_id = ?1",
          rusqlite::params![user_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO products (product_id, user_id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (product_id, name, description) in &rows {
            stmt.execute(rusqlite::params![
              product_id,
              user_str,
              name,
              description,
              at_str
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(products)
  }

  // ── Leads ─────────────────────────────────────────────────────────────────

  async fn list_leads(&self, user_id: Uuid) -> Result<Vec<LeadSummary>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawLead> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {}, s.total_score AS total_score
           FROM leads l
           LEFT JOIN lead_scores s ON s.lead_id = l.lead_id
           WHERE l.user_id = ?1
           ORDER BY l.created_at DESC, l.rowid DESC",
          RawLead::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawLead::from_scored_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLead::into_summary).collect()
  }

  async fn create_lead(&self, user_id: Uuid, input: NewLead) -> Result<Lead> {
    let now = Utc::now();
    let lead = Lead {
      lead_id:    Uuid::new_v4(),
      user_id,
      name:       input.name,
      email:      input.email,
      company:    input.company,
      phone:      input.phone,
      website:    input.website,
      lead_type:  input.lead_type,
      status:     input.status.unwrap_or_else(|| DEFAULT_STATUS.to_owned()),
      created_at: now,
      updated_at: now,
    };

    let lead_str  = encode_uuid(lead.lead_id);
    let user_str  = encode_uuid(user_id);
    let at_str    = encode_dt(now);
    let type_str  = lead.lead_type.as_ref().to_owned();
    let row       = lead.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO leads (
             lead_id, user_id, name, email, company, phone, website,
             lead_type, status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
          rusqlite::params![
            lead_str,
            user_str,
            row.name,
            row.email,
            row.company,
            row.phone,
            row.website,
            type_str,
            row.status,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(lead)
  }

  async fn get_lead(&self, user_id: Uuid, lead_id: Uuid) -> Result<Option<Lead>> {
    let lead_str = encode_uuid(lead_id);
    let user_str = encode_uuid(user_id);

    let raw: Option<RawLead> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM leads l WHERE l.lead_id = ?1 AND l.user_id = ?2",
          RawLead::COLUMNS
        );
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![lead_str, user_str],
              RawLead::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLead::into_lead).transpose()
  }

  async fn delete_lead(&self, user_id: Uuid, lead_id: Uuid) -> Result<bool> {
    let lead_str = encode_uuid(lead_id);
    let user_str = encode_uuid(user_id);

    // Score, messages and activity go with it via ON DELETE CASCADE.
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM leads WHERE lead_id = ?1 AND user_id = ?2",
          rusqlite::params![lead_str, user_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Scores ────────────────────────────────────────────────────────────────

  async fn get_score(&self, lead_id: Uuid) -> Result<Option<LeadScore>> {
    let lead_str = encode_uuid(lead_id);

    let raw: Option<RawScore> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT lead_id, budget, authority, need, timeline, total_score, updated_at
               FROM lead_scores WHERE lead_id = ?1",
              rusqlite::params![lead_str],
              RawScore::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawScore::into_score).transpose()
  }

  async fn upsert_score(&self, lead_id: Uuid, bant: Bant) -> Result<LeadScore> {
    bant.validate()?;
    let score = LeadScore {
      lead_id,
      bant,
      total_score: bant.total(),
      updated_at: Utc::now(),
    };

    let lead_str = encode_uuid(lead_id);
    let at_str   = encode_dt(score.updated_at);
    let total    = score.total_score;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lead_scores (
             lead_id, budget, authority, need, timeline, total_score, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT(lead_id) DO UPDATE SET
             budget      = excluded.budget,
             authority   = excluded.authority,
             need        = excluded.need,
             timeline    = excluded.timeline,
             total_score = excluded.total_score,
             updated_at  = excluded.updated_at",
          rusqlite::params![
            lead_str,
            bant.budget,
            bant.authority,
            bant.need,
            bant.timeline,
            total,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(score)
  }

  // ── Chat ──────────────────────────────────────────────────────────────────

  async fn list_messages(&self, lead_id: Uuid) -> Result<Vec<ChatMessage>> {
    let lead_str = encode_uuid(lead_id);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT message_id, lead_id, sender, message, created_at
           FROM chat_messages WHERE lead_id = ?1
           ORDER BY created_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![lead_str], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn add_message(
    &self,
    lead_id: Uuid,
    sender: Sender,
    message: String,
  ) -> Result<ChatMessage> {
    let msg = ChatMessage {
      message_id: Uuid::new_v4(),
      lead_id,
      sender,
      message,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(msg.message_id);
    let lead_str   = encode_uuid(lead_id);
    let sender_str = sender.as_ref().to_owned();
    let text       = msg.message.clone();
    let at_str     = encode_dt(msg.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chat_messages (message_id, lead_id, sender, message, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, lead_str, sender_str, text, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(msg)
  }

  // ── Activity ──────────────────────────────────────────────────────────────

  async fn record_activity(&self, input: NewActivity) -> Result<Activity> {
    let activity = Activity {
      activity_id:   Uuid::new_v4(),
      lead_id:       input.lead_id,
      activity_type: input.activity_type,
      description:   input.description,
      data:          input.data,
      created_at:    Utc::now(),
    };

    let id_str      = encode_uuid(activity.activity_id);
    let lead_str    = encode_uuid(activity.lead_id);
    let type_str    = activity.activity_type.as_ref().to_owned();
    let description = activity.description.clone();
    let data_str    = serde_json::to_string(&activity.data)?;
    let at_str      = encode_dt(activity.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lead_activities (
             activity_id, lead_id, activity_type, description, data, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, lead_str, type_str, description, data_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(activity)
  }

  async fn list_activities(&self, lead_id: Uuid) -> Result<Vec<Activity>> {
    let lead_str = encode_uuid(lead_id);

    let raws: Vec<RawActivity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT activity_id, lead_id, activity_type, description, data, created_at
           FROM lead_activities WHERE lead_id = ?1
           ORDER BY created_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![lead_str], RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_activity).collect()
  }
}
