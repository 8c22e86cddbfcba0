//! SQL schema for the SalesBuddy SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,   -- lowercased
    full_name     TEXT NOT NULL,
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- Only the SHA-256 digest of a bearer token is ever stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- One row per user; company_name non-empty means setup is complete.
CREATE TABLE IF NOT EXISTS profiles (
    user_id      TEXT PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
    company_name TEXT,
    email        TEXT,
    full_name    TEXT,
    industry     TEXT,
    headquarters TEXT,
    website      TEXT,
    linkedin_url TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    product_id  TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    description TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS leads (
    lead_id    TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    name       TEXT NOT NULL CHECK (length(trim(name)) > 0),
    email      TEXT,
    company    TEXT,
    phone      TEXT,
    website    TEXT,
    lead_type  TEXT NOT NULL DEFAULT 'b2b',   -- 'b2b' | 'b2c'
    status     TEXT NOT NULL DEFAULT 'new',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- total_score is rewritten from the four factors on every upsert.
CREATE TABLE IF NOT EXISTS lead_scores (
    lead_id     TEXT PRIMARY KEY REFERENCES leads(lead_id) ON DELETE CASCADE,
    budget      INTEGER NOT NULL CHECK (budget    BETWEEN 0 AND 100),
    authority   INTEGER NOT NULL CHECK (authority BETWEEN 0 AND 100),
    need        INTEGER NOT NULL CHECK (need      BETWEEN 0 AND 100),
    timeline    INTEGER NOT NULL CHECK (timeline  BETWEEN 0 AND 100),
    total_score REAL    NOT NULL,
    updated_at  TEXT    NOT NULL
);

-- Append-only.
CREATE TABLE IF NOT EXISTS chat_messages (
    message_id TEXT PRIMARY KEY,
    lead_id    TEXT NOT NULL REFERENCES leads(lead_id) ON DELETE CASCADE,
    sender     TEXT NOT NULL,   -- 'user' | 'bot' | 'assistant'
    message    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Append-only.
CREATE TABLE IF NOT EXISTS lead_activities (
    activity_id   TEXT PRIMARY KEY,
    lead_id       TEXT NOT NULL REFERENCES leads(lead_id) ON DELETE CASCADE,
    activity_type TEXT NOT NULL,
    description   TEXT NOT NULL,
    data          TEXT NOT NULL DEFAULT 'null',   -- JSON
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS products_user_idx     ON products(user_id);
CREATE INDEX IF NOT EXISTS leads_user_idx        ON leads(user_id, created_at);
CREATE INDEX IF NOT EXISTS messages_lead_idx     ON chat_messages(lead_id, created_at);
CREATE INDEX IF NOT EXISTS activities_lead_idx   ON lead_activities(lead_id, created_at);
CREATE INDEX IF NOT EXISTS sessions_user_idx     ON sessions(user_id);

PRAGMA user_version = 1;
";
