//! SQL schema for the Setlist SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per catalog collection ('songs' | 'artists').
-- `body` is the whole collection as a JSON array and is always replaced in a
-- single statement.
CREATE TABLE IF NOT EXISTS collections (
    name        TEXT PRIMARY KEY,
    body        TEXT NOT NULL DEFAULT '[]',
    updated_at  TEXT NOT NULL        -- RFC 3339 UTC
);

PRAGMA user_version = 1;
";
