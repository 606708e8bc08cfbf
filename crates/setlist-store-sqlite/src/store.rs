//! [`SqliteDocumentStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde::{Serialize, de::DeserializeOwned};
use setlist_core::document::{Collection, DocumentStore};
use tracing::{debug, info};

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalog document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteDocumentStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteDocumentStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
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

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteDocumentStore {
  type Error = Error;

  async fn ensure_initialized(&self, collection: Collection) -> Result<()> {
    let name = collection.name();
    let at_str = Utc::now().to_rfc3339();

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO collections (name, body, updated_at)
           VALUES (?1, '[]', ?2)",
          rusqlite::params![name, at_str],
        )?)
      })
      .await?;

    if inserted > 0 {
      info!(%collection, "created empty collection");
    }
    Ok(())
  }

  async fn load<T>(&self, collection: Collection) -> Result<Vec<T>>
  where
    T: DeserializeOwned + Send + 'static,
  {
    let name = collection.name();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body FROM collections WHERE name = ?1",
              rusqlite::params![name],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    let body = body.ok_or(Error::MissingCollection(name))?;
    Ok(serde_json::from_str(&body)?)
  }

  async fn save<'a, T>(&'a self, collection: Collection, records: &'a [T]) -> Result<()>
  where
    T: Serialize + Sync,
  {
    let name = collection.name();
    let body = serde_json::to_string(records)?;
    let bytes = body.len();
    let at_str = Utc::now().to_rfc3339();

    // A single upsert: readers see either the old body or the new one.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO collections (name, body, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (name) DO UPDATE
             SET body = excluded.body, updated_at = excluded.updated_at",
          rusqlite::params![name, body, at_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(%collection, records = records.len(), bytes, "saved collection");
    Ok(())
  }
}
