//! Error type for `setlist-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// `load` was called before `ensure_initialized` created the row.
  #[error("collection {0:?} does not exist")]
  MissingCollection(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
