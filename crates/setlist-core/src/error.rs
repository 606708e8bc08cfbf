//! Error types for `setlist-core`.

use thiserror::Error;

use crate::model::SongId;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was missing or blank.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("song {title:?} by {artist:?} is already registered")]
  Conflict { title: String, artist: String },

  #[error("song not found: {0}")]
  SongNotFound(SongId),

  /// Another write is in flight. Transient; the caller decides whether to
  /// retry.
  #[error("catalog is busy with another write, try again")]
  Busy,

  #[error("the catalog has nothing to pick from")]
  EmptyCatalog,

  #[error("no songs found for artist {0:?}, try again")]
  NoSongsForArtist(String),

  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StorageUnavailable(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
