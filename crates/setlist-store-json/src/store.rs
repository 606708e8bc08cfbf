//! [`JsonDirStore`] — the JSON-file implementation of [`DocumentStore`].

use std::{
  io::{self, Write as _},
  path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use setlist_core::document::{Collection, DocumentStore};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{Error, Result};

const EMPTY_DOCUMENT: &[u8] = b"[]";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalog document store backed by one JSON file per collection.
///
/// Cloning is cheap; clones share nothing but the directory path.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
  dir: PathBuf,
}

impl JsonDirStore {
  /// A store rooted at `dir`. Nothing is touched on disk until the first
  /// call.
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// The file holding `collection`, e.g. `<dir>/songs.json`.
  pub fn path_of(&self, collection: Collection) -> PathBuf {
    self.dir.join(format!("{}.json", collection.name()))
  }

  async fn create_dir(&self) -> Result<()> {
    tokio::fs::create_dir_all(&self.dir)
      .await
      .map_err(|e| Error::io(&self.dir, e))
  }

  /// Run [`write_atomically`] off the async runtime.
  async fn write(&self, collection: Collection, contents: Vec<u8>, mode: Replace) -> Result<bool> {
    let dir = self.dir.clone();
    let path = self.path_of(collection);
    tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &contents, mode)).await?
  }
}

// ─── Atomic writes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replace {
  Always,
  IfAbsent,
}

/// Write `contents` to a temporary file in `dir`, sync it, then move it to
/// `path`.
///
/// Returns `false` if `mode` is [`Replace::IfAbsent`] and `path` already
/// existed; the existing file is left untouched.
fn write_atomically(dir: &Path, path: &Path, contents: &[u8], mode: Replace) -> Result<bool> {
  let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
  tmp.write_all(contents).map_err(|e| Error::io(tmp.path(), e))?;
  tmp.flush().map_err(|e| Error::io(tmp.path(), e))?;
  tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;

  let persisted = match mode {
    Replace::Always => tmp.persist(path),
    Replace::IfAbsent => tmp.persist_noclobber(path),
  };
  match persisted {
    Ok(_) => Ok(true),
    Err(e)
      if mode == Replace::IfAbsent && e.error.kind() == io::ErrorKind::AlreadyExists =>
    {
      Ok(false)
    }
    Err(e) => Err(Error::io(path, e.error)),
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for JsonDirStore {
  type Error = Error;

  async fn ensure_initialized(&self, collection: Collection) -> Result<()> {
    let path = self.path_of(collection);
    if tokio::fs::try_exists(&path).await.map_err(|e| Error::io(&path, e))? {
      return Ok(());
    }

    self.create_dir().await?;
    if self.write(collection, EMPTY_DOCUMENT.to_vec(), Replace::IfAbsent).await? {
      info!(path = %path.display(), "created empty collection");
    }
    Ok(())
  }

  async fn load<T>(&self, collection: Collection) -> Result<Vec<T>>
  where
    T: DeserializeOwned + Send + 'static,
  {
    let path = self.path_of(collection);
    let bytes = tokio::fs::read(&path).await.map_err(|e| Error::io(&path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Json { path, source })
  }

  async fn save<'a, T>(&'a self, collection: Collection, records: &'a [T]) -> Result<()>
  where
    T: Serialize + Sync,
  {
    let contents = serde_json::to_vec_pretty(records).map_err(|source| Error::Json {
      path: self.path_of(collection),
      source,
    })?;

    self.create_dir().await?;
    let bytes = contents.len();
    self.write(collection, contents, Replace::Always).await?;
    debug!(%collection, records = records.len(), bytes, "saved collection");
    Ok(())
  }
}
