//! The `DocumentStore` trait and the in-memory backend.
//!
//! The catalog is persisted as one flat document per [`Collection`]. Backends
//! (`setlist-store-json`, `setlist-store-sqlite`) implement this trait; the
//! [`Catalog`](crate::Catalog) depends on the abstraction only.

use std::{collections::HashMap, fmt, future::Future};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::RwLock;

// ─── Collections ─────────────────────────────────────────────────────────────

/// A named collection of catalog records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
  Songs,
  Artists,
}

impl Collection {
  pub const ALL: [Collection; 2] = [Collection::Songs, Collection::Artists];

  pub fn name(self) -> &'static str {
    match self {
      Collection::Songs => "songs",
      Collection::Artists => "artists",
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the external document store holding the catalog.
///
/// `save` must be atomic: a concurrent `load` observes either the previous
/// document or the new one, never a partial write.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create `collection` as an empty document if it does not exist yet.
  fn ensure_initialized(
    &self,
    collection: Collection,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Read every record of `collection`. Fails if the document is unreadable
  /// or corrupt.
  fn load<T>(
    &self,
    collection: Collection,
  ) -> impl Future<Output = Result<Vec<T>, Self::Error>> + Send + '_
  where
    T: DeserializeOwned + Send + 'static;

  /// Replace the whole of `collection` with `records`.
  fn save<'a, T>(
    &'a self,
    collection: Collection,
    records: &'a [T],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a
  where
    T: Serialize + Sync;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A [`DocumentStore`] holding JSON documents in memory.
///
/// Every call yields to the scheduler once before touching the data, so it
/// suspends exactly where a disk-backed store would.
#[derive(Debug, Default)]
pub struct MemoryStore {
  documents: RwLock<HashMap<Collection, Value>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Overwrite `collection` with an arbitrary JSON document, valid or not.
  pub async fn put_raw(&self, collection: Collection, document: Value) {
    self.documents.write().await.insert(collection, document);
  }

  /// The stored JSON document for `collection`, if any.
  pub async fn raw(&self, collection: Collection) -> Option<Value> {
    self.documents.read().await.get(&collection).cloned()
  }
}

impl DocumentStore for MemoryStore {
  type Error = serde_json::Error;

  async fn ensure_initialized(&self, collection: Collection) -> Result<(), Self::Error> {
    tokio::task::yield_now().await;
    self
      .documents
      .write()
      .await
      .entry(collection)
      .or_insert_with(|| Value::Array(Vec::new()));
    Ok(())
  }

  async fn load<T>(&self, collection: Collection) -> Result<Vec<T>, Self::Error>
  where
    T: DeserializeOwned + Send + 'static,
  {
    tokio::task::yield_now().await;
    let document = self
      .documents
      .read()
      .await
      .get(&collection)
      .cloned()
      .unwrap_or_else(|| Value::Array(Vec::new()));
    serde_json::from_value(document)
  }

  async fn save<'a, T>(&'a self, collection: Collection, records: &'a [T]) -> Result<(), Self::Error>
  where
    T: Serialize + Sync,
  {
    tokio::task::yield_now().await;
    let document = serde_json::to_value(records)?;
    self.documents.write().await.insert(collection, document);
    Ok(())
  }
}
