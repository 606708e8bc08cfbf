//! [`Catalog`] — the single owner of the song and artist collections.
//!
//! All writes go through here: id assignment, artist de-duplication, the
//! duplicate-song check and write serialization. Readers get owned copies
//! ([`Snapshot`]) and never touch shared state.

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  document::{Collection, DocumentStore},
  model::{Artist, ArtistId, Snapshot, Song, SongId},
};

/// The catalog store, generic over its persistence backend.
///
/// At most one mutating call runs at a time. A mutation that arrives while
/// another is in flight fails immediately with [`Error::Busy`]; it is never
/// queued. Reads do not take the write lock.
pub struct Catalog<D> {
  store:      D,
  write_lock: Mutex<()>,
}

impl<D: DocumentStore> Catalog<D> {
  pub fn new(store: D) -> Self {
    Self { store, write_lock: Mutex::new(()) }
  }

  /// The underlying document store.
  pub fn store(&self) -> &D { &self.store }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// All songs, in insertion order.
  pub async fn list_songs(&self) -> Result<Vec<Song>> {
    self.ensure_initialized().await?;
    self.load(Collection::Songs).await
  }

  /// All artists, in insertion order.
  pub async fn list_artists(&self) -> Result<Vec<Artist>> {
    self.ensure_initialized().await?;
    self.load(Collection::Artists).await
  }

  /// Both collections, read together.
  pub async fn snapshot(&self) -> Result<Snapshot> {
    self.ensure_initialized().await?;
    let songs = self.load(Collection::Songs).await?;
    let artists = self.load(Collection::Artists).await?;
    Ok(Snapshot::new(songs, artists))
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Register a song, creating its artist on first reference.
  ///
  /// Fails with [`Error::Validation`] if either field is blank and with
  /// [`Error::Conflict`] if the artist already has a song with this title.
  /// The artists document is only written when a new artist was created.
  pub async fn add_song(&self, title: &str, artist_name: &str) -> Result<Song> {
    let _guard = self.begin_write("add_song")?;

    let title = required("title", title)?;
    let artist_name = required("artist name", artist_name)?;

    let Snapshot { mut songs, mut artists } = self.snapshot().await?;

    let (artist_id, new_artist) =
      match artists.iter().find(|a| a.name == artist_name) {
        Some(existing) => (existing.id, false),
        None => {
          let id = ArtistId::next_after(artists.iter().map(|a| a.id))
            .ok_or_else(|| ids_exhausted(Collection::Artists))?;
          artists.push(Artist { id, name: artist_name.to_owned() });
          (id, true)
        }
      };

    if songs.iter().any(|s| s.title == title && s.artist_id == artist_id) {
      debug!(title, artist = artist_name, "rejected duplicate song");
      return Err(Error::Conflict {
        title:  title.to_owned(),
        artist: artist_name.to_owned(),
      });
    }

    let song_id = SongId::next_after(songs.iter().map(|s| s.id))
      .ok_or_else(|| ids_exhausted(Collection::Songs))?;
    let song = Song {
      id: song_id,
      title: title.to_owned(),
      artist_id,
      created_at: Utc::now(),
    };
    songs.push(song.clone());

    // Artists first: a failure in between leaves at worst an artist without
    // songs, never a song pointing at a missing artist.
    if new_artist {
      self.save(Collection::Artists, &artists).await?;
    }
    self.save(Collection::Songs, &songs).await?;

    info!(
      song_id = %song.id,
      artist_id = %artist_id,
      new_artist,
      "song added"
    );
    Ok(song)
  }

  /// Remove a song by id. Its artist is left in place.
  pub async fn delete_song(&self, id: SongId) -> Result<()> {
    let _guard = self.begin_write("delete_song")?;

    let mut songs: Vec<Song> = self.list_songs().await?;
    let Some(index) = songs.iter().position(|s| s.id == id) else {
      debug!(song_id = %id, "delete of unknown song");
      return Err(Error::SongNotFound(id));
    };
    songs.remove(index);
    self.save(Collection::Songs, &songs).await?;

    info!(song_id = %id, "song deleted");
    Ok(())
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  fn begin_write(&self, operation: &'static str) -> Result<MutexGuard<'_, ()>> {
    self.write_lock.try_lock().map_err(|_| {
      debug!(operation, "write rejected, another write is in flight");
      Error::Busy
    })
  }

  async fn ensure_initialized(&self) -> Result<()> {
    for collection in Collection::ALL {
      self
        .store
        .ensure_initialized(collection)
        .await
        .map_err(|e| storage_failure("initialize", collection, e))?;
    }
    Ok(())
  }

  async fn load<T>(&self, collection: Collection) -> Result<Vec<T>>
  where
    T: DeserializeOwned + Send + 'static,
  {
    self
      .store
      .load(collection)
      .await
      .map_err(|e| storage_failure("load", collection, e))
  }

  async fn save<T>(&self, collection: Collection, records: &[T]) -> Result<()>
  where
    T: serde::Serialize + Sync,
  {
    self
      .store
      .save(collection, records)
      .await
      .map_err(|e| storage_failure("save", collection, e))
  }
}

/// Trim `value`, rejecting it if nothing is left.
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
  let value = value.trim();
  if value.is_empty() {
    return Err(Error::Validation(format!("{field} is required")));
  }
  Ok(value)
}

fn ids_exhausted(collection: Collection) -> Error {
  warn!(%collection, "no ids left after u64::MAX");
  Error::Validation(format!("no {collection} ids left"))
}

fn storage_failure<E>(action: &str, collection: Collection, err: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  warn!(%collection, action, error = %err, "document store failure");
  Error::storage(err)
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use serde::Serialize;
  use serde_json::json;

  use super::*;
  use crate::document::MemoryStore;

  fn catalog() -> Catalog<MemoryStore> { Catalog::new(MemoryStore::new()) }

  // ─── Scenario ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_duplicate_add_and_delete() {
    let c = catalog();

    let lilac = c.add_song("Lilac", "Mrs. GREEN APPLE").await.unwrap();
    assert_eq!(lilac.id, SongId(1));
    assert_eq!(lilac.title, "Lilac");
    assert_eq!(lilac.artist_id, ArtistId(1));
    assert_eq!(
      c.list_artists().await.unwrap(),
      vec![Artist { id: ArtistId(1), name: "Mrs. GREEN APPLE".into() }]
    );

    let err = c.add_song("Lilac", "Mrs. GREEN APPLE").await.unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }));

    let start = c.add_song("StaRt", "Mrs. GREEN APPLE").await.unwrap();
    assert_eq!(start.id, SongId(2));
    assert_eq!(start.artist_id, ArtistId(1));
    assert_eq!(c.list_artists().await.unwrap().len(), 1);

    c.delete_song(SongId(1)).await.unwrap();
    let ids: Vec<_> = c.list_songs().await.unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![SongId(2)]);
  }

  // ─── Reads ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn first_read_initializes_empty_collections() {
    let c = catalog();
    assert!(c.list_songs().await.unwrap().is_empty());
    assert!(c.list_artists().await.unwrap().is_empty());
    assert_eq!(c.store().raw(Collection::Artists).await, Some(json!([])));
    assert_eq!(c.store().raw(Collection::Songs).await, Some(json!([])));
  }

  #[tokio::test]
  async fn corrupt_document_is_storage_unavailable() {
    let c = catalog();
    c.store().put_raw(Collection::Songs, json!({ "oops": true })).await;
    let err = c.list_songs().await.unwrap_err();
    assert!(matches!(err, Error::StorageUnavailable(_)));

    let err = c.add_song("Lilac", "Mrs. GREEN APPLE").await.unwrap_err();
    assert!(matches!(err, Error::StorageUnavailable(_)));
  }

  // ─── Add ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn new_song_id_exceeds_every_previous_id() {
    let c = catalog();
    let mut seen = Vec::new();
    for title in ["a", "b", "c", "d"] {
      let song = c.add_song(title, "Band").await.unwrap();
      assert!(seen.iter().all(|id| song.id > *id));
      seen.push(song.id);
    }

    let listed = c.list_songs().await.unwrap();
    assert_eq!(listed.iter().filter(|s| s.title == "c").count(), 1);
  }

  #[tokio::test]
  async fn ids_follow_max_after_a_gap() {
    let c = catalog();
    c.add_song("one", "A").await.unwrap();
    c.add_song("two", "A").await.unwrap();
    c.add_song("three", "A").await.unwrap();
    c.delete_song(SongId(2)).await.unwrap();

    let four = c.add_song("four", "A").await.unwrap();
    assert_eq!(four.id, SongId(4));
  }

  #[tokio::test]
  async fn same_artist_name_is_deduplicated() {
    let c = catalog();
    let a = c.add_song("Lilac", "Mrs. GREEN APPLE").await.unwrap();
    let b = c.add_song("Magic", "Mrs. GREEN APPLE").await.unwrap();

    assert_eq!(c.list_artists().await.unwrap().len(), 1);
    assert_eq!(c.list_songs().await.unwrap().len(), 2);
    assert_eq!(a.artist_id, b.artist_id);
  }

  #[tokio::test]
  async fn artist_names_are_case_sensitive() {
    let c = catalog();
    let a = c.add_song("Lilac", "Mrs. GREEN APPLE").await.unwrap();
    let b = c.add_song("Lilac", "mrs. green apple").await.unwrap();

    assert_ne!(a.artist_id, b.artist_id);
    assert_eq!(c.list_artists().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn same_title_by_different_artists_is_allowed() {
    let c = catalog();
    c.add_song("Intro", "A").await.unwrap();
    c.add_song("Intro", "B").await.unwrap();
    assert_eq!(c.list_songs().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn duplicate_leaves_catalog_unchanged() {
    let c = catalog();
    c.add_song("Lilac", "Mrs. GREEN APPLE").await.unwrap();
    let before = c.snapshot().await.unwrap();

    let err = c.add_song("Lilac", "Mrs. GREEN APPLE").await.unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }));
    assert_eq!(c.snapshot().await.unwrap(), before);
  }

  #[tokio::test]
  async fn blank_fields_are_rejected() {
    let c = catalog();
    for (title, artist) in [("", "A"), ("Song", ""), ("   ", "A"), ("Song", "\t")] {
      let err = c.add_song(title, artist).await.unwrap_err();
      assert!(matches!(err, Error::Validation(_)), "{title:?}/{artist:?}");
    }
    assert!(c.list_songs().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn surrounding_whitespace_is_trimmed() {
    let c = catalog();
    let song = c.add_song("  Lilac ", " Mrs. GREEN APPLE").await.unwrap();
    assert_eq!(song.title, "Lilac");
    let err = c.add_song("Lilac", "Mrs. GREEN APPLE ").await.unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }));
  }

  #[tokio::test]
  async fn exhausted_song_ids_are_rejected_without_writing() {
    let c = catalog();
    c.store()
      .put_raw(Collection::Artists, json!([{ "id": 1, "name": "A" }]))
      .await;
    c.store()
      .put_raw(
        Collection::Songs,
        json!([{
          "id": u64::MAX,
          "title": "Last",
          "artist_id": 1,
          "created_at": "2024-05-01T12:00:00Z",
        }]),
      )
      .await;
    let before = c.snapshot().await.unwrap();

    let err = c.add_song("Next", "B").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(c.snapshot().await.unwrap(), before);
  }

  // ─── Delete ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_removes_only_that_song() {
    let c = catalog();
    c.add_song("one", "A").await.unwrap();
    c.add_song("two", "B").await.unwrap();
    c.add_song("three", "A").await.unwrap();

    c.delete_song(SongId(2)).await.unwrap();
    let titles: Vec<_> =
      c.list_songs().await.unwrap().into_iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["one", "three"]);

    let err = c.delete_song(SongId(2)).await.unwrap_err();
    assert!(matches!(err, Error::SongNotFound(SongId(2))));
  }

  #[tokio::test]
  async fn delete_keeps_orphaned_artist() {
    let c = catalog();
    let song = c.add_song("Solo", "Lonely").await.unwrap();
    c.delete_song(song.id).await.unwrap();
    assert_eq!(c.list_artists().await.unwrap().len(), 1);
  }

  // ─── Write serialization ───────────────────────────────────────────────────

  #[tokio::test]
  async fn concurrent_writes_reject_the_second_with_busy() {
    let c = catalog();
    let (a, b) = tokio::join!(
      c.add_song("Lilac", "Mrs. GREEN APPLE"),
      c.add_song("StaRt", "Mrs. GREEN APPLE"),
    );

    let (ok, busy): (Vec<_>, Vec<_>) = [a, b].into_iter().partition(Result::is_ok);
    assert_eq!(ok.len(), 1);
    assert_eq!(busy.len(), 1);
    assert!(matches!(busy[0], Err(Error::Busy)));

    let songs = c.list_songs().await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0], ok.into_iter().next().unwrap().unwrap());
  }

  #[tokio::test]
  async fn delete_and_add_do_not_interleave() {
    let c = catalog();
    c.add_song("one", "A").await.unwrap();
    let (added, deleted) =
      tokio::join!(c.add_song("two", "A"), c.delete_song(SongId(1)));

    let busy = [added.is_err(), deleted.is_err()];
    assert_eq!(busy.iter().filter(|b| **b).count(), 1);
    assert!(matches!(added, Ok(_) | Err(Error::Busy)));
    assert!(matches!(deleted, Ok(()) | Err(Error::Busy)));
  }

  #[tokio::test]
  async fn reads_are_not_blocked_by_a_write() {
    let c = catalog();
    c.add_song("one", "A").await.unwrap();
    let (added, listed) = tokio::join!(c.add_song("two", "A"), c.list_songs());
    assert!(added.is_ok());
    assert!(listed.is_ok());
  }

  #[tokio::test]
  async fn lock_is_released_after_a_failed_write() {
    let c = catalog();
    assert!(c.delete_song(SongId(5)).await.is_err());
    assert!(c.add_song("one", "A").await.is_ok());
  }

  // ─── Write counting ────────────────────────────────────────────────────────

  /// Counts saves per collection on top of a [`MemoryStore`].
  #[derive(Default)]
  struct CountingStore {
    inner:        MemoryStore,
    song_saves:   AtomicUsize,
    artist_saves: AtomicUsize,
  }

  impl DocumentStore for CountingStore {
    type Error = serde_json::Error;

    async fn ensure_initialized(&self, collection: Collection) -> Result<(), Self::Error> {
      self.inner.ensure_initialized(collection).await
    }

    async fn load<T>(&self, collection: Collection) -> Result<Vec<T>, Self::Error>
    where
      T: DeserializeOwned + Send + 'static,
    {
      self.inner.load(collection).await
    }

    async fn save<'a, T>(&'a self, collection: Collection, records: &'a [T]) -> Result<(), Self::Error>
    where
      T: Serialize + Sync,
    {
      match collection {
        Collection::Songs => self.song_saves.fetch_add(1, Ordering::SeqCst),
        Collection::Artists => self.artist_saves.fetch_add(1, Ordering::SeqCst),
      };
      self.inner.save(collection, records).await
    }
  }

  #[tokio::test]
  async fn artists_are_written_only_for_new_artists() {
    let c = Catalog::new(CountingStore::default());
    c.add_song("Lilac", "Mrs. GREEN APPLE").await.unwrap();
    c.add_song("StaRt", "Mrs. GREEN APPLE").await.unwrap();
    c.add_song("Pretender", "Official HIGE DANdism").await.unwrap();

    assert_eq!(c.store().song_saves.load(Ordering::SeqCst), 3);
    assert_eq!(c.store().artist_saves.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn conflicts_write_nothing() {
    let c = Catalog::new(CountingStore::default());
    c.add_song("Lilac", "Mrs. GREEN APPLE").await.unwrap();
    let _ = c.add_song("Lilac", "Mrs. GREEN APPLE").await;

    assert_eq!(c.store().song_saves.load(Ordering::SeqCst), 1);
    assert_eq!(c.store().artist_saves.load(Ordering::SeqCst), 1);
  }
}
