//! Catalog records: artists, songs and the snapshot handed to readers.
//!
//! Records are immutable once created. Field names match the on-disk JSON
//! documents exactly (`id`, `name`, `title`, `artist_id`, `created_at`).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when a song's artist cannot be resolved.
pub const UNKNOWN_ARTIST: &str = "Unknown artist";

// ─── Identifiers ─────────────────────────────────────────────────────────────

macro_rules! record_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub u64);

    impl $name {
      /// The id after the largest of `ids`, or `1` for an empty collection.
      /// `None` once the largest id is `u64::MAX`.
      pub fn next_after(ids: impl IntoIterator<Item = Self>) -> Option<Self> {
        match ids.into_iter().map(|id| id.0).max() {
          None => Some(Self(1)),
          Some(max) => max.checked_add(1).map(Self),
        }
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

record_id!(
  /// Identifier of an [`Artist`]; positive, assigned as `max + 1`.
  ArtistId
);
record_id!(
  /// Identifier of a [`Song`]; positive, assigned as `max + 1`.
  SongId
);

// ─── Records ─────────────────────────────────────────────────────────────────

/// An artist. Created on first reference by name, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
  pub id:   ArtistId,
  /// Unique, compared case-sensitively.
  pub name: String,
}

/// A registered song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
  pub id:         SongId,
  pub title:      String,
  pub artist_id:  ArtistId,
  pub created_at: DateTime<Utc>,
}

/// A song joined with its artist's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongWithArtist {
  #[serde(flatten)]
  pub song:        Song,
  pub artist_name: String,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// An immutable point-in-time copy of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub songs:   Vec<Song>,
  pub artists: Vec<Artist>,
}

impl Snapshot {
  pub fn new(songs: Vec<Song>, artists: Vec<Artist>) -> Self {
    Self { songs, artists }
  }

  pub fn artist(&self, id: ArtistId) -> Option<&Artist> {
    self.artists.iter().find(|a| a.id == id)
  }

  /// The artist's name, or [`UNKNOWN_ARTIST`] for a dangling reference.
  pub fn artist_name(&self, id: ArtistId) -> &str {
    self.artist(id).map_or(UNKNOWN_ARTIST, |a| a.name.as_str())
  }

  /// All songs by `artist_id`, in collection order.
  pub fn songs_by(&self, artist_id: ArtistId) -> Vec<&Song> {
    self.songs.iter().filter(|s| s.artist_id == artist_id).collect()
  }

  pub fn join(&self, song: &Song) -> SongWithArtist {
    SongWithArtist {
      song:        song.clone(),
      artist_name: self.artist_name(song.artist_id).to_owned(),
    }
  }

  /// Every song joined with its artist name, in collection order.
  pub fn joined(&self) -> Vec<SongWithArtist> {
    self.songs.iter().map(|s| self.join(s)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn next_id_starts_at_one() {
    assert_eq!(SongId::next_after([]), Some(SongId(1)));
  }

  #[test]
  fn next_id_follows_the_maximum_not_the_count() {
    let ids = [ArtistId(1), ArtistId(7), ArtistId(3)];
    assert_eq!(ArtistId::next_after(ids), Some(ArtistId(8)));
  }

  #[test]
  fn next_id_is_none_when_ids_are_exhausted() {
    assert_eq!(SongId::next_after([SongId(3), SongId(u64::MAX)]), None);
  }

  #[test]
  fn song_json_uses_bare_integer_ids() {
    let song = Song {
      id:         SongId(2),
      title:      "StaRt".into(),
      artist_id:  ArtistId(1),
      created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
    };
    let json = serde_json::to_value(&song).unwrap();
    assert_eq!(json["id"], 2);
    assert_eq!(json["artist_id"], 1);
    assert_eq!(json["title"], "StaRt");
  }

  #[test]
  fn joined_song_flattens_fields() {
    let snapshot = Snapshot::new(
      vec![Song {
        id:         SongId(1),
        title:      "Lilac".into(),
        artist_id:  ArtistId(1),
        created_at: Utc::now(),
      }],
      vec![Artist { id: ArtistId(1), name: "Mrs. GREEN APPLE".into() }],
    );
    let json = serde_json::to_value(snapshot.join(&snapshot.songs[0])).unwrap();
    assert_eq!(json["title"], "Lilac");
    assert_eq!(json["artist_name"], "Mrs. GREEN APPLE");
  }

  #[test]
  fn dangling_artist_is_reported_as_unknown() {
    let snapshot = Snapshot::default();
    assert_eq!(snapshot.artist_name(ArtistId(9)), UNKNOWN_ARTIST);
  }
}
