//! Display-side queries over a [`Snapshot`]: search, date sort, shuffle and
//! form autocomplete.
//!
//! Nothing here mutates the catalog. Deleting a row is the caller's business
//! and goes through [`Catalog`](crate::Catalog).

use std::collections::HashMap;

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::model::{Artist, Snapshot, Song, SongId, SongWithArtist};

/// Most suggestions returned by [`suggest_titles`] and [`suggest_artists`].
pub const MAX_SUGGESTIONS: usize = 5;

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Direction of the registration-date sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
  #[serde(rename = "asc")]
  Ascending,
  #[serde(rename = "desc")]
  Descending,
}

impl SortOrder {
  pub fn flip(self) -> Self {
    match self {
      SortOrder::Ascending => SortOrder::Descending,
      SortOrder::Descending => SortOrder::Ascending,
    }
  }
}

/// How a [`SongListView`] orders its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOrder {
  /// By `created_at`.
  Date(SortOrder),
  /// A fixed permutation of song ids, drawn once by
  /// [`SongListView::shuffle`].
  Shuffled(Vec<SongId>),
}

// ─── View ────────────────────────────────────────────────────────────────────

/// Search text plus ordering for the song table.
///
/// Starts out sorted by date, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongListView {
  pub query: String,
  order:     ListOrder,
}

impl Default for SongListView {
  fn default() -> Self {
    Self {
      query: String::new(),
      order: ListOrder::Date(SortOrder::Descending),
    }
  }
}

impl SongListView {
  pub fn new() -> Self { Self::default() }

  pub fn order(&self) -> &ListOrder { &self.order }

  /// Flip the date order, or switch back to date order (newest first) when
  /// the view is shuffled.
  pub fn toggle_date_sort(&mut self) {
    self.order = match &self.order {
      ListOrder::Date(order) => ListOrder::Date(order.flip()),
      ListOrder::Shuffled(_) => ListOrder::Date(SortOrder::Descending),
    };
  }

  /// Draw a new uniform permutation of the snapshot's songs.
  ///
  /// The permutation is kept until the next call; producing rows again does
  /// not reshuffle.
  pub fn shuffle<R>(&mut self, snapshot: &Snapshot, rng: &mut R)
  where
    R: Rng + ?Sized,
  {
    let mut ids: Vec<SongId> = snapshot.songs.iter().map(|s| s.id).collect();
    ids.shuffle(rng);
    self.order = ListOrder::Shuffled(ids);
  }

  /// The rows to display: songs matching the query, in the view's order.
  ///
  /// In shuffled order, songs that were not part of the permutation (added
  /// after it was drawn) come last, newest first.
  pub fn rows(&self, snapshot: &Snapshot) -> Vec<SongWithArtist> {
    let mut rows = filter(snapshot, &self.query);
    match &self.order {
      ListOrder::Date(order) => sort_by_date(&mut rows, *order),
      ListOrder::Shuffled(ids) => {
        sort_by_date(&mut rows, SortOrder::Descending);
        let position: HashMap<SongId, usize> =
          ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        rows.sort_by_key(|r| position.get(&r.song.id).copied().unwrap_or(usize::MAX));
      }
    }
    rows
  }
}

// ─── Filter & sort ───────────────────────────────────────────────────────────

/// Songs whose title or artist name contains `query`, ignoring case. An empty
/// query matches everything.
pub fn filter(snapshot: &Snapshot, query: &str) -> Vec<SongWithArtist> {
  let needle = query.to_lowercase();
  snapshot
    .joined()
    .into_iter()
    .filter(|row| {
      needle.is_empty()
        || row.song.title.to_lowercase().contains(&needle)
        || row.artist_name.to_lowercase().contains(&needle)
    })
    .collect()
}

/// Stable sort on `created_at`.
pub fn sort_by_date(rows: &mut [SongWithArtist], order: SortOrder) {
  match order {
    SortOrder::Ascending => rows.sort_by_key(|r| r.song.created_at),
    SortOrder::Descending => {
      rows.sort_by(|a, b| b.song.created_at.cmp(&a.song.created_at))
    }
  }
}

// ─── Autocomplete ────────────────────────────────────────────────────────────

/// Up to [`MAX_SUGGESTIONS`] distinct song titles starting with `prefix`
/// (case-insensitive), in catalog order.
pub fn suggest_titles(songs: &[Song], prefix: &str) -> Vec<String> {
  suggest(songs.iter().map(|s| s.title.as_str()), prefix)
}

/// Up to [`MAX_SUGGESTIONS`] artist names starting with `prefix`
/// (case-insensitive), in catalog order.
pub fn suggest_artists(artists: &[Artist], prefix: &str) -> Vec<String> {
  suggest(artists.iter().map(|a| a.name.as_str()), prefix)
}

fn suggest<'a>(candidates: impl Iterator<Item = &'a str>, prefix: &str) -> Vec<String> {
  if prefix.is_empty() {
    return Vec::new();
  }
  let prefix = prefix.to_lowercase();
  let mut out: Vec<String> = Vec::new();
  for candidate in candidates {
    if out.len() == MAX_SUGGESTIONS {
      break;
    }
    if candidate.to_lowercase().starts_with(&prefix)
      && !out.iter().any(|s| s == candidate)
    {
      out.push(candidate.to_owned());
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;
  use crate::model::ArtistId;

  /// Songs are registered one day apart, in the order given.
  fn snapshot(rows: &[(&str, &str)]) -> Snapshot {
    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut snapshot = Snapshot::default();
    for (i, (title, artist)) in rows.iter().enumerate() {
      let artist_id = match snapshot.artists.iter().find(|a| a.name == *artist) {
        Some(a) => a.id,
        None => {
          let id = ArtistId(snapshot.artists.len() as u64 + 1);
          snapshot.artists.push(Artist { id, name: (*artist).into() });
          id
        }
      };
      snapshot.songs.push(Song {
        id: SongId(i as u64 + 1),
        title: (*title).into(),
        artist_id,
        created_at: epoch + Duration::days(i as i64),
      });
    }
    snapshot
  }

  fn titles(rows: &[SongWithArtist]) -> Vec<&str> {
    rows.iter().map(|r| r.song.title.as_str()).collect()
  }

  fn sample() -> Snapshot {
    snapshot(&[
      ("Lilac", "Mrs. GREEN APPLE"),
      ("Idol", "YOASOBI"),
      ("Magic", "Mrs. GREEN APPLE"),
      ("Yoru ni Kakeru", "YOASOBI"),
    ])
  }

  // ─── Filter ────────────────────────────────────────────────────────────────

  #[test]
  fn empty_query_matches_everything() {
    assert_eq!(filter(&sample(), "").len(), 4);
  }

  #[test]
  fn query_matches_title_or_artist_ignoring_case() {
    let s = sample();
    assert_eq!(titles(&filter(&s, "LILAC")), vec!["Lilac"]);
    assert_eq!(titles(&filter(&s, "yoasobi")), vec!["Idol", "Yoru ni Kakeru"]);
    assert_eq!(titles(&filter(&s, "green")), vec!["Lilac", "Magic"]);
    assert!(filter(&s, "nothing here").is_empty());
  }

  // ─── Date sort ─────────────────────────────────────────────────────────────

  #[test]
  fn view_starts_newest_first() {
    let view = SongListView::new();
    assert_eq!(view.order(), &ListOrder::Date(SortOrder::Descending));
    assert_eq!(
      titles(&view.rows(&sample())),
      vec!["Yoru ni Kakeru", "Magic", "Idol", "Lilac"]
    );
  }

  #[test]
  fn toggling_flips_the_date_order() {
    let s = sample();
    let mut view = SongListView::new();

    view.toggle_date_sort();
    assert_eq!(titles(&view.rows(&s)), vec!["Lilac", "Idol", "Magic", "Yoru ni Kakeru"]);

    view.toggle_date_sort();
    assert_eq!(view.order(), &ListOrder::Date(SortOrder::Descending));
  }

  #[test]
  fn query_and_sort_combine() {
    let mut view = SongListView::new();
    view.query = "mrs".into();
    assert_eq!(titles(&view.rows(&sample())), vec!["Magic", "Lilac"]);
  }

  // ─── Shuffle ───────────────────────────────────────────────────────────────

  #[test]
  fn shuffle_is_a_permutation_that_survives_rereads() {
    let s = sample();
    let mut view = SongListView::new();
    view.shuffle(&s, &mut StdRng::seed_from_u64(7));

    let first = view.rows(&s);
    let mut sorted = titles(&first);
    sorted.sort_unstable();
    assert_eq!(sorted, vec!["Idol", "Lilac", "Magic", "Yoru ni Kakeru"]);

    assert_eq!(view.rows(&s), first);
    assert_eq!(view.rows(&s), first);
  }

  #[test]
  fn each_shuffle_draws_a_new_order() {
    let names: Vec<String> = (0..20).map(|i| format!("song {i}")).collect();
    let rows: Vec<(&str, &str)> = names.iter().map(|t| (t.as_str(), "A")).collect();
    let s = snapshot(&rows);

    let mut rng = StdRng::seed_from_u64(11);
    let mut view = SongListView::new();
    view.shuffle(&s, &mut rng);
    let first = view.order().clone();
    view.shuffle(&s, &mut rng);
    assert_ne!(view.order(), &first);
  }

  #[test]
  fn toggling_after_shuffle_returns_to_newest_first() {
    let s = sample();
    let mut view = SongListView::new();
    view.toggle_date_sort();
    view.shuffle(&s, &mut StdRng::seed_from_u64(3));
    view.toggle_date_sort();
    assert_eq!(view.order(), &ListOrder::Date(SortOrder::Descending));
  }

  #[test]
  fn songs_added_after_a_shuffle_come_last() {
    let mut s = sample();
    let mut view = SongListView::new();
    view.shuffle(&s, &mut StdRng::seed_from_u64(5));

    let mut late = s.songs[0].clone();
    late.id = SongId(99);
    late.title = "Encore".into();
    late.created_at += Duration::days(30);
    s.songs.push(late);

    let rows = view.rows(&s);
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[4].song.title, "Encore");
  }

  #[test]
  fn shuffled_view_still_filters() {
    let s = sample();
    let mut view = SongListView::new();
    view.shuffle(&s, &mut StdRng::seed_from_u64(9));
    view.query = "yoasobi".into();
    let rows = view.rows(&s);
    let mut got = titles(&rows);
    got.sort_unstable();
    assert_eq!(got, vec!["Idol", "Yoru ni Kakeru"]);
  }

  // ─── Autocomplete ──────────────────────────────────────────────────────────

  #[test]
  fn suggestions_match_prefix_ignoring_case() {
    let s = sample();
    assert_eq!(suggest_artists(&s.artists, "mrs"), vec!["Mrs. GREEN APPLE"]);
    assert_eq!(suggest_titles(&s.songs, "y"), vec!["Yoru ni Kakeru"]);
    assert!(suggest_titles(&s.songs, "agic").is_empty());
  }

  #[test]
  fn empty_prefix_suggests_nothing() {
    assert!(suggest_artists(&sample().artists, "").is_empty());
  }

  #[test]
  fn suggestions_are_unique_and_capped() {
    let s = snapshot(&[
      ("Intro", "A"),
      ("Intro", "B"),
      ("Interlude", "A"),
      ("In Bloom", "A"),
      ("Inside", "A"),
      ("Into", "A"),
      ("Innocent", "A"),
    ]);
    let got = suggest_titles(&s.songs, "in");
    assert_eq!(got, vec!["Intro", "Interlude", "In Bloom", "Inside", "Into"]);
  }
}
