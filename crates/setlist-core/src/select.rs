//! Song selection. Picks one song from a [`Snapshot`] under an
//! [`Algorithm`].
//!
//! Every algorithm is a pure function of the snapshot and the random source
//! handed in by the caller; nothing here holds state between calls.

use std::{fmt, str::FromStr};

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  Error, Result,
  model::{Artist, Snapshot, Song, SongWithArtist},
};

// ─── Algorithm ───────────────────────────────────────────────────────────────

/// How a song is drawn from the catalog.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
  /// Uniform over all songs.
  #[default]
  Random,
  /// Uniform over artists, then uniform over that artist's songs.
  ArtistEqual,
  /// Artists weighted by the square root of their song count, then uniform
  /// over that artist's songs.
  ArtistWeighted,
}

impl Algorithm {
  pub const ALL: [Algorithm; 3] =
    [Algorithm::Random, Algorithm::ArtistEqual, Algorithm::ArtistWeighted];

  /// The identifier used on the wire (`random`, `artist-equal`,
  /// `artist-weighted`).
  pub fn as_str(self) -> &'static str {
    match self {
      Algorithm::Random => "random",
      Algorithm::ArtistEqual => "artist-equal",
      Algorithm::ArtistWeighted => "artist-weighted",
    }
  }

  /// Human-readable name.
  pub fn label(self) -> &'static str {
    match self {
      Algorithm::Random => "Pure random",
      Algorithm::ArtistEqual => "Equal per artist",
      Algorithm::ArtistWeighted => "Weighted by artist",
    }
  }

  /// The next algorithm in [`Algorithm::ALL`], wrapping around.
  pub fn cycle(self) -> Self {
    match self {
      Algorithm::Random => Algorithm::ArtistEqual,
      Algorithm::ArtistEqual => Algorithm::ArtistWeighted,
      Algorithm::ArtistWeighted => Algorithm::Random,
    }
  }
}

impl fmt::Display for Algorithm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
#[error("unknown selection algorithm: {0:?}")]
pub struct ParseAlgorithmError(String);

impl FromStr for Algorithm {
  type Err = ParseAlgorithmError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Algorithm::ALL
      .into_iter()
      .find(|a| a.as_str() == s)
      .ok_or_else(|| ParseAlgorithmError(s.to_owned()))
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Pick one song from `snapshot` using `algorithm`.
///
/// Fails with [`Error::EmptyCatalog`] when there is nothing to draw from.
/// [`Algorithm::ArtistEqual`] may also fail with [`Error::NoSongsForArtist`]
/// when it lands on an artist whose songs were all deleted; the caller is
/// expected to let the user try again.
pub fn pick<R>(
  snapshot: &Snapshot,
  algorithm: Algorithm,
  rng: &mut R,
) -> Result<SongWithArtist>
where
  R: Rng + ?Sized,
{
  let song = match algorithm {
    Algorithm::Random => pick_random(snapshot, rng)?,
    Algorithm::ArtistEqual => pick_artist_equal(snapshot, rng)?,
    Algorithm::ArtistWeighted => pick_artist_weighted(snapshot, rng)?,
  };
  tracing::debug!(%algorithm, song_id = %song.id, "picked song");
  Ok(snapshot.join(song))
}

fn pick_random<'s, R>(snapshot: &'s Snapshot, rng: &mut R) -> Result<&'s Song>
where
  R: Rng + ?Sized,
{
  snapshot.songs.choose(rng).ok_or(Error::EmptyCatalog)
}

fn pick_artist_equal<'s, R>(snapshot: &'s Snapshot, rng: &mut R) -> Result<&'s Song>
where
  R: Rng + ?Sized,
{
  let artist = snapshot.artists.choose(rng).ok_or(Error::EmptyCatalog)?;
  snapshot
    .songs_by(artist.id)
    .choose(rng)
    .copied()
    .ok_or_else(|| Error::NoSongsForArtist(artist.name.clone()))
}

fn pick_artist_weighted<'s, R>(snapshot: &'s Snapshot, rng: &mut R) -> Result<&'s Song>
where
  R: Rng + ?Sized,
{
  let weighted = artist_weights(snapshot);
  if weighted.is_empty() {
    return Err(Error::EmptyCatalog);
  }

  let weights: Vec<f64> = weighted.iter().map(|(_, w)| *w).collect();
  let total: f64 = weights.iter().sum();
  let artist = weighted[walk(&weights, rng.r#gen::<f64>() * total)].0;

  snapshot
    .songs_by(artist.id)
    .choose(rng)
    .copied()
    .ok_or(Error::EmptyCatalog)
}

// ─── Weighting ───────────────────────────────────────────────────────────────

/// Every artist with at least one song, paired with `sqrt(song count)`.
/// Artists without songs are left out.
pub fn artist_weights(snapshot: &Snapshot) -> Vec<(&Artist, f64)> {
  snapshot
    .artists
    .iter()
    .map(|a| (a, (snapshot.songs_by(a.id).len() as f64).sqrt()))
    .filter(|(_, w)| *w > 0.0)
    .collect()
}

/// Cumulative-weight walk: subtract each weight from `r` and stop at the
/// first index where the remainder drops to zero or below.
///
/// If rounding leaves a positive remainder after the last weight, the last
/// index is returned. `weights` must not be empty.
fn walk(weights: &[f64], r: f64) -> usize {
  let mut remaining = r;
  for (i, w) in weights.iter().enumerate() {
    remaining -= w;
    if remaining <= 0.0 {
      return i;
    }
  }
  weights.len() - 1
}
