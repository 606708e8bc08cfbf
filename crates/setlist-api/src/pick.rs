//! Handler for `GET /pick`.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use setlist_core::{
  Catalog,
  document::DocumentStore,
  model::SongWithArtist,
  select::{self, Algorithm},
};

use crate::{error::ApiError, extract::Query};

#[derive(Debug, Default, Deserialize)]
pub struct PickParams {
  /// `random`, `artist-equal` or `artist-weighted`.
  pub algorithm: Option<String>,
}

/// `GET /pick[?algorithm=<name>]`
pub async fn handler<D>(
  State(catalog): State<Arc<Catalog<D>>>,
  Query(params): Query<PickParams>,
) -> Result<Json<SongWithArtist>, ApiError>
where
  D: DocumentStore,
{
  let algorithm = match params.algorithm.as_deref() {
    None => Algorithm::default(),
    Some(name) => name
      .parse::<Algorithm>()
      .map_err(|e| ApiError::BadRequest(e.to_string()))?,
  };

  let snapshot = catalog.snapshot().await?;
  let song = select::pick(&snapshot, algorithm, &mut rand::thread_rng())?;
  Ok(Json(song))
}
