//! Handlers for `/songs` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/songs` | Optional `?q=<text>` and `?order=asc\|desc` |
//! | `POST`   | `/songs` | Body: `{"title":"...","artistName":"..."}` |
//! | `DELETE` | `/songs/{id}` | 404 if not found, 400 if `id` is not a number |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use setlist_core::{
  Catalog,
  document::DocumentStore,
  model::SongId,
  query::{self, SortOrder},
};

use crate::{error::ApiError, extract};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Case-insensitive substring of the title or artist name.
  pub q:     Option<String>,
  /// Registration-date order. Defaults to newest first.
  pub order: Option<SortOrder>,
}

impl ListParams {
  fn is_empty(&self) -> bool { self.q.is_none() && self.order.is_none() }
}

/// `GET /songs[?q=<text>][&order=asc|desc]`
///
/// Without parameters this is the raw song collection in insertion order.
/// With any parameter the songs come back joined with their artist names,
/// filtered and date-sorted.
pub async fn list<D>(
  State(catalog): State<Arc<Catalog<D>>>,
  extract::Query(params): extract::Query<ListParams>,
) -> Result<Response, ApiError>
where
  D: DocumentStore,
{
  if params.is_empty() {
    let songs = catalog.list_songs().await?;
    return Ok(Json(songs).into_response());
  }

  let snapshot = catalog.snapshot().await?;
  let mut rows = query::filter(&snapshot, params.q.as_deref().unwrap_or_default());
  query::sort_by_date(&mut rows, params.order.unwrap_or(SortOrder::Descending));
  Ok(Json(rows).into_response())
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  /// Missing and `null` are both treated as blank.
  #[serde(default)]
  pub title:       Option<String>,
  #[serde(default)]
  pub artist_name: Option<String>,
}

/// `POST /songs` — body: `{"title":"Lilac","artistName":"Mrs. GREEN APPLE"}`
pub async fn create<D>(
  State(catalog): State<Arc<Catalog<D>>>,
  extract::Json(body): extract::Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  D: DocumentStore,
{
  let title = body.title.as_deref().unwrap_or_default();
  let artist_name = body.artist_name.as_deref().unwrap_or_default();
  let song = catalog.add_song(title, artist_name).await?;
  Ok((StatusCode::CREATED, Json(song)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /songs/{id}`
pub async fn delete_one<D>(
  State(catalog): State<Arc<Catalog<D>>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  D: DocumentStore,
{
  let id = id
    .parse::<u64>()
    .map(SongId)
    .map_err(|_| ApiError::BadRequest(format!("invalid song id {id:?}")))?;
  catalog.delete_song(id).await?;
  Ok(Json(json!({ "message": "song deleted" })))
}
