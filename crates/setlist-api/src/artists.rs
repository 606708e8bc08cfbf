//! Handler for `GET /artists`.

use std::sync::Arc;

use axum::{Json, extract::State};
use setlist_core::{Catalog, document::DocumentStore, model::Artist};

use crate::error::ApiError;

/// `GET /artists` — every artist, in insertion order.
pub async fn list<D>(
  State(catalog): State<Arc<Catalog<D>>>,
) -> Result<Json<Vec<Artist>>, ApiError>
where
  D: DocumentStore,
{
  Ok(Json(catalog.list_artists().await?))
}
