//! JSON REST API for the song catalog.
//!
//! Exposes an axum [`Router`] backed by a [`Catalog`] over any
//! [`DocumentStore`]. Transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", setlist_api::api_router(catalog.clone()))
//! ```

pub mod artists;
pub mod error;
pub mod extract;
pub mod pick;
pub mod songs;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get},
};
use setlist_core::{Catalog, document::DocumentStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `catalog`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<D>(catalog: Arc<Catalog<D>>) -> Router<()>
where
  D: DocumentStore + 'static,
{
  Router::new()
    .route("/songs", get(songs::list::<D>).post(songs::create::<D>))
    .route("/songs/{id}", delete(songs::delete_one::<D>))
    .route("/artists", get(artists::list::<D>))
    .route("/pick", get(pick::handler::<D>))
    .with_state(catalog)
}
