//! SQLite backend for the Setlist catalog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each collection is one row holding the
//! whole JSON document.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteDocumentStore;
