//! HTTP server for the song catalog.
//!
//! Wires a [`Catalog`] over the configured backend into the
//! [`setlist_api`] router, mounted under `/api`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use serde::Deserialize;
use setlist_core::{Catalog, document::DocumentStore};
use setlist_store_json::JsonDirStore;
use setlist_store_sqlite::SqliteDocumentStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Where the catalog documents live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// One pretty-printed JSON file per collection under `data_dir`.
  #[default]
  Json,
  /// A single SQLite database at `sqlite_path`.
  Sqlite,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `SETLIST_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub backend:     Backend,
  pub data_dir:    PathBuf,
  pub sqlite_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:        "127.0.0.1".to_string(),
      port:        3000,
      backend:     Backend::Json,
      data_dir:    PathBuf::from("db"),
      sqlite_path: PathBuf::from("setlist.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Open the configured backend and build the full application router.
pub async fn open_app(cfg: &ServerConfig) -> anyhow::Result<Router> {
  let api = match cfg.backend {
    Backend::Json => {
      let dir = expand_tilde(&cfg.data_dir);
      tracing::info!(dir = %dir.display(), "using JSON document store");
      catalog_router(JsonDirStore::new(dir))
    }
    Backend::Sqlite => {
      let path = expand_tilde(&cfg.sqlite_path);
      tracing::info!(path = %path.display(), "using SQLite document store");
      let store = SqliteDocumentStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      catalog_router(store)
    }
  };
  Ok(app(api))
}

fn catalog_router<D>(store: D) -> Router
where
  D: DocumentStore + 'static,
{
  setlist_api::api_router(Arc::new(Catalog::new(store)))
}

/// Mount `api` under `/api` and add request tracing.
pub fn app(api: Router) -> Router {
  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
