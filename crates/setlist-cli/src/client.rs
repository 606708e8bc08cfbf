//! Async HTTP client wrapping the setlist JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use setlist_core::{
  model::{Artist, Song, SongId, SongWithArtist},
  select::Algorithm,
};

/// Connection settings for the setlist API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the setlist JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewSong<'a> {
  title:       &'a str,
  artist_name: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Songs ─────────────────────────────────────────────────────────────────

  /// `GET /api/songs`
  pub async fn list_songs(&self) -> Result<Vec<Song>> {
    let resp = self
      .client
      .get(self.url("/songs"))
      .send()
      .await
      .context("GET /songs failed")?;
    let resp = check(resp, "GET /songs").await?;
    resp.json().await.context("deserialising songs")
  }

  /// `POST /api/songs`
  pub async fn add_song(&self, title: &str, artist_name: &str) -> Result<Song> {
    let resp = self
      .client
      .post(self.url("/songs"))
      .json(&NewSong { title, artist_name })
      .send()
      .await
      .context("POST /songs failed")?;
    let resp = check(resp, "POST /songs").await?;
    resp.json().await.context("deserialising new song")
  }

  /// `DELETE /api/songs/{id}`
  pub async fn delete_song(&self, id: SongId) -> Result<()> {
    let resp = self
      .client
      .delete(self.url(&format!("/songs/{id}")))
      .send()
      .await
      .with_context(|| format!("DELETE /songs/{id} failed"))?;
    check(resp, "DELETE /songs").await?;
    Ok(())
  }

  // ── Artists ───────────────────────────────────────────────────────────────

  /// `GET /api/artists`
  pub async fn list_artists(&self) -> Result<Vec<Artist>> {
    let resp = self
      .client
      .get(self.url("/artists"))
      .send()
      .await
      .context("GET /artists failed")?;
    let resp = check(resp, "GET /artists").await?;
    resp.json().await.context("deserialising artists")
  }

  // ── Picker ────────────────────────────────────────────────────────────────

  /// `GET /api/pick?algorithm=<name>`
  pub async fn pick(&self, algorithm: Algorithm) -> Result<SongWithArtist> {
    let resp = self
      .client
      .get(self.url("/pick"))
      .query(&[("algorithm", algorithm.as_str())])
      .send()
      .await
      .context("GET /pick failed")?;
    let resp = check(resp, "GET /pick").await?;
    resp.json().await.context("deserialising picked song")
  }
}

/// Pass successful responses through; turn anything else into an error
/// carrying the server's `{"error": ...}` message when there is one.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<ErrorBody>()
    .await
    .map(|b| b.error)
    .unwrap_or_else(|_| status.to_string());
  Err(anyhow!(describe(status, what, &message)))
}

fn describe(status: StatusCode, what: &str, message: &str) -> String {
  if status == StatusCode::TOO_MANY_REQUESTS {
    format!("server busy, try again ({message})")
  } else {
    format!("{what} → {}: {message}", status.as_u16())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig { base_url: base_url.into() }).unwrap()
  }

  #[test]
  fn url_joins_api_prefix() {
    assert_eq!(client("http://localhost:3000").url("/songs"), "http://localhost:3000/api/songs");
    assert_eq!(client("http://localhost:3000/").url("/pick"), "http://localhost:3000/api/pick");
  }

  #[test]
  fn busy_is_described_as_retryable() {
    let msg = describe(StatusCode::TOO_MANY_REQUESTS, "POST /songs", "catalog is busy");
    assert!(msg.starts_with("server busy"));

    let msg = describe(StatusCode::CONFLICT, "POST /songs", "already registered");
    assert_eq!(msg, "POST /songs → 409: already registered");
  }

  #[test]
  fn new_song_body_uses_camel_case() {
    let body = serde_json::to_value(NewSong { title: "Idol", artist_name: "YOASOBI" }).unwrap();
    assert_eq!(body, serde_json::json!({ "title": "Idol", "artistName": "YOASOBI" }));
  }
}
