//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use setlist_core::{
  model::{Snapshot, SongId, SongWithArtist},
  query::{self, ListOrder, SongListView, SortOrder},
  select::Algorithm,
};

use crate::client::ApiClient;

// ─── Modes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  /// Browsing the song table.
  Browse,
  /// Typing into the search box.
  Search,
  /// Waiting for `y`/`n` before deleting a song.
  ConfirmDelete { id: SongId, title: String },
  /// Filling in the add-song form.
  AddSong(SongForm),
}

// ─── Add-song form ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
  #[default]
  Title,
  Artist,
}

/// The two text inputs of the add-song form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongForm {
  pub title:  String,
  pub artist: String,
  pub focus:  FormField,
}

impl SongForm {
  pub fn focused_mut(&mut self) -> &mut String {
    match self.focus {
      FormField::Title => &mut self.title,
      FormField::Artist => &mut self.artist,
    }
  }

  fn focused(&self) -> &str {
    match self.focus {
      FormField::Title => &self.title,
      FormField::Artist => &self.artist,
    }
  }

  /// Autocomplete candidates for the focused field.
  pub fn suggestions(&self, snapshot: &Snapshot) -> Vec<String> {
    match self.focus {
      FormField::Title => query::suggest_titles(&snapshot.songs, &self.title),
      FormField::Artist => query::suggest_artists(&snapshot.artists, &self.artist),
    }
  }

  /// Tab: take the first suggestion if it would change the field, otherwise
  /// move to the other field.
  pub fn tab(&mut self, snapshot: &Snapshot) {
    let first = self.suggestions(snapshot).into_iter().next();
    match first {
      Some(s) if s != self.focused() => *self.focused_mut() = s,
      _ => {
        self.focus = match self.focus {
          FormField::Title => FormField::Artist,
          FormField::Artist => FormField::Title,
        }
      }
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current keyboard mode.
  pub mode: Mode,

  /// Songs and artists as last fetched from the server.
  pub snapshot: Snapshot,

  /// Search text and ordering of the song table.
  pub view: SongListView,

  /// Cursor position within the displayed rows.
  pub cursor: usize,

  /// Algorithm used by `p`.
  pub algorithm: Algorithm,

  /// Result of the last pick.
  pub picked: Option<SongWithArtist>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      mode: Mode::Browse,
      snapshot: Snapshot::default(),
      view: SongListView::new(),
      cursor: 0,
      algorithm: Algorithm::default(),
      picked: None,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch songs and artists from the API.
  pub async fn reload(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading songs…".into();
    let fetched = tokio::try_join!(self.client.list_songs(), self.client.list_artists());
    match fetched {
      Ok((songs, artists)) => {
        self.snapshot = Snapshot::new(songs, artists);
        self.clamp_cursor();
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  // ── Rows ──────────────────────────────────────────────────────────────────

  /// The rows currently shown in the table.
  pub fn rows(&self) -> Vec<SongWithArtist> { self.view.rows(&self.snapshot) }

  pub fn cursor_row(&self) -> Option<SongWithArtist> {
    self.rows().into_iter().nth(self.cursor)
  }

  /// Short description of the current row order.
  pub fn order_label(&self) -> &'static str {
    match self.view.order() {
      ListOrder::Date(SortOrder::Descending) => "newest first",
      ListOrder::Date(SortOrder::Ascending) => "oldest first",
      ListOrder::Shuffled(_) => "shuffled",
    }
  }

  fn clamp_cursor(&mut self) {
    let len = self.rows().len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.mode {
      Mode::Browse => self.handle_browse_key(key).await,
      Mode::Search => {
        self.handle_search_key(key);
        Ok(true)
      }
      Mode::ConfirmDelete { .. } => {
        self.handle_confirm_key(key).await;
        Ok(true)
      }
      Mode::AddSong(_) => {
        self.handle_form_key(key).await;
        Ok(true)
      }
    }
  }

  async fn handle_browse_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.rows().len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      // Table
      KeyCode::Char('/') => {
        self.mode = Mode::Search;
      }
      KeyCode::Char('d') => {
        self.view.toggle_date_sort();
        self.cursor = 0;
      }
      KeyCode::Char('s') => {
        self.view.shuffle(&self.snapshot, &mut rand::thread_rng());
        self.cursor = 0;
      }
      KeyCode::Char('x') => {
        if let Some(row) = self.cursor_row() {
          self.mode = Mode::ConfirmDelete { id: row.song.id, title: row.song.title };
        }
      }
      KeyCode::Char('n') => {
        self.mode = Mode::AddSong(SongForm::default());
      }
      KeyCode::Char('r') => {
        // The error is already in the status bar.
        let _ = self.reload().await;
      }

      // Picker
      KeyCode::Char('a') => {
        self.algorithm = self.algorithm.cycle();
        self.status_msg = format!("Algorithm: {}", self.algorithm.label());
      }
      KeyCode::Char('p') => self.pick().await,

      _ => {}
    }
    Ok(true)
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.view.query.clear();
        self.mode = Mode::Browse;
      }
      KeyCode::Enter => self.mode = Mode::Browse,
      KeyCode::Backspace => {
        self.view.query.pop();
      }
      KeyCode::Char(c) => self.view.query.push(c),
      _ => return,
    }
    self.cursor = 0;
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent) {
    let Mode::ConfirmDelete { id, title } = &self.mode else {
      return;
    };
    let (id, title) = (*id, title.clone());

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => {
        self.mode = Mode::Browse;
        match self.client.delete_song(id).await {
          Ok(()) => {
            if self.reload().await.is_ok() {
              self.status_msg = format!("Deleted {title:?}");
            }
          }
          Err(e) => self.status_msg = format!("Error: {e}"),
        }
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
        self.mode = Mode::Browse;
      }
      _ => {}
    }
  }

  async fn handle_form_key(&mut self, key: KeyEvent) {
    let Mode::AddSong(form) = &mut self.mode else {
      return;
    };

    match key.code {
      KeyCode::Esc => self.mode = Mode::Browse,
      KeyCode::Tab => form.tab(&self.snapshot),
      KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        form.focus = match form.focus {
          FormField::Title => FormField::Artist,
          FormField::Artist => FormField::Title,
        };
      }
      KeyCode::Backspace => {
        form.focused_mut().pop();
      }
      KeyCode::Char(c) => form.focused_mut().push(c),
      KeyCode::Enter => {
        let (title, artist) = (form.title.clone(), form.artist.clone());
        self.submit(&title, &artist).await;
      }
      _ => {}
    }
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  /// Send the add-song form. The form stays open on failure.
  async fn submit(&mut self, title: &str, artist: &str) {
    if title.trim().is_empty() || artist.trim().is_empty() {
      self.status_msg = "Enter both a title and an artist".into();
      return;
    }

    match self.client.add_song(title, artist).await {
      Ok(song) => {
        self.mode = Mode::Browse;
        if self.reload().await.is_ok() {
          self.status_msg = format!("Added {:?} (#{})", song.title, song.id);
        }
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  async fn pick(&mut self) {
    match self.client.pick(self.algorithm).await {
      Ok(song) => {
        self.status_msg = format!("Picked {:?} by {}", song.song.title, song.artist_name);
        self.picked = Some(song);
      }
      Err(e) => {
        self.picked = None;
        self.status_msg = format!("Error: {e}");
      }
    }
  }
}
