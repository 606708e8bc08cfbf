//! Song table pane — left panel.

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::app::{App, Mode};

/// Render the song table into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = app.rows();
  let total = app.snapshot.songs.len();

  let title = if app.view.query.is_empty() {
    format!(" Songs ({total}) · {} ", app.order_label())
  } else {
    format!(" Songs ({}/{total}) · {} ", rows.len(), app.order_label())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Search bar along the bottom edge while searching or filtered.
  let searching = app.mode == Mode::Search;
  if (searching || !app.view.query.is_empty()) && inner_area.height > 2 {
    let search_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let text = if searching {
      format!("/{}_", app.view.query)
    } else {
      format!("/{}", app.view.query)
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      search_area,
    );
  }

  if rows.is_empty() {
    let hint = if total == 0 { "No songs yet. Press n to add one." } else { "No matches." };
    f.render_widget(
      Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let header = Row::new(["Title", "Artist", "Registered"])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let body: Vec<Row> = rows
    .iter()
    .map(|r| {
      let registered = r
        .song
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string();
      Row::new([
        Cell::from(r.song.title.clone()),
        Cell::from(r.artist_name.clone()),
        Cell::from(registered).style(Style::default().fg(Color::DarkGray)),
      ])
    })
    .collect();

  let mut state = TableState::default();
  state.select(Some(app.cursor));

  f.render_stateful_widget(
    Table::new(
      body,
      [
        Constraint::Percentage(45),
        Constraint::Percentage(35),
        Constraint::Length(16),
      ],
    )
    .header(header)
    .row_highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
