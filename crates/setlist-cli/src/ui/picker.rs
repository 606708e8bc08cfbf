//! Picker pane — the selected algorithm and the last pick.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use setlist_core::select::Algorithm;

use crate::app::App;

/// Render the picker into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Pick ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let algorithms: Vec<Span> = Algorithm::ALL
    .iter()
    .flat_map(|a| {
      let style = if *a == app.algorithm {
        Style::default().fg(Color::Black).bg(Color::Cyan)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      [Span::styled(format!(" {} ", a.label()), style), Span::raw(" ")]
    })
    .collect();

  let mut lines = vec![Line::from(algorithms), Line::from("")];
  match &app.picked {
    Some(song) => {
      lines.push(Line::from(Span::styled(
        song.song.title.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
      )));
      lines.push(Line::from(Span::styled(
        song.artist_name.clone(),
        Style::default().fg(Color::Gray),
      )));
    }
    None => lines.push(Line::from(Span::styled(
      "a: change algorithm  p: pick",
      Style::default().fg(Color::DarkGray),
    ))),
  }

  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
    area,
  );
}
