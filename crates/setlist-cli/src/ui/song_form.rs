//! Add-song form pane, with autocomplete under the focused field.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, FormField, Mode};

/// Render the form into `area`, or a hint when it is closed.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Add song ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let Mode::AddSong(form) = &app.mode else {
    f.render_widget(
      Paragraph::new("Press n to add a song.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  };

  let suggestions = form.suggestions(&app.snapshot);
  let mut lines: Vec<Line> = Vec::new();

  for (field, label, value) in [
    (FormField::Title, "Title ", &form.title),
    (FormField::Artist, "Artist", &form.artist),
  ] {
    let focused = form.focus == field;
    let label_style = if focused {
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let cursor = if focused { "_" } else { "" };
    lines.push(Line::from(vec![
      Span::styled(format!("{label}  "), label_style),
      Span::raw(format!("{value}{cursor}")),
    ]));

    if focused {
      for (i, s) in suggestions.iter().enumerate() {
        let style = if i == 0 {
          Style::default().fg(Color::Yellow)
        } else {
          Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!("        {s}"), style)));
      }
    }
  }

  f.render_widget(Paragraph::new(lines).block(block), area);
}
