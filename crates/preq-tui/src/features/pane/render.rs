use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::PaneState;

/// Draws the visible lines of `pane` inside a titled border.
pub fn render_pane(pane: &PaneState, title: Line<'_>, focused: bool, frame: &mut Frame, area: Rect) {
    let border = if focused {
        Color::White
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);

    let lines: Vec<Line> = pane
        .visible()
        .iter()
        .map(|line| Line::raw(line.as_str()))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
