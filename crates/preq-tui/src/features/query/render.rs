//! Query line view.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthChar;

use super::TextBuffer;

const LABEL: &str = "query ";

/// Draws the label, the visible part of the query, and places the cursor.
pub fn render_query(buffer: &TextBuffer, running: bool, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LABEL.len() as u16), Constraint::Min(1)])
        .split(area);

    let label = Paragraph::new(Span::styled(
        LABEL,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(label, chunks[0]);

    let input_area = chunks[1];
    let (visible, cursor_x) =
        visible_window(buffer.text(), buffer.cursor(), input_area.width as usize);
    frame.render_widget(Paragraph::new(visible), input_area);

    if running {
        frame.set_cursor_position(Position::new(
            input_area.x + cursor_x as u16,
            input_area.y,
        ));
    }
}

/// Returns the part of `text` that fits in `width` cells with the cursor kept
/// on screen, plus the cursor's cell offset within that part.
fn visible_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }

    let chars: Vec<char> = text.chars().collect();
    let widths: Vec<usize> = chars.iter().map(|ch| ch.width().unwrap_or(0)).collect();
    let cursor = cursor.min(chars.len());
    let cursor_x: usize = widths[..cursor].iter().sum();

    // Scroll right until the cursor cell itself fits.
    let mut start = 0;
    let mut skipped = 0;
    while cursor_x - skipped >= width {
        skipped += widths[start];
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for (ch, w) in chars[start..].iter().zip(&widths[start..]) {
        if used + w > width {
            break;
        }
        visible.push(*ch);
        used += w;
    }

    (visible, cursor_x - skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_query_is_shown_whole() {
        assert_eq!(visible_window(".a.b", 4, 20), (".a.b".to_string(), 4));
        assert_eq!(visible_window(".a.b", 1, 20), (".a.b".to_string(), 1));
    }

    #[test]
    fn test_long_query_scrolls_to_keep_cursor_visible() {
        let text = "0123456789";

        let (visible, x) = visible_window(text, 10, 5);

        assert_eq!(visible, "6789");
        assert_eq!(x, 4);
    }

    #[test]
    fn test_cursor_at_head_shows_prefix() {
        assert_eq!(visible_window("0123456789", 0, 5), ("01234".to_string(), 0));
    }

    #[test]
    fn test_wide_chars_count_two_cells() {
        let (visible, x) = visible_window("ああああ", 4, 5);

        assert_eq!(visible, "ああ");
        assert_eq!(x, 4);
    }

    #[test]
    fn test_zero_width_area() {
        assert_eq!(visible_window(".a", 2, 0), (String::new(), 0));
    }
}
