//! Single-line text buffer for the query.
//!
//! Supports the subset of editing operations bound in the query line.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Cursor movement commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Forward,
    Back,
    Head,
    End,
}

/// Query text with a cursor measured in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    /// Creates a buffer holding `text` with the cursor at the end.
    pub fn new(text: &str) -> Self {
        let mut buf = Self::default();
        buf.insert_str(text);
        buf
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Inserts text at the cursor. Line breaks become spaces.
    pub fn insert_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let flattened: String = text
            .chars()
            .filter(|&ch| ch != '\r')
            .map(|ch| if ch == '\n' { ' ' } else { ch })
            .collect();
        let byte_idx = char_to_byte_index(&self.text, self.cursor);
        self.text.insert_str(byte_idx, &flattened);
        self.cursor += flattened.chars().count();
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf));
    }

    /// Deletes the character at the cursor (Delete key semantics).
    pub fn delete_next_char(&mut self) -> bool {
        if self.cursor >= char_len(&self.text) {
            return false;
        }
        self.delete_range(self.cursor, self.cursor + 1);
        true
    }

    /// Deletes the character before the cursor (Backspace semantics).
    pub fn delete_prev_char(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.cursor - 1;
        self.delete_range(start, self.cursor);
        self.cursor = start;
        true
    }

    /// Deletes from the cursor to the end of the line.
    pub fn delete_line_by_end(&mut self) -> bool {
        let len = char_len(&self.text);
        if self.cursor >= len {
            return false;
        }
        self.delete_range(self.cursor, len);
        true
    }

    /// Deletes from the start of the line to the cursor.
    pub fn delete_line_by_head(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.delete_range(0, self.cursor);
        self.cursor = 0;
        true
    }

    /// Deletes the word immediately to the left of the cursor.
    pub fn delete_word_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let start = scan_left_segment(&chars, self.cursor.min(chars.len()));
        self.delete_range(start, self.cursor);
        self.cursor = start;
        true
    }

    pub fn move_cursor(&mut self, movement: CursorMove) {
        let len = char_len(&self.text);
        self.cursor = match movement {
            CursorMove::Forward => (self.cursor + 1).min(len),
            CursorMove::Back => self.cursor.saturating_sub(1),
            CursorMove::Head => 0,
            CursorMove::End => len,
        };
    }

    /// Handles an editing key. Returns `true` when the text changed.
    pub fn input(&mut self, key: KeyEvent) -> bool {
        if matches!(key.kind, KeyEventKind::Release) {
            return false;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => {
                self.move_cursor(CursorMove::Head);
                false
            }
            KeyCode::Char('e') if ctrl => {
                self.move_cursor(CursorMove::End);
                false
            }
            KeyCode::Char('k') if ctrl => self.delete_line_by_end(),
            KeyCode::Char('u') if ctrl => self.delete_line_by_head(),
            KeyCode::Char('w') if ctrl => self.delete_word_left(),
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(ch);
                true
            }
            KeyCode::Backspace if key.modifiers.contains(KeyModifiers::ALT) => {
                self.delete_word_left()
            }
            KeyCode::Backspace => self.delete_prev_char(),
            KeyCode::Delete => self.delete_next_char(),
            KeyCode::Left => {
                self.move_cursor(CursorMove::Back);
                false
            }
            KeyCode::Right => {
                self.move_cursor(CursorMove::Forward);
                false
            }
            _ => false,
        }
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        let start = char_to_byte_index(&self.text, start);
        let end = char_to_byte_index(&self.text, end);
        self.text.replace_range(start..end, "");
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Returns true if the character is a word character (alphanumeric or underscore).
/// Punctuation and other symbols are treated as word boundaries.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CharClass {
    Whitespace,
    Word,
    Punct,
}

fn char_class(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if is_word_char(c) {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

fn scan_left_segment(chars: &[char], mut idx: usize) -> usize {
    if idx == 0 {
        return 0;
    }
    let class = char_class(chars[idx - 1]);
    while idx > 0 && char_class(chars[idx - 1]) == class {
        idx -= 1;
    }
    idx
}

fn char_to_byte_index(line: &str, col: usize) -> usize {
    if col == 0 {
        return 0;
    }
    line.char_indices()
        .nth(col)
        .map_or(line.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_new_places_cursor_at_end() {
        let buf = TextBuffer::new(".items");
        assert_eq!(buf.text(), ".items");
        assert_eq!(buf.cursor(), 6);
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut buf = TextBuffer::new(".b");
        buf.move_cursor(CursorMove::Back);

        assert!(buf.input(key(KeyCode::Char('a'))));
        assert!(buf.input(key(KeyCode::Char('.'))));

        assert_eq!(buf.text(), ".a.b");
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_cursor_moves_do_not_report_changes() {
        let mut buf = TextBuffer::new(".a");

        assert!(!buf.input(key(KeyCode::Left)));
        assert!(!buf.input(key(KeyCode::Right)));
        assert!(!buf.input(ctrl('a')));
        assert_eq!(buf.cursor(), 0);
        assert!(!buf.input(ctrl('e')));
        assert_eq!(buf.cursor(), 2);
        assert_eq!(buf.text(), ".a");
    }

    #[test]
    fn test_backspace_and_delete_at_edges() {
        let mut buf = TextBuffer::new("ab");

        assert!(!buf.input(key(KeyCode::Delete)));
        assert!(buf.input(key(KeyCode::Backspace)));
        assert_eq!(buf.text(), "a");

        buf.move_cursor(CursorMove::Head);
        assert!(!buf.input(key(KeyCode::Backspace)));
        assert!(buf.input(key(KeyCode::Delete)));
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut buf = TextBuffer::new(".\"こんにちは\"");
        buf.move_cursor(CursorMove::Back);
        buf.delete_prev_char();

        assert_eq!(buf.text(), ".\"こんにち\"");
        assert_eq!(buf.cursor(), 6);
    }

    #[test]
    fn test_kill_to_end_and_to_head() {
        let mut buf = TextBuffer::new(".a | .b");
        buf.move_cursor(CursorMove::Head);
        for _ in 0..3 {
            buf.move_cursor(CursorMove::Forward);
        }

        assert!(buf.input(ctrl('k')));
        assert_eq!(buf.text(), ".a ");

        assert!(buf.input(ctrl('u')));
        assert_eq!(buf.text(), "");
        assert_eq!(buf.cursor(), 0);
        assert!(!buf.input(ctrl('u')));
    }

    #[test]
    fn test_delete_word_left_query_segments() {
        let mut buf = TextBuffer::new(".spec.containers[0].image");

        buf.delete_word_left(); // "image"
        assert_eq!(buf.text(), ".spec.containers[0].");

        buf.delete_word_left(); // "]."
        assert_eq!(buf.text(), ".spec.containers[0");

        buf.delete_word_left(); // "0"
        assert_eq!(buf.text(), ".spec.containers[");

        buf.delete_word_left(); // "["
        assert_eq!(buf.text(), ".spec.containers");
    }

    #[test]
    fn test_delete_word_left_with_whitespace() {
        let mut buf = TextBuffer::new("keys | length");

        assert!(buf.input(ctrl('w')));
        assert_eq!(buf.text(), "keys | ");

        buf.delete_word_left(); // " "
        assert_eq!(buf.text(), "keys |");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut buf = TextBuffer::default();
        buf.insert_str(".a\r\n| .b\n");

        assert_eq!(buf.text(), ".a | .b ");
        assert_eq!(buf.cursor(), 8);
    }

    #[test]
    fn test_control_chars_are_not_inserted() {
        let mut buf = TextBuffer::new(".");

        assert!(!buf.input(ctrl('x')));
        assert!(!buf.input(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT)));
        assert_eq!(buf.text(), ".");
    }
}
