use crossterm::event::KeyCode;

/// Tabs are expanded so column math matches what the terminal shows.
const TAB: &str = "    ";

/// Scroll commands routed to the focused pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

impl Navigation {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Self::LineUp),
            KeyCode::Down => Some(Self::LineDown),
            KeyCode::PageUp => Some(Self::PageUp),
            KeyCode::PageDown => Some(Self::PageDown),
            KeyCode::Home => Some(Self::Top),
            KeyCode::End => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Text lines plus a top-line offset.
///
/// The offset is kept within `0..=lines - viewport`.
#[derive(Debug, Clone, Default)]
pub struct PaneState {
    lines: Vec<String>,
    offset: usize,
    viewport: usize,
}

impl PaneState {
    /// Replaces the content. Escape sequences are stripped.
    pub fn set_content(&mut self, text: &str) {
        // Tabs go first: the stripper drops them as control bytes.
        let plain = strip_ansi_escapes::strip_str(text.replace('\t', TAB));
        self.lines = plain.lines().map(str::to_owned).collect();
        self.clamp();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_viewport(&mut self, height: usize) {
        self.viewport = height;
        self.clamp();
    }

    /// Lines currently inside the viewport.
    pub fn visible(&self) -> &[String] {
        let end = (self.offset + self.viewport).min(self.lines.len());
        &self.lines[self.offset.min(end)..end]
    }

    pub fn navigate(&mut self, nav: Navigation) {
        let page = self.viewport.max(1);
        self.offset = match nav {
            Navigation::LineUp => self.offset.saturating_sub(1),
            Navigation::LineDown => self.offset + 1,
            Navigation::PageUp => self.offset.saturating_sub(page),
            Navigation::PageDown => self.offset + page,
            Navigation::Top => 0,
            Navigation::Bottom => self.max_offset(),
        };
        self.clamp();
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport)
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}
