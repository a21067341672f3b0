//! Session state owned by the UI loop.
//!
//! ```text
//! AppState
//! ├── query: TextBuffer      (edited by the reducer only)
//! ├── status: SessionStatus  (Running(focus) until a terminal status)
//! ├── input: PaneState       (latest data snapshot)
//! ├── result: PaneState      (latest published preview)
//! └── data / ingest          (snapshot the panes and previews are built from)
//! ```

use anyhow::{Result, bail};
use bytes::Bytes;
use preq_core::engine::Generation;

use crate::features::pane::PaneState;
use crate::features::query::TextBuffer;

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Result,
}

impl Focus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Input => Self::Result,
            Self::Result => Self::Input,
        }
    }
}

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Committed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Running(Focus),
    Ended(ExitOutcome),
    /// Reading stdin failed; the session cannot continue.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    Reading,
    Finished { total: usize },
}

/// What the caller needs once the session is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed { query: String, data: Bytes },
    Cancelled,
}

#[derive(Debug)]
pub struct AppState {
    pub query: TextBuffer,
    status: SessionStatus,
    pub input: PaneState,
    pub result: PaneState,
    /// Latest data snapshot seen by the UI.
    pub data: Bytes,
    pub ingest: IngestStatus,
    /// Whether the displayed result is a tool diagnostic.
    pub preview_failed: bool,
    /// Generation of the displayed result.
    pub last_preview: Option<Generation>,
    /// Generation of the newest preview request.
    pub requested: Option<Generation>,
}

impl AppState {
    pub fn new(query: &str) -> Self {
        Self {
            query: TextBuffer::new(query),
            status: SessionStatus::Running(Focus::default()),
            input: PaneState::default(),
            result: PaneState::default(),
            data: Bytes::new(),
            ingest: IngestStatus::Reading,
            preview_failed: false,
            last_preview: None,
            requested: None,
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, SessionStatus::Running(_))
    }

    /// Focused pane, or `None` once the session has ended.
    pub fn focus(&self) -> Option<Focus> {
        match self.status {
            SessionStatus::Running(focus) => Some(focus),
            _ => None,
        }
    }

    pub fn toggle_focus(&mut self) {
        if let SessionStatus::Running(focus) = self.status {
            self.status = SessionStatus::Running(focus.toggled());
        }
    }

    pub fn focused_pane_mut(&mut self) -> Option<&mut PaneState> {
        match self.focus()? {
            Focus::Input => Some(&mut self.input),
            Focus::Result => Some(&mut self.result),
        }
    }

    /// Whether a newer preview than the displayed one has been requested.
    pub fn is_stale(&self) -> bool {
        self.requested > self.last_preview
    }

    /// Result of a finished session.
    ///
    /// # Errors
    /// Returns an error when ingestion failed or the session is still running.
    pub fn outcome(&self) -> Result<Outcome> {
        match &self.status {
            SessionStatus::Ended(ExitOutcome::Committed) => Ok(Outcome::Committed {
                query: self.query.text().to_owned(),
                data: self.data.clone(),
            }),
            SessionStatus::Ended(ExitOutcome::Cancelled) => Ok(Outcome::Cancelled),
            SessionStatus::Failed(reason) => bail!("Failed to read stdin: {reason}"),
            SessionStatus::Running(_) => bail!("Session stopped while still running"),
        }
    }

    /// Moves to a terminal status. Only the first call has any effect.
    pub fn finish(&mut self, status: SessionStatus) -> bool {
        if !self.is_running() || matches!(status, SessionStatus::Running(_)) {
            return false;
        }
        self.status = status;
        true
    }
}
