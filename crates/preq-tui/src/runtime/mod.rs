//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the boundary where side effects happen. The reducer stays pure and
//! produces effects; this module executes them.
//!
//! Each iteration collects events from every source:
//! - a `Frame` event when the terminal size changed,
//! - external SIGINT,
//! - ingestion progress, with all appends since the last frame folded into
//!   one `DataAppended` snapshot,
//! - preview completions, filtered through [`Engine::complete`],
//! - terminal input, polled for up to one frame.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use preq_core::engine::{Completion, Engine};
use preq_core::ingest::{DataBuffer, IngestEvent};
use preq_core::interrupt;
use ratatui::layout::Size;
use tokio::sync::mpsc;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, IngestStatus, Outcome};
use crate::terminal::TtyTerminal;
use crate::{Session, render, terminal, update};

/// Poll interval while a preview runs, input streams in, or the user types.
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll interval when nothing is happening.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen session runtime.
///
/// Terminal state is restored on drop and on panic.
pub struct TuiRuntime {
    terminal: TtyTerminal,
    pub state: AppState,
    engine: Engine,
    data: DataBuffer,
    ingest_rx: mpsc::UnboundedReceiver<IngestEvent>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    last_size: Option<Size>,
    last_terminal_event: Instant,
    should_quit: bool,
}

impl TuiRuntime {
    pub fn new(session: Session) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        interrupt::reset();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        Ok(Self {
            terminal,
            state: AppState::new(&session.query),
            engine: session.engine,
            data: session.data,
            ingest_rx: session.ingest,
            completions_rx: session.completions,
            last_size: None,
            last_terminal_event: Instant::now(),
            should_quit: false,
        })
    }

    /// Runs the event loop until the session reaches a terminal status.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(query = %self.state.query.text(), "session started");

        // Show the initial query right away, even before any input arrives.
        let initial = update::evaluate(&self.state);
        self.execute_effect(initial);

        let mut dirty = true;
        while !self.should_quit {
            let events = self.collect_events()?;
            dirty |= !events.is_empty();

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty && !self.should_quit {
                self.terminal
                    .draw(|frame| render::render(&self.state, frame))
                    .context("Failed to draw")?;
                dirty = false;
            }
        }

        tracing::info!(status = ?self.state.status(), "session ended");
        Ok(())
    }

    /// Result of a finished session.
    ///
    /// # Errors
    /// Returns an error when ingestion failed or the loop ended early.
    pub fn outcome(&self) -> Result<Outcome> {
        self.state.outcome()
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let size = self.terminal.size().context("Failed to query terminal size")?;
        if self.last_size != Some(size) {
            self.last_size = Some(size);
            events.push(UiEvent::Frame {
                width: size.width,
                height: size.height,
            });
        }

        if interrupt::is_interrupted() {
            interrupt::reset();
            events.push(UiEvent::Interrupted);
        }

        self.collect_ingest_events(&mut events);
        self.collect_completions(&mut events);

        // Don't delay rendering when there is already something to show.
        let poll_duration = if !events.is_empty() {
            Duration::ZERO
        } else if self.needs_fast_poll() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        Ok(events)
    }

    fn needs_fast_poll(&self) -> bool {
        self.engine.is_busy()
            || self.state.ingest == IngestStatus::Reading
            || self.last_terminal_event.elapsed() < IDLE_POLL_DURATION
    }

    /// Drains ingestion progress. Appends are folded into a single snapshot
    /// placed before any end-of-stream event.
    fn collect_ingest_events(&mut self, events: &mut Vec<UiEvent>) {
        let mut appended = false;
        while let Ok(ev) = self.ingest_rx.try_recv() {
            match ev {
                IngestEvent::Appended { .. } => appended = true,
                IngestEvent::Finished { total } => {
                    self.flush_appended(&mut appended, events);
                    events.push(UiEvent::IngestFinished { total });
                }
                IngestEvent::Failed(reason) => {
                    self.flush_appended(&mut appended, events);
                    events.push(UiEvent::IngestFailed(reason));
                }
            }
        }
        self.flush_appended(&mut appended, events);
    }

    fn flush_appended(&self, appended: &mut bool, events: &mut Vec<UiEvent>) {
        if std::mem::take(appended) {
            events.push(UiEvent::DataAppended {
                snapshot: self.data.snapshot(),
            });
        }
    }

    fn collect_completions(&mut self, events: &mut Vec<UiEvent>) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            if let Some(preview) = self.engine.complete(completion) {
                events.push(UiEvent::Preview(preview));
            }
        }
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Evaluate { query, data } => {
                self.state.requested = Some(self.engine.trigger(&query, data));
            }
            UiEffect::Quit => {
                self.engine.shutdown();
                self.should_quit = true;
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.engine.shutdown();
        let _ = terminal::restore_terminal();
    }
}
