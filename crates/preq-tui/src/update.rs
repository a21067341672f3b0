//! Session controller (reducer).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects. Once the session reaches a terminal
//! status every event is ignored.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::pane::Navigation;
use crate::state::{AppState, ExitOutcome, IngestStatus, SessionStatus};

/// Rows taken by the query line.
pub const QUERY_HEIGHT: u16 = 1;

/// Rows a pane loses to its top and bottom border.
const PANE_CHROME: u16 = 2;

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    if !app.is_running() {
        return vec![];
    }

    match event {
        UiEvent::Frame { height, .. } => {
            handle_frame(app, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::DataAppended { snapshot } => {
            app.data = snapshot;
            app.input.set_content(&String::from_utf8_lossy(&app.data));
            vec![evaluate(app)]
        }
        UiEvent::IngestFinished { total } => {
            app.ingest = IngestStatus::Finished { total };
            vec![]
        }
        UiEvent::IngestFailed(reason) => {
            app.finish(SessionStatus::Failed(reason));
            vec![UiEffect::Quit]
        }
        UiEvent::Preview(preview) => {
            app.result.set_content(&preview.text);
            app.preview_failed = preview.failed;
            app.last_preview = Some(preview.generation);
            vec![]
        }
        UiEvent::Interrupted => end(app, ExitOutcome::Cancelled),
    }
}

/// Effect that previews the current query against the current data.
pub fn evaluate(app: &AppState) -> UiEffect {
    UiEffect::Evaluate {
        query: app.query.text().to_owned(),
        data: app.data.clone(),
    }
}

fn handle_frame(app: &mut AppState, height: u16) {
    let viewport = height.saturating_sub(QUERY_HEIGHT + PANE_CHROME) as usize;
    app.input.set_viewport(viewport);
    app.result.set_viewport(viewport);
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => {
            let before = app.query.text().len();
            app.query.insert_str(&text);
            if app.query.text().len() == before {
                vec![]
            } else {
                vec![evaluate(app)]
            }
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => end(app, ExitOutcome::Cancelled),
        KeyCode::Char('c' | 'd') if ctrl => end(app, ExitOutcome::Cancelled),
        KeyCode::Enter => end(app, ExitOutcome::Committed),
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_focus();
            vec![]
        }
        code => {
            if let Some(nav) = Navigation::from_key(code) {
                if let Some(pane) = app.focused_pane_mut() {
                    pane.navigate(nav);
                }
                vec![]
            } else if app.query.input(key) {
                vec![evaluate(app)]
            } else {
                vec![]
            }
        }
    }
}

fn end(app: &mut AppState, outcome: ExitOutcome) -> Vec<UiEffect> {
    app.finish(SessionStatus::Ended(outcome));
    vec![UiEffect::Quit]
}
