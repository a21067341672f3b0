//! Pure view functions.
//!
//! Takes `&AppState`, draws to a ratatui `Frame`, never mutates state.
//!
//! ```text
//! query .items[0]
//! ┌ input (2.1 KiB) ──────┐┌ result ───────────────┐
//! │ ...                   ││ ...                   │
//! └───────────────────────┘└───────────────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::features::pane::render_pane;
use crate::features::query::render_query;
use crate::state::{AppState, Focus, IngestStatus};
use crate::update::QUERY_HEIGHT;

pub fn render(app: &AppState, frame: &mut Frame) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(QUERY_HEIGHT), Constraint::Min(0)])
        .split(frame.area());

    render_query(&app.query, app.is_running(), frame, rows[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let focus = app.focus();
    render_pane(
        &app.input,
        input_title(app),
        focus == Some(Focus::Input),
        frame,
        panes[0],
    );
    render_pane(
        &app.result,
        result_title(app),
        focus == Some(Focus::Result),
        frame,
        panes[1],
    );
}

fn input_title(app: &AppState) -> Line<'static> {
    let size = format_size(app.data.len());
    let text = match app.ingest {
        IngestStatus::Reading => format!(" input (reading… {size}) "),
        IngestStatus::Finished { .. } => format!(" input ({size}) "),
    };
    Line::from(text)
}

fn result_title(app: &AppState) -> Line<'static> {
    let mut spans = vec![Span::raw(" result ")];
    if app.preview_failed {
        spans.push(Span::styled(
            "error ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    if app.is_stale() {
        spans.push(Span::styled("… ", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;

    let n = bytes as f64;
    if n >= MIB {
        format!("{:.1} MiB", n / MIB)
    } else if n >= KIB {
        format!("{:.1} KiB", n / KIB)
    } else {
        format!("{bytes} B")
    }
}
