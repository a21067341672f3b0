//! Terminal lifecycle management.
//!
//! The UI draws on the controlling terminal rather than stdout, which stays
//! free for the committed result. Keys are read by crossterm, which opens its
//! own input handle when stdin is a pipe. Terminal state is restored on:
//! - Normal exit (via `TuiRuntime`'s Drop)
//! - Panic

use std::fs::{File, OpenOptions};
use std::io;
use std::panic;

use anyhow::{Context, Result};
use crossterm::cursor::Show;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

#[cfg(unix)]
const TTY_PATH: &str = "/dev/tty";
#[cfg(windows)]
const TTY_PATH: &str = "CONOUT$";

pub type TtyTerminal = Terminal<CrosstermBackend<File>>;

/// Output side of the controlling terminal.
fn open_tty() -> io::Result<File> {
    OpenOptions::new().write(true).open(TTY_PATH)
}

/// Enters raw mode and the alternate screen on the controlling terminal.
///
/// Call `install_panic_hook()` before this to ensure terminal restore on panic.
///
/// # Errors
/// Fails when there is no controlling terminal.
pub fn setup_terminal() -> Result<TtyTerminal> {
    let mut tty = open_tty().context("Failed to open the controlling terminal")?;
    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(tty, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(tty)).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restores terminal state. Safe to call more than once.
///
/// # Errors
/// Returns an error if the terminal cannot be reopened or reset.
pub fn restore_terminal() -> Result<()> {
    let mut tty = open_tty().context("Failed to open the controlling terminal")?;
    // Paste mode must be off before leaving raw mode.
    let _ = execute!(tty, DisableBracketedPaste);
    execute!(tty, LeaveAlternateScreen, Show).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    Ok(())
}

/// Installs a panic hook that restores the terminal before printing the panic.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
