//! External interrupt (SIGINT) handling.
//!
//! In raw mode Ctrl+C arrives as a key event, so this only fires for signals
//! delivered from outside, e.g. `kill -INT`. The handler sets a flag that the
//! UI loop polls; it never prints or exits on its own.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Installs the SIGINT handler.
///
/// # Errors
/// Returns an error if a handler is already installed or registration fails.
pub fn init() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(trigger)
}

/// Marks the process as interrupted.
pub fn trigger() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Checks if an interrupt has been requested.
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Resets the interrupt flag.
pub fn reset() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_and_reset() {
        reset();
        assert!(!is_interrupted());
        trigger();
        assert!(is_interrupted());
        reset();
        assert!(!is_interrupted());
    }
}
