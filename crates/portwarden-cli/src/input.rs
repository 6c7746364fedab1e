//! Keyboard-driven shutdown watcher.
//!
//! Polls terminal events on its own thread and sets the shared
//! cancellation flag on q, Esc, or a Ctrl-C key event. The thread exits
//! once cancellation is observed, so the scheduler can always join it.

use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use portwarden_common::constants::SHUTDOWN_POLL_MS;
use portwarden_engine::CancelFlag;

/// Spawns the watcher thread. The returned handle should be attached to
/// the scheduler so it is joined on shutdown.
pub fn spawn_watcher(cancel: CancelFlag) -> JoinHandle<()> {
    std::thread::spawn(move || watch_keys(&cancel))
}

fn watch_keys(cancel: &CancelFlag) {
    let slice = Duration::from_millis(SHUTDOWN_POLL_MS);
    while !cancel.is_cancelled() {
        match crossterm::event::poll(slice) {
            Ok(true) => match crossterm::event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if is_quit_key(key.code, key.modifiers) {
                        tracing::debug!("shutdown keystroke received");
                        cancel.cancel();
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "terminal event read failed");
                    std::thread::sleep(slice);
                }
            },
            Ok(false) => {}
            Err(e) => {
                // No usable terminal; keep polling the flag so the thread
                // still exits on Ctrl-C via the signal handler.
                tracing::debug!(error = %e, "terminal event poll failed");
                std::thread::sleep(slice);
            }
        }
    }
}

const fn is_quit_key(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => true,
        KeyCode::Char('c' | 'C') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
