//! Terminal-session capability contract.

use std::path::Path;

use crate::terminal::errors::TerminalError;
use crate::terminal::types::{SessionPair, SessionVariant};

/// Creates, queries, focuses, and closes terminal windows.
///
/// One production implementation ([`crate::terminal::tmux::TmuxClient`])
/// drives tmux; one scripted test double lives behind `cfg(test)`.
pub trait TerminalSessions {
    /// Whether the multiplexer session hosting arbor windows is running.
    fn is_running(&self) -> bool;

    /// Start the hosting session if it is not already running.
    fn ensure_running(&self) -> Result<(), TerminalError>;

    /// Create a window pair for the worktree at `path`.
    ///
    /// The primary window runs the variant's assistant command, the
    /// secondary a plain shell, both with `path` as working directory.
    fn create_session(
        &self,
        path: &Path,
        name: &str,
        variant: &SessionVariant,
    ) -> Result<SessionPair, TerminalError>;

    /// Whether a window with this id still exists.
    fn session_exists(&self, id: &str) -> Result<bool, TerminalError>;

    fn focus_window(&self, id: &str) -> Result<(), TerminalError>;
    fn close_window(&self, id: &str) -> Result<(), TerminalError>;
}
