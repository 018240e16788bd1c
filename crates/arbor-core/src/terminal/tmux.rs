//! tmux-backed [`TerminalSessions`] implementation.
//!
//! All arbor windows live inside one named tmux session. Window ids are
//! tmux's stable `@n` identifiers, captured at creation time via
//! `new-window -P -F '#{window_id}'` and persisted in the worktree record
//! so windows can be re-focused or detected as gone later.

use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

use crate::terminal::client::TerminalSessions;
use crate::terminal::errors::TerminalError;
use crate::terminal::types::{SessionPair, SessionVariant};

/// Validate a tmux window id before using it as a target.
///
/// tmux window ids are `@` followed by digits. Rejecting anything else
/// keeps recorded ids from smuggling arbitrary target syntax into tmux.
fn validate_window_id(id: &str) -> Result<(), TerminalError> {
    let valid = id
        .strip_prefix('@')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()));
    if valid {
        Ok(())
    } else {
        Err(TerminalError::InvalidWindowId { id: id.to_string() })
    }
}

/// Shell-out based tmux client scoped to one hosting session.
#[derive(Debug, Clone)]
pub struct TmuxClient {
    session: String,
}

impl TmuxClient {
    pub fn new(session: String) -> Self {
        Self { session }
    }

    fn run(&self, args: &[&str]) -> Result<String, TerminalError> {
        let output = Command::new("tmux")
            .args(args)
            .output()
            .map_err(|e| TerminalError::CommandFailed {
                command: args.first().unwrap_or(&"tmux").to_string(),
                message: format!("Failed to execute tmux: {}", e),
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TerminalError::CommandFailed {
                command: args.first().unwrap_or(&"tmux").to_string(),
                message: stderr.trim().to_string(),
            })
        }
    }

    /// Create one window in the hosting session and return its id.
    ///
    /// `command` of `None` gets the user's default shell.
    fn create_window(
        &self,
        path: &Path,
        name: &str,
        command: Option<&str>,
    ) -> Result<String, TerminalError> {
        let target = format!("{}:", self.session);
        let path_str = path.to_string_lossy().to_string();

        let mut args = vec![
            "new-window",
            "-d",
            "-P",
            "-F",
            "#{window_id}",
            "-t",
            target.as_str(),
            "-n",
            name,
            "-c",
            path_str.as_str(),
        ];
        if let Some(cmd) = command {
            args.push(cmd);
        }

        let id = self.run(&args)?;
        if id.is_empty() {
            return Err(TerminalError::CommandFailed {
                command: "new-window".to_string(),
                message: "tmux did not report a window id".to_string(),
            });
        }
        Ok(id)
    }
}

impl TerminalSessions for TmuxClient {
    fn is_running(&self) -> bool {
        Command::new("tmux")
            .args(["has-session", "-t", self.session.as_str()])
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn ensure_running(&self) -> Result<(), TerminalError> {
        if which::which("tmux").is_err() {
            return Err(TerminalError::MultiplexerNotFound);
        }

        if self.is_running() {
            return Ok(());
        }

        info!(
            event = "core.terminal.session_starting",
            session = %self.session
        );
        self.run(&["new-session", "-d", "-s", self.session.as_str()])?;
        info!(
            event = "core.terminal.session_started",
            session = %self.session
        );
        Ok(())
    }

    fn create_session(
        &self,
        path: &Path,
        name: &str,
        variant: &SessionVariant,
    ) -> Result<SessionPair, TerminalError> {
        if name.trim().is_empty() {
            return Err(TerminalError::InvalidWindowName);
        }
        if !path.exists() {
            return Err(TerminalError::WorkingDirectoryNotFound {
                path: path.display().to_string(),
            });
        }

        info!(
            event = "core.terminal.create_session_started",
            name = name,
            path = %path.display()
        );

        let primary_id = self.create_window(path, name, Some(variant.assistant_command()))?;

        let shell_name = format!("{name}-sh");
        let secondary_id = match self.create_window(path, &shell_name, None) {
            Ok(id) => id,
            Err(e) => {
                // Don't leave a half-created pair behind
                if let Err(close_err) = self.close_window(&primary_id) {
                    warn!(
                        event = "core.terminal.pair_rollback_failed",
                        primary_id = %primary_id,
                        error = %close_err
                    );
                }
                return Err(e);
            }
        };

        info!(
            event = "core.terminal.create_session_completed",
            name = name,
            primary_id = %primary_id,
            secondary_id = %secondary_id
        );

        Ok(SessionPair {
            primary_id,
            secondary_id,
        })
    }

    fn session_exists(&self, id: &str) -> Result<bool, TerminalError> {
        validate_window_id(id)?;
        let out = self.run(&["list-windows", "-a", "-F", "#{window_id}"])?;
        Ok(out.lines().any(|line| line.trim() == id))
    }

    fn focus_window(&self, id: &str) -> Result<(), TerminalError> {
        validate_window_id(id)?;
        self.run(&["select-window", "-t", id])?;
        info!(event = "core.terminal.window_focused", window_id = %id);
        Ok(())
    }

    fn close_window(&self, id: &str) -> Result<(), TerminalError> {
        validate_window_id(id)?;
        self.run(&["kill-window", "-t", id])?;
        info!(event = "core.terminal.window_closed", window_id = %id);
        Ok(())
    }
}
