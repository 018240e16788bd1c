//! Default implementations for configuration types.
//!
//! This module contains all `Default` implementations and helper functions
//! for providing default values in serde deserialization.

use crate::config::types::{AssistantConfig, Config, GitConfig, TerminalConfig};
use std::path::PathBuf;

/// Returns the default base branch name.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_base_branch() -> String {
    "main".to_string()
}

/// Returns the default remote name.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_remote() -> String {
    "origin".to_string()
}

/// Returns the default tmux session name that hosts arbor windows.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_tmux_session() -> String {
    "arbor".to_string()
}

/// Returns the default assistant command for the primary window.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_assistant_command() -> String {
    "claude".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            base_branch: default_base_branch(),
            remote: default_remote(),
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            session: default_tmux_session(),
            window_prefix: None,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            command: default_assistant_command(),
            flags: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let arbor_dir = match dirs::home_dir() {
            Some(home) => home.join(".arbor"),
            None => {
                eprintln!(
                    "Warning: Could not find home directory. Set HOME environment variable. \
                    Using fallback directory."
                );
                std::env::temp_dir().join(".arbor")
            }
        };

        Self {
            arbor_dir,
            log_level: std::env::var("ARBOR_LOG_LEVEL").unwrap_or("info".to_string()),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root directory under which managed worktrees are created.
    pub fn worktrees_dir(&self) -> PathBuf {
        self.arbor_dir.join("worktrees")
    }

    /// Path of the worktree state registry.
    pub fn state_file(&self) -> PathBuf {
        self.arbor_dir.join("state.json")
    }

    /// Path of the assistant trust registry.
    pub fn trust_file(&self) -> PathBuf {
        self.arbor_dir.join("trust.json")
    }
}
