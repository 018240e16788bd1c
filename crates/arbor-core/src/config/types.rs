//! Configuration type definitions for the Arbor CLI.
//!
//! These types are serialized/deserialized from TOML config files, with the
//! exception of [`Config`], which holds runtime paths derived from the
//! environment.
//!
//! # Example Configuration
//!
//! ```toml
//! [git]
//! base_branch = "main"
//! remote = "origin"
//!
//! [terminal]
//! session = "arbor"
//!
//! [assistant]
//! command = "claude"
//! flags = "--permission-mode acceptEdits"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration for the Arbor CLI.
///
/// Holds paths and settings derived from environment variables and system
/// defaults, not from config files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for all Arbor data (default: ~/.arbor)
    pub arbor_dir: PathBuf,
    /// Log level for the application
    pub log_level: String,
}

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.arbor/config.toml`
/// 2. Project config: `./.arbor/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArborConfig {
    /// Git defaults (base branch, remote name)
    #[serde(default)]
    pub git: GitConfig,

    /// Terminal multiplexer preferences
    #[serde(default)]
    pub terminal: TerminalConfig,

    /// Assistant launch configuration
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Git defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Base branch that worktrees sync with and merge into.
    #[serde(default = "super::defaults::default_base_branch")]
    pub base_branch: String,

    /// Remote name used for fetch/pull/push.
    #[serde(default = "super::defaults::default_remote")]
    pub remote: String,
}

/// Terminal multiplexer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Name of the tmux session that hosts all arbor windows.
    #[serde(default = "super::defaults::default_tmux_session")]
    pub session: String,

    /// Prefix for window names (window name is `<prefix><branch dir name>`).
    #[serde(default)]
    pub window_prefix: Option<String>,
}

/// Assistant launch configuration.
///
/// The assistant command runs in the primary window of each session pair;
/// the secondary window runs the user's shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Command launched in the primary window.
    #[serde(default = "super::defaults::default_assistant_command")]
    pub command: String,

    /// Extra flags appended to the assistant command.
    #[serde(default)]
    pub flags: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arbor_config_serialization() {
        let config = ArborConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ArborConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.git.base_branch, parsed.git.base_branch);
        assert_eq!(config.assistant.command, parsed.assistant.command);
    }

    #[test]
    fn test_git_config_serde_defaults() {
        let toml_str = r#"
[git]
base_branch = "develop"
"#;
        let config: ArborConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.git.base_branch, "develop");
        assert_eq!(
            config.git.remote, "origin",
            "remote should default to origin when omitted"
        );
    }

    #[test]
    fn test_assistant_config_deserialize() {
        let toml_str = r#"
[assistant]
command = "claude"
flags = "--permission-mode acceptEdits"
"#;
        let config: ArborConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.assistant.command, "claude");
        assert_eq!(
            config.assistant.flags,
            Some("--permission-mode acceptEdits".to_string())
        );
    }

    #[test]
    fn test_assistant_command_with_flags() {
        let mut config = ArborConfig::default();
        config.assistant.command = "claude".to_string();
        config.assistant.flags = Some("--continue".to_string());
        assert_eq!(config.assistant_command(), "claude --continue");

        config.assistant.flags = Some("   ".to_string());
        assert_eq!(config.assistant_command(), "claude");

        config.assistant.flags = None;
        assert_eq!(config.assistant_command(), "claude");
    }
}
