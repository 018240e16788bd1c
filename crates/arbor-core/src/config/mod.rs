//! # Configuration System
//!
//! Hierarchical TOML configuration system for the Arbor CLI.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.arbor/config.toml` (global user preferences)
//! 3. **Project config** - `./.arbor/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.arbor/config.toml
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

pub mod defaults;
pub mod loading;
pub mod types;

// Public API exports
pub use types::{ArborConfig, AssistantConfig, Config, GitConfig, TerminalConfig};

impl ArborConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// The full assistant launch command (base command plus flags).
    pub fn assistant_command(&self) -> String {
        match &self.assistant.flags {
            Some(flags) if !flags.trim().is_empty() => {
                format!("{} {}", self.assistant.command, flags)
            }
            _ => self.assistant.command.clone(),
        }
    }
}
