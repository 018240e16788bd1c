//! Configuration loading and merging logic.
//!
//! Loads configuration from files and merges user and project configs.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.arbor/config.toml` (global user preferences)
//! 3. **Project config** - `./.arbor/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)

use crate::config::types::{ArborConfig, AssistantConfig, GitConfig, TerminalConfig};
use crate::errors::ConfigError;
use std::fs;
use std::path::Path;

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
/// Missing config files are not errors.
pub fn load_hierarchy() -> Result<ArborConfig, ConfigError> {
    let mut config = ArborConfig::default();

    if let Some(home) = dirs::home_dir() {
        let user_path = home.join(".arbor").join("config.toml");
        if let Some(user_config) = load_config_file(&user_path)? {
            config = merge_configs(config, user_config);
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let project_path = cwd.join(".arbor").join("config.toml");
        if let Some(project_config) = load_config_file(&project_path)? {
            config = merge_configs(config, project_config);
        }
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load a configuration file from the given path.
///
/// Returns `Ok(None)` if the file doesn't exist.
fn load_config_file(path: &Path) -> Result<Option<ArborConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let config: ArborConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
            message: format!("'{}': {}", path.display(), e),
        })?;
    Ok(Some(config))
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Optional fields replace base values only if present; required fields
/// always take the override's value (the override file either set them or
/// got the same defaults).
pub fn merge_configs(base: ArborConfig, override_config: ArborConfig) -> ArborConfig {
    ArborConfig {
        git: GitConfig {
            base_branch: override_config.git.base_branch,
            remote: override_config.git.remote,
        },
        terminal: TerminalConfig {
            session: override_config.terminal.session,
            window_prefix: override_config
                .terminal
                .window_prefix
                .or(base.terminal.window_prefix),
        },
        assistant: AssistantConfig {
            command: override_config.assistant.command,
            flags: override_config.assistant.flags.or(base.assistant.flags),
        },
    }
}

/// Validate the final merged configuration.
pub fn validate_config(config: &ArborConfig) -> Result<(), ConfigError> {
    if config.git.base_branch.trim().is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "git.base_branch cannot be empty".to_string(),
        });
    }
    if config.git.remote.trim().is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "git.remote cannot be empty".to_string(),
        });
    }
    if config.terminal.session.trim().is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "terminal.session cannot be empty".to_string(),
        });
    }
    if config.assistant.command.trim().is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "assistant.command cannot be empty".to_string(),
        });
    }
    Ok(())
}
