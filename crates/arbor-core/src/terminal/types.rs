use crate::terminal::errors::TerminalError;
use serde::{Deserialize, Serialize};

/// The two window identities created for one worktree.
///
/// The primary window runs the assistant; the secondary runs a plain shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPair {
    pub primary_id: String,
    pub secondary_id: String,
}

/// What the primary window of a session pair runs.
///
/// Fields are private to enforce validation at construction time.
#[derive(Debug, Clone)]
pub struct SessionVariant {
    assistant_command: String,
}

impl SessionVariant {
    /// Create a validated variant.
    ///
    /// Returns an error if the assistant command is empty.
    pub fn try_new(assistant_command: String) -> Result<Self, TerminalError> {
        if assistant_command.trim().is_empty() {
            return Err(TerminalError::InvalidCommand);
        }
        Ok(Self { assistant_command })
    }

    /// The command launched in the primary window.
    pub fn assistant_command(&self) -> &str {
        &self.assistant_command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_variant_rejects_empty_command() {
        let result = SessionVariant::try_new("   ".to_string());
        assert!(matches!(result, Err(TerminalError::InvalidCommand)));
    }

    #[test]
    fn test_session_variant_accessor() {
        let variant = SessionVariant::try_new("claude --continue".to_string()).unwrap();
        assert_eq!(variant.assistant_command(), "claude --continue");
    }

    #[test]
    fn test_session_pair_roundtrip() {
        let pair = SessionPair {
            primary_id: "@3".to_string(),
            secondary_id: "@4".to_string(),
        };
        let json = serde_json::to_string(&pair).unwrap();
        let parsed: SessionPair = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pair);
    }
}
