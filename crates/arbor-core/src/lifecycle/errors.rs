use crate::errors::ArborError;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("{reason}")]
    Aborted { reason: String },

    #[error("Worktree '{name}' not found. Create it with 'arbor create {name}'.")]
    WorktreeNotFound { name: String },

    #[error("Git operation failed: {source}")]
    Git {
        #[from]
        source: crate::git::errors::GitError,
    },

    #[error("Terminal operation failed: {source}")]
    Terminal {
        #[from]
        source: crate::terminal::errors::TerminalError,
    },

    #[error("State operation failed: {source}")]
    State {
        #[from]
        source: crate::state::errors::StateError,
    },

    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ArborError for LifecycleError {
    fn error_code(&self) -> &'static str {
        match self {
            LifecycleError::Aborted { .. } => "LIFECYCLE_ABORTED",
            LifecycleError::WorktreeNotFound { .. } => "WORKTREE_NOT_FOUND",
            LifecycleError::Git { .. } => "GIT_ERROR",
            LifecycleError::Terminal { .. } => "TERMINAL_ERROR",
            LifecycleError::State { .. } => "STATE_ERROR",
            LifecycleError::IoError { .. } => "LIFECYCLE_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            LifecycleError::Aborted { .. } | LifecycleError::WorktreeNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_create_command() {
        let error = LifecycleError::WorktreeNotFound {
            name: "auth".to_string(),
        };
        assert!(error.to_string().contains("arbor create auth"));
        assert!(error.is_user_error());
    }
}
