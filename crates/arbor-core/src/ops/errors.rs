use std::path::PathBuf;

use crate::errors::ArborError;
use crate::git::errors::GitError;

#[derive(Debug, thiserror::Error)]
pub enum OpError {
    /// A policy check failed or the user declined a destructive step.
    /// Nothing was mutated; retry with --force or explicit confirmation.
    #[error("{reason}")]
    SafetyAbort { reason: String },

    /// A merge or rebase produced conflicts. State is left exactly as git
    /// left it; resolve, stage, and re-run the same command to continue.
    #[error(
        "{operation} produced conflicts in {path}. Resolve them, stage the results, and re-run the same command to continue."
    )]
    Conflict { operation: String, path: PathBuf },

    /// A continuation was attempted while conflict markers remain.
    #[error(
        "Unresolved conflicts remain in {path}. Resolve and stage them, then re-run to continue."
    )]
    UnresolvedConflicts { path: PathBuf },

    /// The main checkout is not on the branch the operation requires.
    #[error("Main checkout is on '{current}' but must be on '{required}'. Switch branches and re-run.")]
    WrongBranch { current: String, required: String },

    #[error("No worktree or branch matching '{name}'")]
    NotFound { name: String },

    #[error("Git operation failed: {source}")]
    Git {
        #[from]
        source: GitError,
    },
}

impl ArborError for OpError {
    fn error_code(&self) -> &'static str {
        match self {
            OpError::SafetyAbort { .. } => "SAFETY_ABORT",
            OpError::Conflict { .. } => "CONFLICT",
            OpError::UnresolvedConflicts { .. } => "UNRESOLVED_CONFLICTS",
            OpError::WrongBranch { .. } => "WRONG_BRANCH",
            OpError::NotFound { .. } => "NOT_FOUND",
            OpError::Git { .. } => "GIT_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            OpError::SafetyAbort { .. }
                | OpError::Conflict { .. }
                | OpError::UnresolvedConflicts { .. }
                | OpError::WrongBranch { .. }
                | OpError::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_instructs_rerun() {
        let error = OpError::Conflict {
            operation: "Merge".to_string(),
            path: PathBuf::from("/tmp/wt"),
        };
        let msg = error.to_string();
        assert!(msg.contains("/tmp/wt"));
        assert!(msg.contains("re-run"));
        assert_eq!(error.error_code(), "CONFLICT");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_wrong_branch_names_required_branch() {
        let error = OpError::WrongBranch {
            current: "feature/auth".to_string(),
            required: "main".to_string(),
        };
        assert!(error.to_string().contains("'main'"));
        assert!(error.to_string().contains("'feature/auth'"));
    }
}
