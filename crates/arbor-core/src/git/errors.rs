use crate::errors::ArborError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Branch '{branch}' not found")]
    BranchNotFound { branch: String },

    #[error("Merge of '{source_branch}' produced conflicts in {path}")]
    MergeConflict { source_branch: String, path: PathBuf },

    #[error("Rebase onto '{onto}' produced conflicts in {path}")]
    RebaseConflict { onto: String, path: PathBuf },

    #[error("git {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Git operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Git library error: {source}")]
    Git2Error {
        #[from]
        source: git2::Error,
    },

    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl GitError {
    /// Whether this error represents a conflicted merge or rebase that the
    /// user can resolve and continue.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            GitError::MergeConflict { .. } | GitError::RebaseConflict { .. }
        )
    }
}

impl ArborError for GitError {
    fn error_code(&self) -> &'static str {
        match self {
            GitError::NotARepository { .. } => "NOT_A_REPOSITORY",
            GitError::BranchNotFound { .. } => "BRANCH_NOT_FOUND",
            GitError::MergeConflict { .. } => "MERGE_CONFLICT",
            GitError::RebaseConflict { .. } => "REBASE_CONFLICT",
            GitError::CommandFailed { .. } => "GIT_COMMAND_FAILED",
            GitError::OperationFailed { .. } => "GIT_OPERATION_FAILED",
            GitError::Git2Error { .. } => "GIT2_ERROR",
            GitError::IoError { .. } => "GIT_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            GitError::NotARepository { .. }
                | GitError::BranchNotFound { .. }
                | GitError::MergeConflict { .. }
                | GitError::RebaseConflict { .. }
        )
    }
}
