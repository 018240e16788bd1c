//! Shared identifier resolution.
//!
//! A worktree can be addressed by its full branch name (`feature/auth`),
//! by the branch's short directory name (`auth`), or by its path. Before a
//! record exists, the directory name derived from the branch is the only
//! identifier; once a record exists, its `branch` field is authoritative.

use std::path::{Path, PathBuf};

use crate::state::types::WorktreeRecord;

/// Directory name for a branch: the last `/`-separated segment.
///
/// `"feature/auth"` → `"auth"`, `"a/b/c/deep"` → `"deep"`.
pub fn branch_dir_name(branch: &str) -> &str {
    branch.rsplit('/').next().unwrap_or(branch)
}

/// Directory-name fallback identifier for a worktree path.
pub fn branch_dir_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Resolve a branch identifier to its worktree path under `root`.
///
/// Idempotent over the identifier form: `"auth"` and `"feature/auth"`
/// resolve to the same absolute path.
pub fn resolve_worktree_path(root: &Path, ident: &str) -> PathBuf {
    root.join(branch_dir_name(ident))
}

/// The branch a worktree is for: the record's branch when one exists,
/// otherwise the identifier the caller supplied.
pub fn resolve_branch(record: Option<&WorktreeRecord>, ident: &str) -> String {
    match record {
        Some(record) => record.branch.clone(),
        None => ident.to_string(),
    }
}

/// Conventional root for a repository's managed worktrees.
pub fn worktrees_root(worktrees_dir: &Path, repo_name: &str) -> PathBuf {
    worktrees_dir.join(repo_name)
}
