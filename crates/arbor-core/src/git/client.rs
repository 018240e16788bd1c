//! Version-control capability contract.
//!
//! Every method is scoped to an explicit repository or worktree path; no
//! implementation may rely on an ambient working directory.

use std::path::{Path, PathBuf};

use crate::git::errors::GitError;
use crate::git::types::WorktreeInfo;

/// Repository-level operations consumed by the operation layer and the
/// lifecycle manager.
///
/// One production implementation ([`crate::git::cli::GitCli`]) shells out to
/// the `git` binary (with `git2` for read-only queries); one scripted test
/// double lives behind `cfg(test)`.
pub trait VersionControl {
    /// Root of the repository (or worktree) containing `path`.
    fn repo_root(&self, path: &Path) -> Result<PathBuf, GitError>;

    /// Display name of the repository at `repo` (its directory name).
    fn repo_name(&self, repo: &Path) -> Result<String, GitError>;

    /// All worktrees known to the repository, main checkout first.
    fn list_worktrees(&self, repo: &Path) -> Result<Vec<WorktreeInfo>, GitError>;

    /// Add a worktree at `path` for `branch`. When `create_from` is given,
    /// the branch is created from that start point; otherwise the existing
    /// branch is checked out.
    fn add_worktree(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
        create_from: Option<&str>,
    ) -> Result<(), GitError>;

    /// Remove the worktree at `path`.
    fn remove_worktree(&self, repo: &Path, path: &Path, force: bool) -> Result<(), GitError>;

    /// Drop worktree bookkeeping for paths that no longer exist.
    fn prune_worktrees(&self, repo: &Path) -> Result<(), GitError>;

    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError>;

    /// Delete a local branch. `force` maps safe delete to forced delete.
    fn delete_branch(&self, repo: &Path, branch: &str, force: bool) -> Result<(), GitError>;

    /// Currently checked-out branch at `path`, `None` when detached.
    fn current_branch(&self, path: &Path) -> Result<Option<String>, GitError>;

    /// Whether the working tree at `path` has uncommitted changes
    /// (staged, modified, or untracked).
    fn is_dirty(&self, path: &Path) -> Result<bool, GitError>;

    /// Whether `path`'s branch has commits not reachable from `base`.
    fn has_unpushed_commits(&self, path: &Path, base: &str) -> Result<bool, GitError>;

    fn is_merge_in_progress(&self, path: &Path) -> Result<bool, GitError>;
    fn is_rebase_in_progress(&self, path: &Path) -> Result<bool, GitError>;

    /// Whether unresolved conflict entries remain in the index at `path`.
    fn has_conflicts(&self, path: &Path) -> Result<bool, GitError>;

    fn merge(&self, path: &Path, source: &str) -> Result<(), GitError>;
    fn merge_continue(&self, path: &Path) -> Result<(), GitError>;
    fn rebase(&self, path: &Path, onto: &str) -> Result<(), GitError>;
    fn rebase_continue(&self, path: &Path) -> Result<(), GitError>;

    fn pull(&self, path: &Path, remote: &str, branch: &str) -> Result<(), GitError>;

    /// Push `branch` to `remote`; `set_upstream` creates the tracking ref.
    fn push(
        &self,
        path: &Path,
        remote: &str,
        branch: &str,
        set_upstream: bool,
    ) -> Result<(), GitError>;

    fn fetch(&self, path: &Path, remote: &str) -> Result<(), GitError>;

    /// Whether the named remote is configured for the repository at `path`.
    fn has_remote(&self, path: &Path, remote: &str) -> Result<bool, GitError>;

    /// Commits on `path`'s HEAD that are not reachable from `reference`.
    fn commits_ahead(&self, path: &Path, reference: &str) -> Result<usize, GitError>;

    /// Commits reachable from `reference` that are not on `path`'s HEAD.
    fn commits_behind(&self, path: &Path, reference: &str) -> Result<usize, GitError>;
}
