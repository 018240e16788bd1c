//! Scripted [`VersionControl`] double for operation-layer tests.
//!
//! Behavior is configured through public fields; every invocation is
//! recorded in `calls` so tests can assert which primitives ran (and which
//! did not).

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::git::client::VersionControl;
use crate::git::errors::GitError;
use crate::git::types::WorktreeInfo;

#[derive(Debug, Default)]
pub struct MockGit {
    pub calls: RefCell<Vec<String>>,

    pub dirty: bool,
    pub merge_in_progress: bool,
    pub rebase_in_progress: bool,
    pub conflicted: bool,
    pub remote: bool,
    pub current: Option<String>,
    pub branches: Vec<String>,
    pub worktrees: Vec<WorktreeInfo>,

    /// Ahead/behind counts keyed by reference name; missing keys count 0.
    pub ahead: HashMap<String, usize>,
    pub behind: HashMap<String, usize>,

    pub merge_conflicts: bool,
    pub rebase_conflicts: bool,
    pub fail_remove_worktree: bool,
    pub fail_safe_branch_delete: bool,
    pub fail_forced_branch_delete: bool,
    pub fail_push: bool,
    pub fail_pull: bool,
    pub fail_fetch: bool,
}

impl MockGit {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    /// All recorded calls, for assertion convenience.
    pub fn recorded(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Whether any recorded call starts with `prefix`.
    pub fn called(&self, prefix: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|call| call.starts_with(prefix))
    }
}

impl VersionControl for MockGit {
    fn repo_root(&self, path: &Path) -> Result<PathBuf, GitError> {
        Ok(path.to_path_buf())
    }

    fn repo_name(&self, repo: &Path) -> Result<String, GitError> {
        Ok(repo
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("repo")
            .to_string())
    }

    fn list_worktrees(&self, _repo: &Path) -> Result<Vec<WorktreeInfo>, GitError> {
        self.record("list_worktrees".to_string());
        Ok(self.worktrees.clone())
    }

    fn add_worktree(
        &self,
        _repo: &Path,
        path: &Path,
        branch: &str,
        create_from: Option<&str>,
    ) -> Result<(), GitError> {
        self.record(format!(
            "add_worktree {} {} {:?}",
            path.display(),
            branch,
            create_from
        ));
        Ok(())
    }

    fn remove_worktree(&self, _repo: &Path, path: &Path, force: bool) -> Result<(), GitError> {
        self.record(format!("remove_worktree {} force={}", path.display(), force));
        if self.fail_remove_worktree {
            return Err(GitError::CommandFailed {
                command: "worktree remove".to_string(),
                message: "contains modified or untracked files".to_string(),
            });
        }
        Ok(())
    }

    fn prune_worktrees(&self, _repo: &Path) -> Result<(), GitError> {
        self.record("prune_worktrees".to_string());
        Ok(())
    }

    fn branch_exists(&self, _repo: &Path, branch: &str) -> Result<bool, GitError> {
        Ok(self.branches.iter().any(|b| b == branch))
    }

    fn delete_branch(&self, _repo: &Path, branch: &str, force: bool) -> Result<(), GitError> {
        self.record(format!("delete_branch {} force={}", branch, force));
        if force && self.fail_forced_branch_delete {
            return Err(GitError::CommandFailed {
                command: "branch -D".to_string(),
                message: "cannot delete".to_string(),
            });
        }
        if !force && self.fail_safe_branch_delete {
            return Err(GitError::CommandFailed {
                command: "branch -d".to_string(),
                message: "not fully merged".to_string(),
            });
        }
        Ok(())
    }

    fn current_branch(&self, _path: &Path) -> Result<Option<String>, GitError> {
        Ok(self.current.clone())
    }

    fn is_dirty(&self, _path: &Path) -> Result<bool, GitError> {
        Ok(self.dirty)
    }

    fn has_unpushed_commits(&self, _path: &Path, base: &str) -> Result<bool, GitError> {
        Ok(self.ahead.get(base).copied().unwrap_or(0) > 0)
    }

    fn is_merge_in_progress(&self, _path: &Path) -> Result<bool, GitError> {
        Ok(self.merge_in_progress)
    }

    fn is_rebase_in_progress(&self, _path: &Path) -> Result<bool, GitError> {
        Ok(self.rebase_in_progress)
    }

    fn has_conflicts(&self, _path: &Path) -> Result<bool, GitError> {
        Ok(self.conflicted)
    }

    fn merge(&self, path: &Path, source: &str) -> Result<(), GitError> {
        self.record(format!("merge {source}"));
        if self.merge_conflicts {
            return Err(GitError::MergeConflict {
                source_branch: source.to_string(),
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn merge_continue(&self, _path: &Path) -> Result<(), GitError> {
        self.record("merge_continue".to_string());
        Ok(())
    }

    fn rebase(&self, path: &Path, onto: &str) -> Result<(), GitError> {
        self.record(format!("rebase {onto}"));
        if self.rebase_conflicts {
            return Err(GitError::RebaseConflict {
                onto: onto.to_string(),
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn rebase_continue(&self, _path: &Path) -> Result<(), GitError> {
        self.record("rebase_continue".to_string());
        Ok(())
    }

    fn pull(&self, _path: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        self.record(format!("pull {remote} {branch}"));
        if self.fail_pull {
            return Err(GitError::CommandFailed {
                command: "pull".to_string(),
                message: "network unreachable".to_string(),
            });
        }
        Ok(())
    }

    fn push(
        &self,
        _path: &Path,
        remote: &str,
        branch: &str,
        set_upstream: bool,
    ) -> Result<(), GitError> {
        self.record(format!("push {remote} {branch} upstream={set_upstream}"));
        if self.fail_push {
            return Err(GitError::CommandFailed {
                command: "push".to_string(),
                message: "rejected".to_string(),
            });
        }
        Ok(())
    }

    fn fetch(&self, _path: &Path, remote: &str) -> Result<(), GitError> {
        self.record(format!("fetch {remote}"));
        if self.fail_fetch {
            return Err(GitError::CommandFailed {
                command: "fetch".to_string(),
                message: "network unreachable".to_string(),
            });
        }
        Ok(())
    }

    fn has_remote(&self, _path: &Path, _remote: &str) -> Result<bool, GitError> {
        Ok(self.remote)
    }

    fn commits_ahead(&self, _path: &Path, reference: &str) -> Result<usize, GitError> {
        Ok(self.ahead.get(reference).copied().unwrap_or(0))
    }

    fn commits_behind(&self, _path: &Path, reference: &str) -> Result<usize, GitError> {
        Ok(self.behind.get(reference).copied().unwrap_or(0))
    }
}
