//! Production [`VersionControl`] implementation.
//!
//! Mutating and auth-requiring operations (fetch, pull, push, merge, rebase,
//! worktree add/remove) shell out to the `git` CLI, which inherits the
//! user's SSH agent and credential helpers. Read-only queries (status,
//! branch lookup, ahead/behind counts) go through `git2`.
//!
//! Each operation validates arguments, logs structured events, and maps
//! errors consistently. Conflicted merges and rebases are NOT aborted here:
//! the worktree is left exactly as git left it so the user can resolve and
//! re-invoke, which lands on the continuation path.

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Repository, StatusOptions};
use tracing::{debug, info, warn};

use crate::git::client::VersionControl;
use crate::git::errors::GitError;
use crate::git::types::WorktreeInfo;

/// Validate a git argument to prevent injection.
///
/// Rejects values that start with `-` (option injection), contain control
/// characters, or contain `::` sequences (refspec injection).
pub fn validate_git_arg(value: &str, label: &str) -> Result<(), GitError> {
    if value.starts_with('-') {
        return Err(GitError::OperationFailed {
            message: format!("Invalid {label}: '{value}' (must not start with '-')"),
        });
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(GitError::OperationFailed {
            message: format!("Invalid {label}: contains control characters"),
        });
    }
    if value.contains("::") {
        return Err(GitError::OperationFailed {
            message: format!("Invalid {label}: '::' sequences are not allowed"),
        });
    }
    Ok(())
}

/// Validate a branch name against git's naming rules.
pub fn validate_branch_name(branch: &str) -> Result<String, GitError> {
    let trimmed = branch.trim();

    if trimmed.is_empty() {
        return Err(GitError::OperationFailed {
            message: "Branch name cannot be empty".to_string(),
        });
    }

    if trimmed.contains("..")
        || trimmed.starts_with('-')
        || trimmed.contains(' ')
        || trimmed.contains('\t')
        || trimmed.contains('\n')
    {
        return Err(GitError::OperationFailed {
            message: format!("Invalid branch name: '{}'", trimmed),
        });
    }

    Ok(trimmed.to_string())
}

/// Shell-out based git client.
#[derive(Debug, Default, Clone)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }

    /// Run git in `dir`, returning trimmed stdout on success.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .current_dir(dir)
            .args(args)
            .output()
            .map_err(|e| GitError::CommandFailed {
                command: args.join(" "),
                message: format!("Failed to execute git in {}: {}", dir.display(), e),
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(GitError::CommandFailed {
                command: args.join(" "),
                message: stderr.trim().to_string(),
            })
        }
    }

    /// Run git in `dir`, returning (exit code, stdout, stderr) without
    /// mapping failure. Used where the caller classifies the outcome.
    fn run_raw(&self, dir: &Path, args: &[&str]) -> Result<(i32, String, String), GitError> {
        let output = Command::new("git")
            .current_dir(dir)
            .env("GIT_EDITOR", "true")
            .args(args)
            .output()
            .map_err(|e| GitError::CommandFailed {
                command: args.join(" "),
                message: format!("Failed to execute git in {}: {}", dir.display(), e),
            })?;

        Ok((
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        ))
    }

    fn open_repo(&self, path: &Path) -> Result<Repository, GitError> {
        Repository::open(path).map_err(|_| GitError::NotARepository {
            path: path.to_path_buf(),
        })
    }

    /// Resolve a path inside the (possibly worktree-specific) git dir.
    ///
    /// In linked worktrees `.git` is a pointer file, so the marker files
    /// live under the repository's private worktree directory. `git
    /// rev-parse --git-path` resolves that indirection for us.
    fn git_path(&self, dir: &Path, name: &str) -> Result<PathBuf, GitError> {
        let out = self.run(dir, &["rev-parse", "--git-path", name])?;
        let candidate = PathBuf::from(&out);
        if candidate.is_absolute() {
            Ok(candidate)
        } else {
            Ok(dir.join(candidate))
        }
    }
}

/// Detect conflicts from a failed merge/rebase invocation.
///
/// Exit code 1 with conflict markers in the combined output.
fn output_indicates_conflict(code: i32, stdout: &str, stderr: &str) -> bool {
    if code != 1 {
        return false;
    }
    let combined = format!("{stdout}\n{stderr}");
    combined.contains("CONFLICT")
        || combined.contains("Automatic merge failed")
        || combined.contains("could not apply")
        || combined.contains("failed to merge")
}

/// Parse `git worktree list --porcelain` output.
///
/// Entries are blank-line separated blocks; the first block is the main
/// checkout.
fn parse_worktree_list(output: &str) -> Vec<WorktreeInfo> {
    let mut worktrees = Vec::new();
    let mut first = true;

    for block in output.split("\n\n") {
        let mut path = None;
        let mut head = None;
        let mut branch = None;

        for line in block.lines() {
            if let Some(p) = line.strip_prefix("worktree ") {
                path = Some(PathBuf::from(p));
            } else if let Some(h) = line.strip_prefix("HEAD ") {
                head = Some(h.to_string());
            } else if let Some(b) = line.strip_prefix("branch ") {
                branch = Some(b.strip_prefix("refs/heads/").unwrap_or(b).to_string());
            }
        }

        if let Some(path) = path {
            worktrees.push(WorktreeInfo {
                path,
                branch,
                head,
                is_main: first,
            });
            first = false;
        }
    }

    worktrees
}

impl VersionControl for GitCli {
    fn repo_root(&self, path: &Path) -> Result<PathBuf, GitError> {
        let out = self.run(path, &["rev-parse", "--show-toplevel"])?;
        if out.is_empty() {
            return Err(GitError::NotARepository {
                path: path.to_path_buf(),
            });
        }
        Ok(PathBuf::from(out))
    }

    fn repo_name(&self, repo: &Path) -> Result<String, GitError> {
        repo.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_string())
            .ok_or_else(|| GitError::OperationFailed {
                message: format!("Cannot derive repository name from '{}'", repo.display()),
            })
    }

    fn list_worktrees(&self, repo: &Path) -> Result<Vec<WorktreeInfo>, GitError> {
        let out = self.run(repo, &["worktree", "list", "--porcelain"])?;
        Ok(parse_worktree_list(&out))
    }

    fn add_worktree(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
        create_from: Option<&str>,
    ) -> Result<(), GitError> {
        validate_branch_name(branch)?;
        let path_str = path.to_string_lossy().to_string();

        info!(
            event = "core.git.worktree_add_started",
            branch = branch,
            path = %path.display(),
            create_from = ?create_from
        );

        match create_from {
            Some(base) => {
                validate_git_arg(base, "base branch")?;
                self.run(repo, &["worktree", "add", "-b", branch, path_str.as_str(), base])?;
            }
            None => {
                self.run(repo, &["worktree", "add", path_str.as_str(), branch])?;
            }
        }

        info!(
            event = "core.git.worktree_add_completed",
            branch = branch,
            path = %path.display()
        );
        Ok(())
    }

    fn remove_worktree(&self, repo: &Path, path: &Path, force: bool) -> Result<(), GitError> {
        let path_str = path.to_string_lossy().to_string();

        info!(
            event = "core.git.worktree_remove_started",
            path = %path.display(),
            force = force
        );

        if force {
            self.run(repo, &["worktree", "remove", "--force", path_str.as_str()])?;
        } else {
            self.run(repo, &["worktree", "remove", path_str.as_str()])?;
        }

        info!(
            event = "core.git.worktree_remove_completed",
            path = %path.display()
        );
        Ok(())
    }

    fn prune_worktrees(&self, repo: &Path) -> Result<(), GitError> {
        self.run(repo, &["worktree", "prune"])?;
        info!(event = "core.git.worktree_prune_completed");
        Ok(())
    }

    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        let repo = self.open_repo(repo)?;
        match repo.find_branch(branch, git2::BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(GitError::Git2Error { source: e }),
        }
    }

    fn delete_branch(&self, repo: &Path, branch: &str, force: bool) -> Result<(), GitError> {
        validate_branch_name(branch)?;

        let flag = if force { "-D" } else { "-d" };
        self.run(repo, &["branch", flag, branch])?;

        info!(
            event = "core.git.branch_deleted",
            branch = branch,
            force = force
        );
        Ok(())
    }

    fn current_branch(&self, path: &Path) -> Result<Option<String>, GitError> {
        let repo = self.open_repo(path)?;
        let head = repo.head().map_err(|e| GitError::Git2Error { source: e })?;

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            debug!(
                event = "core.git.detached_head",
                path = %path.display()
            );
            Ok(None)
        }
    }

    fn is_dirty(&self, path: &Path) -> Result<bool, GitError> {
        let repo = self.open_repo(path)?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        opts.include_ignored(false);

        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::Git2Error { source: e })?;

        Ok(!statuses.is_empty())
    }

    fn has_unpushed_commits(&self, path: &Path, base: &str) -> Result<bool, GitError> {
        Ok(self.commits_ahead(path, base)? > 0)
    }

    fn is_merge_in_progress(&self, path: &Path) -> Result<bool, GitError> {
        Ok(self.git_path(path, "MERGE_HEAD")?.exists())
    }

    fn is_rebase_in_progress(&self, path: &Path) -> Result<bool, GitError> {
        Ok(self.git_path(path, "rebase-merge")?.exists()
            || self.git_path(path, "rebase-apply")?.exists())
    }

    fn has_conflicts(&self, path: &Path) -> Result<bool, GitError> {
        let repo = self.open_repo(path)?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(false);

        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::Git2Error { source: e })?;

        Ok(statuses
            .iter()
            .any(|entry| entry.status().is_conflicted()))
    }

    fn merge(&self, path: &Path, source: &str) -> Result<(), GitError> {
        validate_git_arg(source, "merge source")?;

        info!(
            event = "core.git.merge_started",
            source = source,
            path = %path.display()
        );

        let (code, stdout, stderr) = self.run_raw(path, &["merge", "--no-edit", source])?;
        if code == 0 {
            info!(event = "core.git.merge_completed", source = source);
            return Ok(());
        }

        if output_indicates_conflict(code, &stdout, &stderr) {
            warn!(
                event = "core.git.merge_conflicts",
                source = source,
                path = %path.display()
            );
            return Err(GitError::MergeConflict {
                source_branch: source.to_string(),
                path: path.to_path_buf(),
            });
        }

        Err(GitError::CommandFailed {
            command: format!("merge {source}"),
            message: format!("exit {}: {}", code, stderr.trim()),
        })
    }

    fn merge_continue(&self, path: &Path) -> Result<(), GitError> {
        let (code, _stdout, stderr) = self.run_raw(path, &["merge", "--continue"])?;
        if code == 0 {
            info!(event = "core.git.merge_continue_completed", path = %path.display());
            Ok(())
        } else {
            Err(GitError::CommandFailed {
                command: "merge --continue".to_string(),
                message: format!("exit {}: {}", code, stderr.trim()),
            })
        }
    }

    fn rebase(&self, path: &Path, onto: &str) -> Result<(), GitError> {
        validate_git_arg(onto, "rebase target")?;

        info!(
            event = "core.git.rebase_started",
            onto = onto,
            path = %path.display()
        );

        let (code, stdout, stderr) = self.run_raw(path, &["rebase", onto])?;
        if code == 0 {
            info!(event = "core.git.rebase_completed", onto = onto);
            return Ok(());
        }

        if output_indicates_conflict(code, &stdout, &stderr) {
            warn!(
                event = "core.git.rebase_conflicts",
                onto = onto,
                path = %path.display()
            );
            return Err(GitError::RebaseConflict {
                onto: onto.to_string(),
                path: path.to_path_buf(),
            });
        }

        Err(GitError::CommandFailed {
            command: format!("rebase {onto}"),
            message: format!("exit {}: {}", code, stderr.trim()),
        })
    }

    fn rebase_continue(&self, path: &Path) -> Result<(), GitError> {
        let (code, _stdout, stderr) = self.run_raw(path, &["rebase", "--continue"])?;
        if code == 0 {
            info!(event = "core.git.rebase_continue_completed", path = %path.display());
            Ok(())
        } else {
            Err(GitError::CommandFailed {
                command: "rebase --continue".to_string(),
                message: format!("exit {}: {}", code, stderr.trim()),
            })
        }
    }

    fn pull(&self, path: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        validate_git_arg(remote, "remote name")?;
        validate_git_arg(branch, "branch name")?;

        info!(
            event = "core.git.pull_started",
            remote = remote,
            branch = branch,
            path = %path.display()
        );
        self.run(path, &["pull", remote, branch])?;
        info!(event = "core.git.pull_completed", remote = remote, branch = branch);
        Ok(())
    }

    fn push(
        &self,
        path: &Path,
        remote: &str,
        branch: &str,
        set_upstream: bool,
    ) -> Result<(), GitError> {
        validate_git_arg(remote, "remote name")?;
        validate_git_arg(branch, "branch name")?;

        info!(
            event = "core.git.push_started",
            remote = remote,
            branch = branch,
            set_upstream = set_upstream
        );

        if set_upstream {
            self.run(path, &["push", "-u", remote, branch])?;
        } else {
            self.run(path, &["push", remote, branch])?;
        }

        info!(event = "core.git.push_completed", remote = remote, branch = branch);
        Ok(())
    }

    fn fetch(&self, path: &Path, remote: &str) -> Result<(), GitError> {
        validate_git_arg(remote, "remote name")?;

        info!(event = "core.git.fetch_started", remote = remote, path = %path.display());
        self.run(path, &["fetch", remote])?;
        info!(event = "core.git.fetch_completed", remote = remote);
        Ok(())
    }

    fn has_remote(&self, path: &Path, remote: &str) -> Result<bool, GitError> {
        let repo = self.open_repo(path)?;
        match repo.find_remote(remote) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => {
                debug!(
                    event = "core.git.remote_check_failed",
                    path = %path.display(),
                    error = %e
                );
                Ok(false)
            }
        }
    }

    fn commits_ahead(&self, path: &Path, reference: &str) -> Result<usize, GitError> {
        let (ahead, _behind) = self.ahead_behind(path, reference)?;
        Ok(ahead)
    }

    fn commits_behind(&self, path: &Path, reference: &str) -> Result<usize, GitError> {
        let (_ahead, behind) = self.ahead_behind(path, reference)?;
        Ok(behind)
    }
}

impl GitCli {
    /// Count commits ahead/behind between `path`'s HEAD and `reference`.
    fn ahead_behind(&self, path: &Path, reference: &str) -> Result<(usize, usize), GitError> {
        let repo = self.open_repo(path)?;

        let local = repo
            .head()
            .map_err(|e| GitError::Git2Error { source: e })?
            .target()
            .ok_or_else(|| GitError::OperationFailed {
                message: format!("HEAD has no target in {}", path.display()),
            })?;

        let upstream = repo
            .revparse_single(reference)
            .map_err(|_| GitError::BranchNotFound {
                branch: reference.to_string(),
            })?
            .id();

        repo.graph_ahead_behind(local, upstream)
            .map_err(|e| GitError::Git2Error { source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_git_arg_rejects_dash_prefix() {
        let result = validate_git_arg("--evil", "test");
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("must not start with '-'"));
    }

    #[test]
    fn test_validate_git_arg_rejects_control_chars() {
        let result = validate_git_arg("hello\x00world", "test");
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("control characters"));
    }

    #[test]
    fn test_validate_git_arg_rejects_double_colon() {
        let result = validate_git_arg("refs::heads", "test");
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("'::'"));
    }

    #[test]
    fn test_validate_git_arg_accepts_valid_values() {
        assert!(validate_git_arg("origin", "remote").is_ok());
        assert!(validate_git_arg("main", "branch").is_ok());
        assert!(validate_git_arg("feature/auth", "branch").is_ok());
        assert!(validate_git_arg("origin/main", "ref").is_ok());
    }

    #[test]
    fn test_validate_branch_name() {
        assert_eq!(validate_branch_name(" main ").unwrap(), "main");
        assert!(validate_branch_name("").is_err());
        assert!(validate_branch_name("a..b").is_err());
        assert!(validate_branch_name("-flag").is_err());
        assert!(validate_branch_name("has space").is_err());
    }

    #[test]
    fn test_output_indicates_conflict() {
        assert!(output_indicates_conflict(
            1,
            "CONFLICT (content): Merge conflict in src/lib.rs",
            ""
        ));
        assert!(output_indicates_conflict(
            1,
            "",
            "error: could not apply abc123... change"
        ));
        // Exit 0 never means conflict
        assert!(!output_indicates_conflict(0, "CONFLICT", ""));
        // Non-conflict failure
        assert!(!output_indicates_conflict(
            128,
            "",
            "fatal: not a git repository"
        ));
    }

    #[test]
    fn test_parse_worktree_list() {
        let output = "worktree /home/dev/project\n\
                      HEAD 1111111111111111111111111111111111111111\n\
                      branch refs/heads/main\n\
                      \n\
                      worktree /home/dev/.arbor/worktrees/project/auth\n\
                      HEAD 2222222222222222222222222222222222222222\n\
                      branch refs/heads/feature/auth\n\
                      \n\
                      worktree /home/dev/.arbor/worktrees/project/spike\n\
                      HEAD 3333333333333333333333333333333333333333\n\
                      detached\n";

        let worktrees = parse_worktree_list(output);
        assert_eq!(worktrees.len(), 3);

        assert!(worktrees[0].is_main);
        assert_eq!(worktrees[0].branch.as_deref(), Some("main"));

        assert!(!worktrees[1].is_main);
        assert_eq!(worktrees[1].branch.as_deref(), Some("feature/auth"));
        assert_eq!(
            worktrees[1].path,
            PathBuf::from("/home/dev/.arbor/worktrees/project/auth")
        );

        assert!(!worktrees[2].is_main);
        assert_eq!(worktrees[2].branch, None);
    }

    #[test]
    fn test_parse_worktree_list_empty() {
        assert!(parse_worktree_list("").is_empty());
    }
}
