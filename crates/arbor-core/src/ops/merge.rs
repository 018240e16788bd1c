//! Merge a worktree's branch back into the base branch, or raise a pull
//! request for it.
//!
//! The local-merge path operates on two checkouts at once: the rebase step
//! runs in the worktree, the (fast-forward) merge into base runs in the
//! main checkout. An interrupted run is picked up via the in-progress
//! markers of whichever checkout was mid-operation.

use tracing::{info, warn};

use crate::git::client::VersionControl;
use crate::git::types::SyncStrategy;
use crate::ops::errors::OpError;
use crate::ops::types::{MergeHooks, MergeRequest, MergeResult};

/// Build the PR-creation argument list for the forge CLI.
///
/// Explicit title/body when given; otherwise the tool's auto-fill.
pub(crate) fn build_pr_args(
    title: Option<&str>,
    body: Option<&str>,
    draft: bool,
) -> Vec<String> {
    let mut args = vec!["pr".to_string(), "create".to_string()];

    match (title, body) {
        (None, None) => args.push("--fill".to_string()),
        (title, body) => {
            if let Some(title) = title {
                args.push("--title".to_string());
                args.push(title.to_string());
            } else {
                args.push("--fill".to_string());
            }
            args.push("--body".to_string());
            args.push(body.unwrap_or("").to_string());
        }
    }

    if draft {
        args.push("--draft".to_string());
    }

    args
}

/// Fold one worktree's branch back into the base branch.
pub fn merge(
    git: &dyn VersionControl,
    req: &MergeRequest,
    hooks: &MergeHooks,
) -> Result<MergeResult, OpError> {
    info!(
        event = "core.merge.started",
        branch = req.branch,
        base = req.base_branch,
        strategy = %req.strategy,
        create_pr = req.create_pr,
        dry_run = req.dry_run
    );

    // Idempotent resume first: a half-finished merge sits in the main
    // checkout, a half-finished rebase in the worktree, and either leaves
    // the tree dirty - so this must precede the dirty check for "resolve,
    // stage, re-run" to land here
    if !req.create_pr && !req.dry_run {
        if git.is_merge_in_progress(req.repo)? {
            if git.has_conflicts(req.repo)? {
                return Err(OpError::UnresolvedConflicts {
                    path: req.repo.to_path_buf(),
                });
            }
            git.merge_continue(req.repo)?;
            info!(event = "core.merge.resumed_merge", branch = req.branch);
            return Ok(finish(git, req, hooks, true));
        }
        if git.is_rebase_in_progress(req.worktree_path)? {
            if git.has_conflicts(req.worktree_path)? {
                return Err(OpError::UnresolvedConflicts {
                    path: req.worktree_path.to_path_buf(),
                });
            }
            git.rebase_continue(req.worktree_path)?;
            info!(event = "core.merge.resumed_rebase", branch = req.branch);
            return Ok(MergeResult {
                branch: req.branch.to_string(),
                resumed: true,
                success: true,
                ..Default::default()
            });
        }
    }

    // 1. Safety: never merge from a dirty worktree without --force
    if !req.force && git.is_dirty(req.worktree_path)? {
        return Err(OpError::SafetyAbort {
            reason: format!(
                "Worktree '{}' has uncommitted changes. Commit or stash them, or re-run with --force.",
                req.branch
            ),
        });
    }

    // 2. Nothing to merge is a no-op, not an error
    if !git.has_unpushed_commits(req.worktree_path, req.base_branch)? {
        info!(event = "core.merge.nothing_to_merge", branch = req.branch);
        return Ok(MergeResult {
            branch: req.branch.to_string(),
            nothing_to_merge: true,
            success: true,
            dry_run: req.dry_run,
            ..Default::default()
        });
    }

    if req.dry_run {
        info!(
            event = "core.merge.would_merge",
            branch = req.branch,
            via = if req.create_pr { "pr" } else { "local" }
        );
        return Ok(MergeResult {
            branch: req.branch.to_string(),
            success: true,
            dry_run: true,
            ..Default::default()
        });
    }

    if req.create_pr {
        merge_via_pr(git, req, hooks)
    } else {
        merge_locally(git, req, hooks)
    }
}

/// Push the branch and raise a pull request for it.
fn merge_via_pr(
    git: &dyn VersionControl,
    req: &MergeRequest,
    hooks: &MergeHooks,
) -> Result<MergeResult, OpError> {
    git.push(req.worktree_path, req.remote, req.branch, true)?;

    let args = build_pr_args(req.pr_title, req.pr_body, req.pr_draft);

    match (hooks.create_pr)(req.worktree_path, &args) {
        Ok(url) => {
            info!(event = "core.merge.pr_created", branch = req.branch, url = %url);
            Ok(MergeResult {
                branch: req.branch.to_string(),
                pushed: true,
                pr_url: Some(url),
                success: true,
                ..Default::default()
            })
        }
        Err(e) => {
            // The push already landed; the PR can be raised manually or by
            // re-running. Partial success, not retried automatically.
            warn!(
                event = "core.merge.pr_creation_failed",
                branch = req.branch,
                error = %e,
                "PR creation failed - branch was pushed, create the PR manually or re-run"
            );
            Ok(MergeResult {
                branch: req.branch.to_string(),
                pushed: true,
                pr_failed: true,
                success: true,
                ..Default::default()
            })
        }
    }
}

/// Merge the branch into the base branch in the main checkout.
fn merge_locally(
    git: &dyn VersionControl,
    req: &MergeRequest,
    hooks: &MergeHooks,
) -> Result<MergeResult, OpError> {
    // The merge happens in the main checkout, which must be sitting on base
    let current = git.current_branch(req.repo)?;
    if current.as_deref() != Some(req.base_branch) {
        return Err(OpError::WrongBranch {
            current: current.unwrap_or_else(|| "detached HEAD".to_string()),
            required: req.base_branch.to_string(),
        });
    }

    // Bring base up to date first; a failed pull is a warning, the merge
    // proceeds against whatever base we have
    if git.has_remote(req.repo, req.remote)? {
        if let Err(e) = git.pull(req.repo, req.remote, req.base_branch) {
            warn!(
                event = "core.merge.pull_failed",
                base = req.base_branch,
                error = %e,
                "Pull failed - merging against the local base branch"
            );
        }
    }

    match req.strategy {
        SyncStrategy::Rebase => {
            // Rebase in the worktree, then fast-forward base onto the
            // rebased tip in the main checkout: linear history, two steps
            if let Err(e) = git.rebase(req.worktree_path, req.base_branch) {
                if e.is_conflict() {
                    return Err(OpError::Conflict {
                        operation: "Rebase".to_string(),
                        path: req.worktree_path.to_path_buf(),
                    });
                }
                return Err(OpError::Git { source: e });
            }
            if let Err(e) = git.merge(req.repo, req.branch) {
                if e.is_conflict() {
                    return Err(OpError::Conflict {
                        operation: "Merge".to_string(),
                        path: req.repo.to_path_buf(),
                    });
                }
                return Err(OpError::Git { source: e });
            }
        }
        SyncStrategy::Merge => {
            if let Err(e) = git.merge(req.repo, req.branch) {
                if e.is_conflict() {
                    return Err(OpError::Conflict {
                        operation: "Merge".to_string(),
                        path: req.repo.to_path_buf(),
                    });
                }
                return Err(OpError::Git { source: e });
            }
        }
    }

    info!(
        event = "core.merge.completed",
        branch = req.branch,
        base = req.base_branch
    );

    Ok(finish(git, req, hooks, false))
}

/// Post-merge steps: push base, then clean up the worktree.
///
/// Both are secondary - the merge itself already succeeded, so failures
/// here are warnings, never errors.
fn finish(
    git: &dyn VersionControl,
    req: &MergeRequest,
    hooks: &MergeHooks,
    resumed: bool,
) -> MergeResult {
    let mut base_pushed = false;
    match git.has_remote(req.repo, req.remote) {
        Ok(true) => match git.push(req.repo, req.remote, req.base_branch, false) {
            Ok(()) => base_pushed = true,
            Err(e) => {
                warn!(
                    event = "core.merge.base_push_failed",
                    base = req.base_branch,
                    error = %e,
                    "Push of base branch failed - push manually"
                );
            }
        },
        Ok(false) => {}
        Err(e) => {
            warn!(
                event = "core.merge.remote_check_failed",
                error = %e
            );
        }
    }

    let mut cleaned_up = false;
    if req.no_cleanup {
        info!(event = "core.merge.cleanup_skipped", branch = req.branch);
    } else {
        match (hooks.cleanup)(req.worktree_path, req.branch) {
            Ok(()) => cleaned_up = true,
            Err(e) => {
                warn!(
                    event = "core.merge.cleanup_failed",
                    branch = req.branch,
                    error = %e,
                    "Worktree cleanup failed - the merge itself succeeded"
                );
            }
        }
    }

    MergeResult {
        branch: req.branch.to_string(),
        merged: true,
        base_pushed,
        cleaned_up,
        resumed,
        success: true,
        ..Default::default()
    }
}
