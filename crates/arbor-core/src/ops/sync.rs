//! Sync a worktree with its base branch.
//!
//! Safely re-runnable: an interrupted merge or rebase is detected through
//! the version-control tool's own in-progress markers and continued rather
//! than restarted.

use tracing::{info, warn};

use crate::git::client::VersionControl;
use crate::git::types::SyncStrategy;
use crate::ops::errors::OpError;
use crate::ops::types::{SyncAllRequest, SyncAllSummary, SyncRequest, SyncResult};
use crate::resolve;

/// Which interrupted operation the continuation path is finishing.
enum InProgress {
    Merge,
    Rebase,
}

/// Bring one worktree up to date with the base branch.
pub fn sync(git: &dyn VersionControl, req: &SyncRequest) -> Result<SyncResult, OpError> {
    sync_inner(git, req, true)
}

fn sync_inner(
    git: &dyn VersionControl,
    req: &SyncRequest,
    do_fetch: bool,
) -> Result<SyncResult, OpError> {
    info!(
        event = "core.sync.started",
        branch = req.branch,
        base = req.base_branch,
        strategy = %req.strategy,
        force = req.force,
        dry_run = req.dry_run
    );

    // 1. Idempotent resume: an in-progress marker wins over everything
    //    else, including the dirty check - a half-finished merge is dirty
    //    by definition, and "resolve, stage, re-run" has to land here
    if git.is_merge_in_progress(req.worktree_path)? {
        return continue_in_progress(git, req, InProgress::Merge);
    }
    if git.is_rebase_in_progress(req.worktree_path)? {
        return continue_in_progress(git, req, InProgress::Rebase);
    }

    // 2. Safety: never touch a dirty worktree without --force
    if !req.force && git.is_dirty(req.worktree_path)? {
        return Err(OpError::SafetyAbort {
            reason: format!(
                "Worktree '{}' has uncommitted changes. Commit or stash them, or re-run with --force.",
                req.branch
            ),
        });
    }

    // 3. Merge source: prefer the remote-tracking ref when a remote exists
    let has_remote = git.has_remote(req.worktree_path, req.remote)?;
    let mut source = if has_remote {
        if req.dry_run {
            info!(
                event = "core.sync.would_fetch",
                remote = req.remote,
                branch = req.branch
            );
        } else if do_fetch {
            git.fetch(req.worktree_path, req.remote)?;
        }
        format!("{}/{}", req.remote, req.base_branch)
    } else {
        req.base_branch.to_string()
    };

    // 4. Tie-break: commits pushed to the local base but not yet to the
    //    remote are invisible to the remote-tracking ref. If the local base
    //    is strictly further ahead of us, it is the better source.
    let mut behind = git.commits_behind(req.worktree_path, &source)?;
    if source != req.base_branch {
        let local_behind = git.commits_behind(req.worktree_path, req.base_branch)?;
        if local_behind > behind {
            info!(
                event = "core.sync.source_tiebreak_local",
                remote_behind = behind,
                local_behind = local_behind,
                base = req.base_branch
            );
            source = req.base_branch.to_string();
            behind = local_behind;
        }
    }
    let ahead = git.commits_ahead(req.worktree_path, &source)?;

    // 5. Nothing to do
    if behind == 0 {
        info!(event = "core.sync.already_synced", branch = req.branch);
        return Ok(SyncResult {
            branch: req.branch.to_string(),
            effective_source: source,
            ahead,
            behind,
            already_synced: true,
            resumed: false,
            success: true,
            dry_run: req.dry_run,
        });
    }

    if req.dry_run {
        info!(
            event = "core.sync.would_sync",
            branch = req.branch,
            source = %source,
            behind = behind,
            strategy = %req.strategy
        );
        return Ok(SyncResult {
            branch: req.branch.to_string(),
            effective_source: source,
            ahead,
            behind,
            already_synced: false,
            resumed: false,
            success: true,
            dry_run: true,
        });
    }

    let merged = match req.strategy {
        SyncStrategy::Merge => git.merge(req.worktree_path, &source),
        SyncStrategy::Rebase => git.rebase(req.worktree_path, &source),
    };

    if let Err(e) = merged {
        if e.is_conflict() {
            return Err(OpError::Conflict {
                operation: "Sync".to_string(),
                path: req.worktree_path.to_path_buf(),
            });
        }
        return Err(OpError::Git { source: e });
    }

    info!(
        event = "core.sync.completed",
        branch = req.branch,
        source = %source,
        behind = behind
    );

    Ok(SyncResult {
        branch: req.branch.to_string(),
        effective_source: source,
        ahead,
        behind,
        already_synced: false,
        resumed: false,
        success: true,
        dry_run: false,
    })
}

/// Continuation path: finish an interrupted merge or rebase.
///
/// Never starts a new merge/rebase, and never calls the continue primitive
/// while unresolved conflict markers remain.
fn continue_in_progress(
    git: &dyn VersionControl,
    req: &SyncRequest,
    kind: InProgress,
) -> Result<SyncResult, OpError> {
    if git.has_conflicts(req.worktree_path)? {
        return Err(OpError::UnresolvedConflicts {
            path: req.worktree_path.to_path_buf(),
        });
    }

    if req.dry_run {
        info!(event = "core.sync.would_continue", branch = req.branch);
        return Ok(SyncResult::resumed(req.branch, true));
    }

    match kind {
        InProgress::Merge => git.merge_continue(req.worktree_path)?,
        InProgress::Rebase => git.rebase_continue(req.worktree_path)?,
    }

    info!(event = "core.sync.resumed", branch = req.branch);
    Ok(SyncResult::resumed(req.branch, false))
}

/// Sync every known worktree except the main checkout.
///
/// Fetches once up front, then iterates strictly sequentially: concurrent
/// git operations against the same main checkout are unsafe. Dirty (without
/// force) and in-progress worktrees are skipped, not failed.
pub fn sync_all(
    git: &dyn VersionControl,
    req: &SyncAllRequest,
) -> Result<SyncAllSummary, OpError> {
    info!(
        event = "core.sync.all_started",
        base = req.base_branch,
        strategy = %req.strategy
    );

    if !req.dry_run && git.has_remote(req.repo, req.remote)? {
        if let Err(e) = git.fetch(req.repo, req.remote) {
            warn!(
                event = "core.sync.all_fetch_failed",
                remote = req.remote,
                error = %e,
                "Fetch failed - syncing against possibly stale remote refs"
            );
        }
    }

    let mut summary = SyncAllSummary::default();

    for wt in git.list_worktrees(req.repo)? {
        if wt.is_main {
            continue;
        }

        let branch = match &wt.branch {
            Some(branch) => branch.clone(),
            None => resolve::branch_dir_name_of(&wt.path),
        };

        if git.is_merge_in_progress(&wt.path)? || git.is_rebase_in_progress(&wt.path)? {
            info!(
                event = "core.sync.all_skipped_in_progress",
                branch = %branch,
                path = %wt.path.display()
            );
            summary.skipped += 1;
            continue;
        }

        if !req.force && git.is_dirty(&wt.path)? {
            info!(
                event = "core.sync.all_skipped_dirty",
                branch = %branch,
                path = %wt.path.display()
            );
            summary.skipped += 1;
            continue;
        }

        let wt_req = SyncRequest {
            repo: req.repo,
            base_branch: req.base_branch,
            remote: req.remote,
            worktree_path: &wt.path,
            branch: &branch,
            strategy: req.strategy,
            force: req.force,
            dry_run: req.dry_run,
        };

        match sync_inner(git, &wt_req, false) {
            Ok(result) if result.already_synced => summary.already_synced += 1,
            Ok(_) => summary.synced += 1,
            Err(OpError::Conflict { .. }) | Err(OpError::UnresolvedConflicts { .. }) => {
                warn!(
                    event = "core.sync.all_conflict",
                    branch = %branch,
                    path = %wt.path.display()
                );
                summary.conflicts += 1;
            }
            Err(e) => {
                warn!(
                    event = "core.sync.all_worktree_failed",
                    branch = %branch,
                    error = %e
                );
                summary.skipped += 1;
            }
        }
    }

    info!(
        event = "core.sync.all_completed",
        synced = summary.synced,
        already_synced = summary.already_synced,
        skipped = summary.skipped,
        conflicts = summary.conflicts
    );

    Ok(summary)
}
