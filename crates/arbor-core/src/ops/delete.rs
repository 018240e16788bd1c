//! Tear down a worktree: terminal session, git worktree, branch, records.
//!
//! The ordering matters for crash tolerance: the session close and record
//! removals are best-effort and re-runnable, while the git worktree removal
//! is the one primary step whose failure aborts the teardown.

use tracing::{info, warn};

use crate::git::client::VersionControl;
use crate::ops::errors::OpError;
use crate::ops::types::{
    DeleteAllSummary, DeleteHooks, DeleteOutcome, DeleteRequest, ResolveWorktreeFn,
};
use crate::terminal::client::TerminalSessions;

/// Delete one worktree and everything registered for it.
pub fn delete(
    git: &dyn VersionControl,
    term: &dyn TerminalSessions,
    req: &DeleteRequest,
    hooks: &DeleteHooks,
) -> Result<DeleteOutcome, OpError> {
    info!(
        event = "core.delete.started",
        branch = req.branch,
        path = %req.worktree_path.display(),
        force = req.force,
        dry_run = req.dry_run
    );

    // 1. Safety check (skipped entirely under --force); declining mutates
    //    nothing
    if !req.force && !(hooks.confirm)(req.worktree_path, req.branch) {
        return Err(OpError::SafetyAbort {
            reason: format!(
                "Deletion of '{}' declined. Re-run with --force to skip the check.",
                req.branch
            ),
        });
    }

    if req.dry_run {
        info!(
            event = "core.delete.would_delete",
            branch = req.branch,
            path = %req.worktree_path.display()
        );
        return Ok(DeleteOutcome {
            path: req.worktree_path.to_path_buf(),
            branch: req.branch.to_string(),
            dry_run: true,
            ..Default::default()
        });
    }

    // 2. Close the registered session pair if it is verifiably alive.
    //    Best-effort: a dead or unclosable window never blocks teardown.
    let mut session_closed = false;
    if let Some(pair) = &req.session {
        for id in [&pair.primary_id, &pair.secondary_id] {
            match term.session_exists(id) {
                Ok(true) => match term.close_window(id) {
                    Ok(()) => {
                        session_closed = true;
                        info!(event = "core.delete.window_closed", window_id = %id);
                    }
                    Err(e) => {
                        warn!(
                            event = "core.delete.window_close_failed",
                            window_id = %id,
                            error = %e,
                            "Failed to close window - continuing teardown"
                        );
                    }
                },
                Ok(false) => {
                    info!(event = "core.delete.window_already_gone", window_id = %id);
                }
                Err(e) => {
                    warn!(
                        event = "core.delete.window_check_failed",
                        window_id = %id,
                        error = %e,
                        "Could not verify window - continuing teardown"
                    );
                }
            }
        }
    }

    // 3. Remove the worktree. This is the primary step: failure is fatal
    //    and no partial teardown proceeds past it.
    git.remove_worktree(req.repo, req.worktree_path, req.force)?;
    info!(
        event = "core.delete.worktree_removed",
        path = %req.worktree_path.display()
    );

    // 4. Branch deletion never blocks the rest of teardown
    let mut branch_deleted = false;
    if req.delete_branch {
        match git.delete_branch(req.repo, req.branch, false) {
            Ok(()) => branch_deleted = true,
            Err(e) if req.force => match git.delete_branch(req.repo, req.branch, true) {
                Ok(()) => branch_deleted = true,
                Err(forced_err) => {
                    warn!(
                        event = "core.delete.branch_delete_failed",
                        branch = req.branch,
                        safe_error = %e,
                        forced_error = %forced_err,
                        "Branch deletion failed - delete it manually"
                    );
                }
            },
            Err(e) => {
                warn!(
                    event = "core.delete.branch_delete_failed",
                    branch = req.branch,
                    error = %e,
                    "Branch not deleted (likely unmerged commits) - use --force or delete manually"
                );
            }
        }
    }

    // 5. Registry cleanup, both best-effort
    let state_removed = match (hooks.remove_state)(req.worktree_path) {
        Ok(removed) => removed,
        Err(e) => {
            warn!(
                event = "core.delete.state_remove_failed",
                path = %req.worktree_path.display(),
                error = %e
            );
            false
        }
    };
    let trust_removed = match (hooks.remove_trust)(req.worktree_path) {
        Ok(removed) => removed,
        Err(e) => {
            warn!(
                event = "core.delete.trust_remove_failed",
                path = %req.worktree_path.display(),
                error = %e
            );
            false
        }
    };

    info!(
        event = "core.delete.completed",
        branch = req.branch,
        session_closed = session_closed,
        branch_deleted = branch_deleted
    );

    Ok(DeleteOutcome {
        path: req.worktree_path.to_path_buf(),
        branch: req.branch.to_string(),
        session_closed,
        worktree_removed: true,
        branch_deleted,
        state_removed,
        trust_removed,
        dry_run: false,
    })
}

/// Delete every worktree except the main checkout.
///
/// A declined safety check skips that worktree, never the batch. Ends with
/// a version-control-level prune pass.
#[allow(clippy::too_many_arguments)]
pub fn delete_all(
    git: &dyn VersionControl,
    term: &dyn TerminalSessions,
    repo: &std::path::Path,
    delete_branches: bool,
    force: bool,
    dry_run: bool,
    resolve: &ResolveWorktreeFn,
    hooks: &DeleteHooks,
) -> Result<DeleteAllSummary, OpError> {
    info!(event = "core.delete.all_started", force = force, dry_run = dry_run);

    let mut summary = DeleteAllSummary::default();

    for wt in git.list_worktrees(repo)? {
        if wt.is_main {
            continue;
        }

        let (branch, session) = resolve(&wt);
        let req = DeleteRequest {
            repo,
            worktree_path: &wt.path,
            branch: &branch,
            session,
            delete_branch: delete_branches,
            force,
            dry_run,
        };

        match delete(git, term, &req, hooks) {
            Ok(_) => summary.deleted += 1,
            Err(OpError::SafetyAbort { .. }) => {
                info!(
                    event = "core.delete.all_skipped",
                    branch = %branch,
                    path = %wt.path.display()
                );
                summary.skipped += 1;
            }
            Err(e) => {
                warn!(
                    event = "core.delete.all_worktree_failed",
                    branch = %branch,
                    error = %e
                );
                summary.failed += 1;
            }
        }
    }

    if !dry_run {
        if let Err(e) = git.prune_worktrees(repo) {
            warn!(
                event = "core.delete.all_prune_failed",
                error = %e,
                "Worktree prune failed after batch delete"
            );
        }
    }

    info!(
        event = "core.delete.all_completed",
        deleted = summary.deleted,
        skipped = summary.skipped,
        failed = summary.failed
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockGit;
    use crate::git::types::WorktreeInfo;
    use crate::terminal::mock::MockTerminal;
    use crate::terminal::types::SessionPair;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    fn request<'a>(wt: &'a Path, repo: &'a Path) -> DeleteRequest<'a> {
        DeleteRequest {
            repo,
            worktree_path: wt,
            branch: "feature/auth",
            session: None,
            delete_branch: true,
            force: false,
            dry_run: false,
        }
    }

    fn accepting_hooks<'a>() -> DeleteHooks<'a> {
        DeleteHooks {
            confirm: &|_, _| true,
            remove_state: &|_| Ok(true),
            remove_trust: &|_| Ok(true),
        }
    }

    #[test]
    fn test_declined_confirmation_mutates_nothing() {
        let git = MockGit::default();
        let term = MockTerminal::new();
        let wt = PathBuf::from("/wt");
        let repo = PathBuf::from("/repo");
        let hooks = DeleteHooks {
            confirm: &|_, _| false,
            remove_state: &|_| Ok(true),
            remove_trust: &|_| Ok(true),
        };

        let result = delete(&git, &term, &request(&wt, &repo), &hooks);
        assert!(matches!(result, Err(OpError::SafetyAbort { .. })));
        assert!(git.recorded().is_empty());
        assert!(term.closed.borrow().is_empty());
    }

    #[test]
    fn test_force_skips_confirmation_entirely() {
        let git = MockGit::default();
        let term = MockTerminal::new();
        let wt = PathBuf::from("/wt");
        let repo = PathBuf::from("/repo");
        let confirm_called = RefCell::new(false);
        let hooks = DeleteHooks {
            confirm: &|_, _| {
                *confirm_called.borrow_mut() = true;
                false
            },
            remove_state: &|_| Ok(true),
            remove_trust: &|_| Ok(true),
        };
        let mut req = request(&wt, &repo);
        req.force = true;

        let outcome = delete(&git, &term, &req, &hooks).unwrap();
        assert!(outcome.worktree_removed);
        assert!(!*confirm_called.borrow(), "confirm must not run under --force");
        assert!(git.called("remove_worktree /wt force=true"));
    }

    #[test]
    fn test_live_session_is_closed_dead_session_is_not() {
        let git = MockGit::default();
        let term = MockTerminal::new().with_alive("@1");
        let wt = PathBuf::from("/wt");
        let repo = PathBuf::from("/repo");
        let mut req = request(&wt, &repo);
        req.session = Some(SessionPair {
            primary_id: "@1".to_string(),
            secondary_id: "@2".to_string(),
        });

        let outcome = delete(&git, &term, &req, &accepting_hooks()).unwrap();
        assert!(outcome.session_closed);
        assert_eq!(*term.closed.borrow(), vec!["@1".to_string()]);
    }

    #[test]
    fn test_session_close_failure_does_not_block() {
        let git = MockGit::default();
        let term = MockTerminal {
            fail_close: true,
            ..Default::default()
        }
        .with_alive("@1");
        let wt = PathBuf::from("/wt");
        let repo = PathBuf::from("/repo");
        let mut req = request(&wt, &repo);
        req.session = Some(SessionPair {
            primary_id: "@1".to_string(),
            secondary_id: "@2".to_string(),
        });

        let outcome = delete(&git, &term, &req, &accepting_hooks()).unwrap();
        assert!(outcome.worktree_removed);
        assert!(!outcome.session_closed);
    }

    #[test]
    fn test_worktree_removal_failure_is_fatal() {
        let git = MockGit {
            fail_remove_worktree: true,
            ..Default::default()
        };
        let term = MockTerminal::new();
        let wt = PathBuf::from("/wt");
        let repo = PathBuf::from("/repo");
        let state_removed = RefCell::new(false);
        let hooks = DeleteHooks {
            confirm: &|_, _| true,
            remove_state: &|_| {
                *state_removed.borrow_mut() = true;
                Ok(true)
            },
            remove_trust: &|_| Ok(true),
        };

        let result = delete(&git, &term, &request(&wt, &repo), &hooks);
        assert!(matches!(result, Err(OpError::Git { .. })));
        assert!(
            !*state_removed.borrow(),
            "no partial teardown past a failed worktree removal"
        );
        assert!(!git.called("delete_branch"));
    }

    #[test]
    fn test_safe_branch_delete_failure_warns_and_continues() {
        let git = MockGit {
            fail_safe_branch_delete: true,
            ..Default::default()
        };
        let term = MockTerminal::new();
        let wt = PathBuf::from("/wt");
        let repo = PathBuf::from("/repo");

        let outcome = delete(&git, &term, &request(&wt, &repo), &accepting_hooks()).unwrap();
        assert!(outcome.worktree_removed);
        assert!(!outcome.branch_deleted);
        assert!(outcome.state_removed);
        assert!(outcome.trust_removed);
        // No forced retry without --force
        assert!(!git.called("delete_branch feature/auth force=true"));
    }

    #[test]
    fn test_forced_retry_after_safe_delete_failure() {
        let git = MockGit {
            fail_safe_branch_delete: true,
            ..Default::default()
        };
        let term = MockTerminal::new();
        let wt = PathBuf::from("/wt");
        let repo = PathBuf::from("/repo");
        let mut req = request(&wt, &repo);
        req.force = true;

        let outcome = delete(&git, &term, &req, &accepting_hooks()).unwrap();
        assert!(outcome.branch_deleted);
        assert!(git.called("delete_branch feature/auth force=false"));
        assert!(git.called("delete_branch feature/auth force=true"));
    }

    #[test]
    fn test_record_removal_failure_is_best_effort() {
        let git = MockGit::default();
        let term = MockTerminal::new();
        let wt = PathBuf::from("/wt");
        let repo = PathBuf::from("/repo");
        let hooks = DeleteHooks {
            confirm: &|_, _| true,
            remove_state: &|_| Err("store unwritable".to_string()),
            remove_trust: &|_| Ok(false),
        };

        let outcome = delete(&git, &term, &request(&wt, &repo), &hooks).unwrap();
        assert!(outcome.worktree_removed);
        assert!(!outcome.state_removed);
        assert!(!outcome.trust_removed);
    }

    #[test]
    fn test_dry_run_mutates_nothing() {
        let git = MockGit::default();
        let term = MockTerminal::new().with_alive("@1");
        let wt = PathBuf::from("/wt");
        let repo = PathBuf::from("/repo");
        let mut req = request(&wt, &repo);
        req.dry_run = true;
        req.session = Some(SessionPair {
            primary_id: "@1".to_string(),
            secondary_id: "@2".to_string(),
        });

        let outcome = delete(&git, &term, &req, &accepting_hooks()).unwrap();
        assert!(outcome.dry_run);
        assert!(!outcome.worktree_removed);
        assert!(git.recorded().is_empty());
        assert!(term.closed.borrow().is_empty());
    }

    fn wt_info(path: &str, branch: Option<&str>, is_main: bool) -> WorktreeInfo {
        WorktreeInfo {
            path: PathBuf::from(path),
            branch: branch.map(|b| b.to_string()),
            head: None,
            is_main,
        }
    }

    #[test]
    fn test_delete_all_skips_declined_and_prunes() {
        let git = MockGit {
            worktrees: vec![
                wt_info("/repo", Some("main"), true),
                wt_info("/wts/auth", Some("feature/auth"), false),
                wt_info("/wts/api", Some("feature/api"), false),
            ],
            ..Default::default()
        };
        let term = MockTerminal::new();
        let repo = PathBuf::from("/repo");
        let hooks = DeleteHooks {
            // Decline only the api worktree
            confirm: &|path, _| !path.ends_with("api"),
            remove_state: &|_| Ok(true),
            remove_trust: &|_| Ok(true),
        };
        let resolve: &ResolveWorktreeFn = &|wt| {
            (
                wt.branch.clone().unwrap_or_else(|| "unknown".to_string()),
                None,
            )
        };

        let summary =
            delete_all(&git, &term, &repo, true, false, false, resolve, &hooks).unwrap();
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert!(git.called("prune_worktrees"));
        // Main checkout untouched
        assert!(!git.called("remove_worktree /repo"));
    }
}
