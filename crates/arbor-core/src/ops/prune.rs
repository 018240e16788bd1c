//! Drop registry entries and git bookkeeping for worktrees that no longer
//! exist on disk.
//!
//! Three independent sub-steps: state registry, trust registry (scoped to
//! the managed worktree root), and the version-control tool's own prune.
//! Each step's failure is a warning; the remaining steps always run.

use std::path::Path;

use tracing::{info, warn};

use crate::git::client::VersionControl;
use crate::ops::types::{PruneHooks, PruneResult};

pub fn prune(
    git: &dyn VersionControl,
    repo: &Path,
    worktrees_root: &Path,
    dry_run: bool,
    hooks: &PruneHooks,
) -> PruneResult {
    info!(event = "core.prune.started", dry_run = dry_run);

    let mut result = PruneResult {
        dry_run,
        ..Default::default()
    };

    if dry_run {
        info!(event = "core.prune.would_prune");
        return result;
    }

    match (hooks.prune_state)() {
        Ok(removed) => result.state_removed = removed,
        Err(e) => {
            warn!(
                event = "core.prune.state_failed",
                error = %e,
                "State registry prune failed - continuing"
            );
        }
    }

    if let Some(prune_trust) = hooks.prune_trust {
        match prune_trust(worktrees_root) {
            Ok(removed) => result.trust_removed = removed,
            Err(e) => {
                warn!(
                    event = "core.prune.trust_failed",
                    error = %e,
                    "Trust registry prune failed - continuing"
                );
            }
        }
    }

    match git.prune_worktrees(repo) {
        Ok(()) => result.git_pruned = true,
        Err(e) => {
            warn!(
                event = "core.prune.git_failed",
                error = %e,
                "git worktree prune failed"
            );
        }
    }

    info!(
        event = "core.prune.completed",
        state_removed = result.state_removed,
        trust_removed = result.trust_removed,
        git_pruned = result.git_pruned
    );

    result
}
