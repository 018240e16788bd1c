//! Requests, hooks, and result value objects for the operation layer.
//!
//! Result objects are immutable, returned once per call, and never
//! persisted. Hooks are plain function references so front ends can inject
//! prompts, store mutations, and PR creation without the operation layer
//! knowing about them.

use std::path::{Path, PathBuf};

use crate::git::types::{SyncStrategy, WorktreeInfo};
use crate::terminal::types::SessionPair;

/// Callback failures are reported as plain strings: the operation layer
/// only ever logs them as warnings, it never branches on their contents.
pub type HookError = String;

pub type ConfirmFn<'a> = dyn Fn(&Path, &str) -> bool + 'a;
pub type CleanupFn<'a> = dyn Fn(&Path, &str) -> Result<(), HookError> + 'a;
pub type CreatePrFn<'a> = dyn Fn(&Path, &[String]) -> Result<String, HookError> + 'a;
pub type AdoptFn<'a> = dyn Fn(&WorktreeInfo) -> Result<(), HookError> + 'a;
pub type RemoveRecordFn<'a> = dyn Fn(&Path) -> Result<bool, HookError> + 'a;
pub type PruneStateFn<'a> = dyn Fn() -> Result<usize, HookError> + 'a;
pub type PruneTrustFn<'a> = dyn Fn(&Path) -> Result<usize, HookError> + 'a;
pub type ResolveWorktreeFn<'a> = dyn Fn(&WorktreeInfo) -> (String, Option<SessionPair>) + 'a;

// ---------------------------------------------------------------------------
// Sync

#[derive(Debug, Clone)]
pub struct SyncRequest<'a> {
    /// Main checkout path.
    pub repo: &'a Path,
    pub base_branch: &'a str,
    pub remote: &'a str,
    pub worktree_path: &'a Path,
    pub branch: &'a str,
    pub strategy: SyncStrategy,
    pub force: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub branch: String,
    /// The ref actually merged/rebased from after the remote/local tie-break.
    pub effective_source: String,
    pub ahead: usize,
    pub behind: usize,
    pub already_synced: bool,
    /// An interrupted merge/rebase was continued instead of starting fresh.
    pub resumed: bool,
    pub success: bool,
    pub dry_run: bool,
}

impl SyncResult {
    pub(crate) fn resumed(branch: &str, dry_run: bool) -> Self {
        Self {
            branch: branch.to_string(),
            effective_source: String::new(),
            ahead: 0,
            behind: 0,
            already_synced: false,
            resumed: true,
            success: true,
            dry_run,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncAllRequest<'a> {
    pub repo: &'a Path,
    pub base_branch: &'a str,
    pub remote: &'a str,
    pub strategy: SyncStrategy,
    pub force: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncAllSummary {
    pub synced: usize,
    pub already_synced: usize,
    pub skipped: usize,
    pub conflicts: usize,
}

// ---------------------------------------------------------------------------
// Merge

#[derive(Debug, Clone)]
pub struct MergeRequest<'a> {
    /// Main checkout path.
    pub repo: &'a Path,
    pub base_branch: &'a str,
    pub remote: &'a str,
    pub worktree_path: &'a Path,
    pub branch: &'a str,
    pub strategy: SyncStrategy,
    pub force: bool,
    pub dry_run: bool,
    pub create_pr: bool,
    pub no_cleanup: bool,
    pub pr_title: Option<&'a str>,
    pub pr_body: Option<&'a str>,
    pub pr_draft: bool,
}

pub struct MergeHooks<'a> {
    /// Tears down the worktree after a successful local merge.
    pub cleanup: &'a CleanupFn<'a>,
    /// Creates a pull request from a prepared argument list; returns its URL.
    pub create_pr: &'a CreatePrFn<'a>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub branch: String,
    /// No unpushed commits relative to base: a no-op, not an error.
    pub nothing_to_merge: bool,
    /// The feature branch was pushed (PR path).
    pub pushed: bool,
    pub pr_url: Option<String>,
    /// PR creation failed after the push succeeded (partial success).
    pub pr_failed: bool,
    /// The local merge into base completed.
    pub merged: bool,
    pub base_pushed: bool,
    pub cleaned_up: bool,
    /// An interrupted merge/rebase was continued instead of starting fresh.
    pub resumed: bool,
    pub success: bool,
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Delete

#[derive(Debug, Clone)]
pub struct DeleteRequest<'a> {
    pub repo: &'a Path,
    pub worktree_path: &'a Path,
    pub branch: &'a str,
    /// Registered session pair, resolved by the caller from the state store.
    pub session: Option<SessionPair>,
    pub delete_branch: bool,
    pub force: bool,
    pub dry_run: bool,
}

pub struct DeleteHooks<'a> {
    /// Safety confirmation; declining aborts with nothing mutated.
    pub confirm: &'a ConfirmFn<'a>,
    /// Removes the worktree record; returns whether one was present.
    pub remove_state: &'a RemoveRecordFn<'a>,
    /// Removes the trust record; returns whether one was present.
    pub remove_trust: &'a RemoveRecordFn<'a>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub path: PathBuf,
    pub branch: String,
    pub session_closed: bool,
    pub worktree_removed: bool,
    pub branch_deleted: bool,
    pub state_removed: bool,
    pub trust_removed: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteAllSummary {
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Discover

#[derive(Debug, Clone)]
pub struct DiscoverRequest<'a> {
    pub repo: &'a Path,
    /// Root under which arbor-managed worktrees conventionally live.
    pub worktrees_root: &'a Path,
    pub adopt: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmanagedKind {
    /// Under the conventional worktree root.
    ManagedRoot,
    /// Anywhere else on disk.
    External,
}

#[derive(Debug, Clone)]
pub struct UnmanagedWorktree {
    pub info: WorktreeInfo,
    pub kind: UnmanagedKind,
    pub adopted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoverResult {
    pub tracked: Vec<WorktreeInfo>,
    pub unmanaged: Vec<UnmanagedWorktree>,
    pub adopted: usize,
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Prune

pub struct PruneHooks<'a> {
    pub prune_state: &'a PruneStateFn<'a>,
    /// Trust pruning is optional: front ends without a trust store skip it.
    pub prune_trust: Option<&'a PruneTrustFn<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneResult {
    pub state_removed: usize,
    pub trust_removed: usize,
    /// Whether the version-control-level prune pass ran successfully.
    pub git_pruned: bool,
    pub dry_run: bool,
}
