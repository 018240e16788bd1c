use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a worktree is brought up to date with, or folded back into, its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStrategy {
    Merge,
    Rebase,
}

impl SyncStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "merge" => Some(SyncStrategy::Merge),
            "rebase" => Some(SyncStrategy::Rebase),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStrategy::Merge => write!(f, "merge"),
            SyncStrategy::Rebase => write!(f, "rebase"),
        }
    }
}

/// One entry from the version-control tool's worktree list.
///
/// Ephemeral: recomputed on every listing, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeInfo {
    /// Absolute path of the working directory.
    pub path: PathBuf,
    /// Checked-out branch, if not detached.
    pub branch: Option<String>,
    /// HEAD commit id, if known.
    pub head: Option<String>,
    /// Whether this is the main checkout (the repository itself).
    pub is_main: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_strategy_parse() {
        assert_eq!(SyncStrategy::parse("merge"), Some(SyncStrategy::Merge));
        assert_eq!(SyncStrategy::parse("rebase"), Some(SyncStrategy::Rebase));
        assert_eq!(SyncStrategy::parse("squash"), None);
    }

    #[test]
    fn test_sync_strategy_display() {
        assert_eq!(SyncStrategy::Merge.to_string(), "merge");
        assert_eq!(SyncStrategy::Rebase.to_string(), "rebase");
    }
}
