use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::terminal::types::SessionPair;

/// One managed worktree: its repository, branch, registered terminal
/// windows, and creation time.
///
/// Keyed by absolute worktree path in the state registry. The `branch`
/// field is authoritative once a record exists; a path's directory name is
/// only a fallback identifier used before any record exists. A record
/// whose path is missing on disk is stale and must not be trusted for
/// terminal-session lookups until pruned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeRecord {
    pub path: PathBuf,
    pub repo_name: String,
    pub branch: String,
    pub primary_session_id: Option<String>,
    pub secondary_session_id: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl WorktreeRecord {
    /// The registered session pair, if both window ids are present.
    pub fn session(&self) -> Option<SessionPair> {
        match (&self.primary_session_id, &self.secondary_session_id) {
            (Some(primary), Some(secondary)) => Some(SessionPair {
                primary_id: primary.clone(),
                secondary_id: secondary.clone(),
            }),
            _ => None,
        }
    }

    /// Replace the registered session pair.
    pub fn set_session(&mut self, pair: Option<&SessionPair>) {
        self.primary_session_id = pair.map(|p| p.primary_id.clone());
        self.secondary_session_id = pair.map(|p| p.secondary_id.clone());
    }
}
