//! Worktree registry persistence.
//!
//! Reads and writes the state document with atomic operations: every save
//! goes to a scoped temp file first and is renamed into place, so a reader
//! never observes a partially written document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::errors::StateError;
use crate::state::types::WorktreeRecord;

type StateMap = BTreeMap<PathBuf, WorktreeRecord>;

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        tracing::warn!(
            event = "core.state.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err,
            message = "Failed to clean up temp file after write error"
        );
    }
}

/// Durable map from worktree path to [`WorktreeRecord`].
#[derive(Debug, Clone)]
pub struct WorktreeStateStore {
    file: PathBuf,
}

impl WorktreeStateStore {
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Load the full registry.
    ///
    /// A missing file is an empty registry. A corrupt file also degrades to
    /// empty, with an error event logged: the registry is rebuildable via
    /// discovery, so refusing to start over a bad file helps nobody.
    pub fn all(&self) -> Result<StateMap, StateError> {
        if !self.file.exists() {
            return Ok(StateMap::new());
        }

        let content = fs::read_to_string(&self.file)?;
        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::error!(
                    event = "core.state.json_parse_failed",
                    path = %self.file.display(),
                    error = %e,
                    "State file exists but contains invalid JSON - treating as empty"
                );
                Ok(StateMap::new())
            }
        }
    }

    pub fn get(&self, key: &Path) -> Result<Option<WorktreeRecord>, StateError> {
        Ok(self.all()?.get(key).cloned())
    }

    /// Find the record for a branch, if one exists.
    pub fn find_by_branch(&self, branch: &str) -> Result<Option<WorktreeRecord>, StateError> {
        Ok(self
            .all()?
            .into_values()
            .find(|record| record.branch == branch))
    }

    /// Insert or replace the record keyed by its path.
    pub fn set(&self, record: WorktreeRecord) -> Result<(), StateError> {
        let mut map = self.all()?;
        map.insert(record.path.clone(), record);
        self.save(&map)
    }

    /// Remove a record. Returns whether it was present.
    pub fn remove(&self, key: &Path) -> Result<bool, StateError> {
        let mut map = self.all()?;
        let removed = map.remove(key).is_some();
        if removed {
            self.save(&map)?;
        } else {
            tracing::warn!(
                event = "core.state.remove_nonexistent_record",
                path = %key.display(),
                message = "Attempted to remove record that doesn't exist - possible state inconsistency"
            );
        }
        Ok(removed)
    }

    /// Remove every record whose worktree path no longer exists on disk.
    ///
    /// Returns the number of records removed.
    pub fn prune_missing(&self) -> Result<usize, StateError> {
        let mut map = self.all()?;
        let before = map.len();
        map.retain(|path, _| path.exists());
        let removed = before - map.len();

        if removed > 0 {
            self.save(&map)?;
            tracing::info!(event = "core.state.pruned", removed = removed);
        }
        Ok(removed)
    }

    fn save(&self, map: &StateMap) -> Result<(), StateError> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }

        let json =
            serde_json::to_string_pretty(map).map_err(|e| StateError::SerializationFailed {
                message: e.to_string(),
            })?;

        let temp_file = self.file.with_extension("json.tmp");

        if let Err(e) = fs::write(&temp_file, &json) {
            cleanup_temp_file(&temp_file, &e);
            return Err(StateError::IoError { source: e });
        }

        if let Err(e) = fs::rename(&temp_file, &self.file) {
            cleanup_temp_file(&temp_file, &e);
            return Err(StateError::IoError { source: e });
        }

        Ok(())
    }
}
