use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ArborError;

#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    #[error("Failed to serialize trust data: {message}")]
    SerializationFailed { message: String },

    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ArborError for TrustError {
    fn error_code(&self) -> &'static str {
        match self {
            TrustError::SerializationFailed { .. } => "TRUST_SERIALIZATION_FAILED",
            TrustError::IoError { .. } => "TRUST_IO_ERROR",
        }
    }
}

/// Approval flags recognized by the external assistant for one worktree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRecord {
    /// The assistant's first-run trust dialog is considered accepted.
    pub dialog_accepted: bool,
    /// The assistant's standard tool set is pre-approved.
    pub tools_preapproved: bool,
    /// RFC 3339 approval timestamp.
    pub approved_at: String,
}

impl TrustRecord {
    /// A fully pre-approved record stamped with the current time.
    pub fn approved_now() -> Self {
        Self {
            dialog_accepted: true,
            tools_preapproved: true,
            approved_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type TrustMap = BTreeMap<PathBuf, TrustRecord>;

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        tracing::warn!(
            event = "core.trust.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err,
            message = "Failed to clean up temp file after write error"
        );
    }
}

/// Durable map from worktree path to [`TrustRecord`].
#[derive(Debug, Clone)]
pub struct TrustStore {
    file: PathBuf,
}

impl TrustStore {
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Load the full registry; missing or corrupt files degrade to empty
    /// (corruption logged — the worst outcome is the assistant prompting
    /// once more).
    pub fn all(&self) -> Result<TrustMap, TrustError> {
        if !self.file.exists() {
            return Ok(TrustMap::new());
        }

        let content = fs::read_to_string(&self.file)?;
        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::error!(
                    event = "core.trust.json_parse_failed",
                    path = %self.file.display(),
                    error = %e,
                    "Trust file exists but contains invalid JSON - treating as empty"
                );
                Ok(TrustMap::new())
            }
        }
    }

    pub fn get(&self, key: &Path) -> Result<Option<TrustRecord>, TrustError> {
        Ok(self.all()?.get(key).cloned())
    }

    pub fn set(&self, key: &Path, record: TrustRecord) -> Result<(), TrustError> {
        let mut map = self.all()?;
        map.insert(key.to_path_buf(), record);
        self.save(&map)
    }

    /// Remove a record. Returns whether it was present.
    pub fn remove(&self, key: &Path) -> Result<bool, TrustError> {
        let mut map = self.all()?;
        let removed = map.remove(key).is_some();
        if removed {
            self.save(&map)?;
        }
        Ok(removed)
    }

    /// Remove records whose path is a descendant of `root` and no longer
    /// exists on disk.
    ///
    /// Paths outside `root` are never auto-pruned: the user may have
    /// approved directories arbor does not manage, and dropping those
    /// approvals is not this tool's call.
    pub fn prune_missing_under(&self, root: &Path) -> Result<usize, TrustError> {
        let mut map = self.all()?;
        let before = map.len();
        map.retain(|path, _| !path.starts_with(root) || path.exists());
        let removed = before - map.len();

        if removed > 0 {
            self.save(&map)?;
            tracing::info!(
                event = "core.trust.pruned",
                removed = removed,
                root = %root.display()
            );
        }
        Ok(removed)
    }

    fn save(&self, map: &TrustMap) -> Result<(), TrustError> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }

        let json =
            serde_json::to_string_pretty(map).map_err(|e| TrustError::SerializationFailed {
                message: e.to_string(),
            })?;

        let temp_file = self.file.with_extension("json.tmp");

        if let Err(e) = fs::write(&temp_file, &json) {
            cleanup_temp_file(&temp_file, &e);
            return Err(TrustError::IoError { source: e });
        }

        if let Err(e) = fs::rename(&temp_file, &self.file) {
            cleanup_temp_file(&temp_file, &e);
            return Err(TrustError::IoError { source: e });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = TrustStore::new(dir.path().join("trust.json"));
        let wt = dir.path().join("auth");

        assert!(store.get(&wt).unwrap().is_none());

        store.set(&wt, TrustRecord::approved_now()).unwrap();
        let loaded = store.get(&wt).unwrap().unwrap();
        assert!(loaded.dialog_accepted);
        assert!(loaded.tools_preapproved);

        assert!(store.remove(&wt).unwrap());
        assert!(!store.remove(&wt).unwrap());
    }

    #[test]
    fn test_prune_scoped_to_root() {
        let dir = TempDir::new().unwrap();
        let store = TrustStore::new(dir.path().join("trust.json"));
        let root = dir.path().join("worktrees");

        // Under root, missing on disk: pruned
        let managed_missing = root.join("project").join("gone");
        // Under root, still on disk: kept
        let managed_existing = root.join("project").join("alive");
        fs::create_dir_all(&managed_existing).unwrap();
        // Outside root, missing on disk: never auto-pruned
        let external_missing = dir.path().join("elsewhere").join("gone");

        store
            .set(&managed_missing, TrustRecord::approved_now())
            .unwrap();
        store
            .set(&managed_existing, TrustRecord::approved_now())
            .unwrap();
        store
            .set(&external_missing, TrustRecord::approved_now())
            .unwrap();

        let removed = store.prune_missing_under(&root).unwrap();
        assert_eq!(removed, 1);
        assert!(store.get(&managed_missing).unwrap().is_none());
        assert!(store.get(&managed_existing).unwrap().is_some());
        assert!(
            store.get(&external_missing).unwrap().is_some(),
            "Out-of-root paths must never be auto-pruned"
        );
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("trust.json");
        fs::write(&file, "]]").unwrap();

        let store = TrustStore::new(file);
        assert!(store.all().unwrap().is_empty());
    }
}
