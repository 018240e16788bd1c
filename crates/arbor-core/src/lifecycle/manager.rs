//! The lifecycle manager: create, open, and delete one worktree per call.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::git::cli::validate_branch_name;
use crate::git::client::VersionControl;
use crate::lifecycle::errors::LifecycleError;
use crate::resolve;
use crate::state::store::WorktreeStateStore;
use crate::state::types::WorktreeRecord;
use crate::terminal::client::TerminalSessions;
use crate::terminal::types::{SessionPair, SessionVariant};
use crate::trust::store::{TrustRecord, TrustStore};

/// Options for [`LifecycleManager::delete`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOptions {
    pub delete_branch: bool,
    pub force: bool,
    pub dry_run: bool,
}

/// Explicit dependency bundle: the two clients and the two registries.
///
/// Everything is injected, nothing is reached for globally, so each
/// workflow is independently testable against the mock clients.
pub struct LifecycleManager<'a> {
    git: &'a dyn VersionControl,
    terminal: &'a dyn TerminalSessions,
    state: &'a WorktreeStateStore,
    trust: &'a TrustStore,
}

impl<'a> LifecycleManager<'a> {
    pub fn new(
        git: &'a dyn VersionControl,
        terminal: &'a dyn TerminalSessions,
        state: &'a WorktreeStateStore,
        trust: &'a TrustStore,
    ) -> Self {
        Self {
            git,
            terminal,
            state,
            trust,
        }
    }

    /// Create a worktree for `branch` under `worktrees_root` and bind a
    /// session pair to it.
    ///
    /// Idempotent by construction: if the target path already exists on
    /// disk, the call delegates entirely to [`Self::open`].
    pub fn create(
        &self,
        repo: &Path,
        branch: &str,
        base_branch: &str,
        worktrees_root: &Path,
        variant: &SessionVariant,
    ) -> Result<WorktreeRecord, LifecycleError> {
        let branch = validate_branch_name(branch)?;
        let path = resolve::resolve_worktree_path(worktrees_root, &branch);

        if path.exists() {
            info!(
                event = "core.lifecycle.create_delegates_to_open",
                branch = %branch,
                path = %path.display()
            );
            return self.open(repo, &branch, worktrees_root, variant);
        }

        info!(
            event = "core.lifecycle.create_started",
            branch = %branch,
            base = base_branch,
            path = %path.display()
        );

        fs::create_dir_all(worktrees_root)?;

        // Existing branch gets checked out; a new one is cut from base
        let create_from = if self.git.branch_exists(repo, &branch)? {
            None
        } else {
            Some(base_branch)
        };
        self.git.add_worktree(repo, &path, &branch, create_from)?;

        self.preapprove_trust(&path);
        let session = self.start_session(&path, &branch, variant);

        let mut record = WorktreeRecord {
            path: path.clone(),
            repo_name: self.git.repo_name(repo)?,
            branch: branch.clone(),
            primary_session_id: None,
            secondary_session_id: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        record.set_session(session.as_ref());
        self.state.set(record.clone())?;

        info!(
            event = "core.lifecycle.create_completed",
            branch = %branch,
            path = %path.display(),
            session_created = session.is_some()
        );

        Ok(record)
    }

    /// Focus the worktree's session, creating a fresh one if the registered
    /// session is gone.
    ///
    /// This is where a stale session (registered but no longer alive) gets
    /// silently replaced: the record is overwritten with the new window ids.
    pub fn open(
        &self,
        repo: &Path,
        ident: &str,
        worktrees_root: &Path,
        variant: &SessionVariant,
    ) -> Result<WorktreeRecord, LifecycleError> {
        let (path, record) = self.resolve_target(ident, worktrees_root)?;

        if !path.exists() {
            return Err(LifecycleError::WorktreeNotFound {
                name: ident.to_string(),
            });
        }

        if let Some(record) = &record {
            if let Some(pair) = record.session() {
                if self.terminal.session_exists(&pair.primary_id).unwrap_or(false) {
                    info!(
                        event = "core.lifecycle.open_focus_existing",
                        branch = %record.branch,
                        window_id = %pair.primary_id
                    );
                    self.terminal.focus_window(&pair.primary_id)?;
                    return Ok(record.clone());
                }
                info!(
                    event = "core.lifecycle.open_stale_session",
                    branch = %record.branch,
                    window_id = %pair.primary_id,
                    "Registered session is gone - creating a replacement"
                );
            }
        }

        self.preapprove_trust(&path);

        let branch = match &record {
            Some(record) => record.branch.clone(),
            // No record yet: the checked-out branch is the truth, the
            // directory name only a fallback
            None => match self.git.current_branch(&path)? {
                Some(branch) => branch,
                None => resolve::branch_dir_name_of(&path),
            },
        };

        self.terminal.ensure_running()?;
        let window_name = resolve::branch_dir_name(&branch).to_string();
        let pair = self.terminal.create_session(&path, &window_name, variant)?;

        let mut updated = record.unwrap_or(WorktreeRecord {
            path: path.clone(),
            repo_name: self.git.repo_name(repo)?,
            branch: branch.clone(),
            primary_session_id: None,
            secondary_session_id: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        });
        updated.set_session(Some(&pair));
        self.state.set(updated.clone())?;

        info!(
            event = "core.lifecycle.open_completed",
            branch = %branch,
            primary_id = %pair.primary_id
        );

        Ok(updated)
    }

    /// Tear down one worktree: session, git worktree, optionally the
    /// branch, and both registry entries.
    pub fn delete(
        &self,
        repo: &Path,
        ident: &str,
        worktrees_root: &Path,
        opts: DeleteOptions,
        confirm: &dyn Fn(&Path, &str) -> bool,
    ) -> Result<(), LifecycleError> {
        let (path, record) = self.resolve_target(ident, worktrees_root)?;
        let branch = resolve::resolve_branch(record.as_ref(), ident);

        info!(
            event = "core.lifecycle.delete_started",
            branch = %branch,
            path = %path.display(),
            force = opts.force,
            dry_run = opts.dry_run
        );

        if !opts.force && !confirm(&path, &branch) {
            return Err(LifecycleError::Aborted {
                reason: format!(
                    "Deletion of '{}' declined. Re-run with --force to skip the check.",
                    branch
                ),
            });
        }

        if opts.dry_run {
            info!(event = "core.lifecycle.would_delete", branch = %branch);
            return Ok(());
        }

        // A record whose path is gone is stale; its session ids must not be
        // trusted for lookups
        if path.exists() {
            if let Some(pair) = record.as_ref().and_then(|r| r.session()) {
                self.close_session(&pair);
            }
        }

        self.git.remove_worktree(repo, &path, opts.force)?;

        if opts.delete_branch {
            match self.git.delete_branch(repo, &branch, false) {
                Ok(()) => {}
                Err(e) if opts.force => {
                    if let Err(forced_err) = self.git.delete_branch(repo, &branch, true) {
                        warn!(
                            event = "core.lifecycle.branch_delete_failed",
                            branch = %branch,
                            safe_error = %e,
                            forced_error = %forced_err
                        );
                    }
                }
                Err(e) => {
                    warn!(
                        event = "core.lifecycle.branch_delete_failed",
                        branch = %branch,
                        error = %e,
                        "Branch not deleted - use --force or delete manually"
                    );
                }
            }
        }

        if let Err(e) = self.state.remove(&path) {
            warn!(
                event = "core.lifecycle.state_remove_failed",
                path = %path.display(),
                error = %e
            );
        }
        if let Err(e) = self.trust.remove(&path) {
            warn!(
                event = "core.lifecycle.trust_remove_failed",
                path = %path.display(),
                error = %e
            );
        }

        info!(event = "core.lifecycle.delete_completed", branch = %branch);
        Ok(())
    }

    /// Resolve an identifier to (path, record): a record matching the
    /// branch name wins, then the conventional path under the root.
    fn resolve_target(
        &self,
        ident: &str,
        worktrees_root: &Path,
    ) -> Result<(PathBuf, Option<WorktreeRecord>), LifecycleError> {
        if let Some(record) = self.state.find_by_branch(ident)? {
            let path = record.path.clone();
            return Ok((path, Some(record)));
        }

        let path = resolve::resolve_worktree_path(worktrees_root, ident);
        let record = self.state.get(&path)?;
        Ok((path, record))
    }

    /// Pre-approve the assistant for this worktree. Secondary: failure is
    /// logged, the workflow continues.
    fn preapprove_trust(&self, path: &Path) {
        if let Err(e) = self.trust.set(path, TrustRecord::approved_now()) {
            warn!(
                event = "core.lifecycle.trust_preapprove_failed",
                path = %path.display(),
                error = %e,
                "Trust pre-approval failed - the assistant may prompt on first run"
            );
        }
    }

    /// Create the session pair. Secondary during create: the worktree is
    /// fine without its windows, so failure degrades to a warning.
    fn start_session(
        &self,
        path: &Path,
        branch: &str,
        variant: &SessionVariant,
    ) -> Option<SessionPair> {
        if let Err(e) = self.terminal.ensure_running() {
            warn!(
                event = "core.lifecycle.terminal_unavailable",
                error = %e,
                "Terminal session not created - open the worktree later with 'arbor open'"
            );
            return None;
        }

        let window_name = resolve::branch_dir_name(branch).to_string();
        match self.terminal.create_session(path, &window_name, variant) {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!(
                    event = "core.lifecycle.session_create_failed",
                    branch = branch,
                    error = %e,
                    "Terminal session not created - open the worktree later with 'arbor open'"
                );
                None
            }
        }
    }

    /// Close both windows of a pair, best-effort.
    fn close_session(&self, pair: &SessionPair) {
        for id in [&pair.primary_id, &pair.secondary_id] {
            match self.terminal.session_exists(id) {
                Ok(true) => {
                    if let Err(e) = self.terminal.close_window(id) {
                        warn!(
                            event = "core.lifecycle.window_close_failed",
                            window_id = %id,
                            error = %e
                        );
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        event = "core.lifecycle.window_check_failed",
                        window_id = %id,
                        error = %e
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockGit;
    use crate::terminal::mock::MockTerminal;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        root: PathBuf,
        repo: PathBuf,
        state: WorktreeStateStore,
        trust: TrustStore,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path().join("worktrees").join("project");
            let repo = dir.path().join("project");
            fs::create_dir_all(&repo).unwrap();
            let state = WorktreeStateStore::new(dir.path().join("state.json"));
            let trust = TrustStore::new(dir.path().join("trust.json"));
            Self {
                _dir: dir,
                root,
                repo,
                state,
                trust,
            }
        }
    }

    fn variant() -> SessionVariant {
        SessionVariant::try_new("claude".to_string()).unwrap()
    }

    #[test]
    fn test_create_new_branch_cuts_from_base() {
        let fx = Fixture::new();
        let git = MockGit::default();
        let term = MockTerminal::new();
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        let record = mgr
            .create(&fx.repo, "feature/auth", "main", &fx.root, &variant())
            .unwrap();

        assert_eq!(record.branch, "feature/auth");
        assert_eq!(record.path, fx.root.join("auth"));
        assert!(record.session().is_some());
        assert!(git.called(&format!(
            "add_worktree {} feature/auth Some(\"main\")",
            fx.root.join("auth").display()
        )));
        // Record persisted, trust pre-approved
        assert!(fx.state.get(&record.path).unwrap().is_some());
        assert!(fx.trust.get(&record.path).unwrap().is_some());
    }

    #[test]
    fn test_create_existing_branch_checks_it_out() {
        let fx = Fixture::new();
        let git = MockGit {
            branches: vec!["feature/auth".to_string()],
            ..Default::default()
        };
        let term = MockTerminal::new();
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        mgr.create(&fx.repo, "feature/auth", "main", &fx.root, &variant())
            .unwrap();

        assert!(git.called(&format!(
            "add_worktree {} feature/auth None",
            fx.root.join("auth").display()
        )));
    }

    #[test]
    fn test_create_session_failure_is_nonfatal() {
        let fx = Fixture::new();
        let git = MockGit::default();
        let term = MockTerminal {
            fail_create: true,
            ..Default::default()
        };
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        let record = mgr
            .create(&fx.repo, "feature/auth", "main", &fx.root, &variant())
            .unwrap();

        assert!(record.session().is_none());
        assert!(fx.state.get(&record.path).unwrap().is_some());
    }

    #[test]
    fn test_create_on_existing_path_delegates_to_open() {
        let fx = Fixture::new();
        let git = MockGit {
            current: Some("feature/auth".to_string()),
            ..Default::default()
        };
        let term = MockTerminal::new();
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        // Worktree directory already on disk
        fs::create_dir_all(fx.root.join("auth")).unwrap();

        let record = mgr
            .create(&fx.repo, "feature/auth", "main", &fx.root, &variant())
            .unwrap();

        assert!(!git.called("add_worktree"));
        assert_eq!(record.branch, "feature/auth");
        assert!(record.session().is_some());
    }

    #[test]
    fn test_open_focuses_live_session_without_creating() {
        let fx = Fixture::new();
        let git = MockGit::default();
        let term = MockTerminal::new().with_alive("@10");
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        let path = fx.root.join("auth");
        fs::create_dir_all(&path).unwrap();
        fx.state
            .set(WorktreeRecord {
                path: path.clone(),
                repo_name: "project".to_string(),
                branch: "feature/auth".to_string(),
                primary_session_id: Some("@10".to_string()),
                secondary_session_id: Some("@11".to_string()),
                created_at: "2025-01-01T00:00:00Z".to_string(),
            })
            .unwrap();

        let record = mgr
            .open(&fx.repo, "feature/auth", &fx.root, &variant())
            .unwrap();

        assert_eq!(*term.focused.borrow(), vec!["@10".to_string()]);
        assert!(term.created.borrow().is_empty());
        assert_eq!(record.primary_session_id.as_deref(), Some("@10"));
    }

    #[test]
    fn test_open_replaces_stale_session() {
        let fx = Fixture::new();
        let git = MockGit::default();
        // "@10" is NOT alive
        let term = MockTerminal::new();
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        let path = fx.root.join("auth");
        fs::create_dir_all(&path).unwrap();
        fx.state
            .set(WorktreeRecord {
                path: path.clone(),
                repo_name: "project".to_string(),
                branch: "feature/auth".to_string(),
                primary_session_id: Some("@10".to_string()),
                secondary_session_id: Some("@11".to_string()),
                created_at: "2025-01-01T00:00:00Z".to_string(),
            })
            .unwrap();

        let record = mgr
            .open(&fx.repo, "feature/auth", &fx.root, &variant())
            .unwrap();

        // New ids overwrote the stale ones, silently
        assert_ne!(record.primary_session_id.as_deref(), Some("@10"));
        assert!(record.session().is_some());
        assert_eq!(term.created.borrow().len(), 1);

        let persisted = fx.state.get(&path).unwrap().unwrap();
        assert_eq!(persisted.primary_session_id, record.primary_session_id);
    }

    #[test]
    fn test_open_missing_worktree_fails() {
        let fx = Fixture::new();
        let git = MockGit::default();
        let term = MockTerminal::new();
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        let result = mgr.open(&fx.repo, "ghost", &fx.root, &variant());
        assert!(matches!(
            result,
            Err(LifecycleError::WorktreeNotFound { .. })
        ));
    }

    #[test]
    fn test_open_short_and_full_identifier_resolve_identically() {
        let fx = Fixture::new();
        let git = MockGit {
            current: Some("feature/auth".to_string()),
            ..Default::default()
        };
        let term = MockTerminal::new();
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        let path = fx.root.join("auth");
        fs::create_dir_all(&path).unwrap();

        let by_short = mgr.open(&fx.repo, "auth", &fx.root, &variant()).unwrap();
        let by_full = mgr
            .open(&fx.repo, "feature/auth", &fx.root, &variant())
            .unwrap();
        assert_eq!(by_short.path, by_full.path);
    }

    #[test]
    fn test_delete_removes_worktree_and_records() {
        let fx = Fixture::new();
        let git = MockGit::default();
        let term = MockTerminal::new().with_alive("@10");
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        let path = fx.root.join("auth");
        fs::create_dir_all(&path).unwrap();
        fx.state
            .set(WorktreeRecord {
                path: path.clone(),
                repo_name: "project".to_string(),
                branch: "feature/auth".to_string(),
                primary_session_id: Some("@10".to_string()),
                secondary_session_id: Some("@11".to_string()),
                created_at: "2025-01-01T00:00:00Z".to_string(),
            })
            .unwrap();
        fx.trust.set(&path, TrustRecord::approved_now()).unwrap();

        let opts = DeleteOptions {
            delete_branch: true,
            ..Default::default()
        };
        mgr.delete(&fx.repo, "auth", &fx.root, opts, &|_, _| true)
            .unwrap();

        assert!(git.called(&format!("remove_worktree {} force=false", path.display())));
        assert!(git.called("delete_branch feature/auth force=false"));
        assert_eq!(*term.closed.borrow(), vec!["@10".to_string()]);
        assert!(fx.state.get(&path).unwrap().is_none());
        assert!(fx.trust.get(&path).unwrap().is_none());
    }

    #[test]
    fn test_delete_declined_mutates_nothing() {
        let fx = Fixture::new();
        let git = MockGit::default();
        let term = MockTerminal::new();
        let mgr = LifecycleManager::new(&git, &term, &fx.state, &fx.trust);

        let path = fx.root.join("auth");
        fs::create_dir_all(&path).unwrap();
        fx.state
            .set(WorktreeRecord {
                path: path.clone(),
                repo_name: "project".to_string(),
                branch: "feature/auth".to_string(),
                primary_session_id: None,
                secondary_session_id: None,
                created_at: "2025-01-01T00:00:00Z".to_string(),
            })
            .unwrap();

        let result = mgr.delete(
            &fx.repo,
            "auth",
            &fx.root,
            DeleteOptions::default(),
            &|_, _| false,
        );
        assert!(matches!(result, Err(LifecycleError::Aborted { .. })));
        assert!(git.recorded().is_empty());
        assert!(fx.state.get(&path).unwrap().is_some());
    }
}
