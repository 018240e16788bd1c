//! Find worktrees git knows about that arbor does not.
//!
//! Partitions the tool's worktree list into tracked and unmanaged entries,
//! and optionally adopts the unmanaged ones into the state registry via a
//! supplied callback.

use tracing::{info, warn};

use crate::git::client::VersionControl;
use crate::ops::errors::OpError;
use crate::ops::types::{AdoptFn, DiscoverRequest, DiscoverResult, UnmanagedKind, UnmanagedWorktree};

/// List all worktrees and classify the ones arbor is not tracking.
pub fn discover(
    git: &dyn VersionControl,
    req: &DiscoverRequest,
    is_tracked: &dyn Fn(&std::path::Path) -> bool,
    adopt: &AdoptFn,
) -> Result<DiscoverResult, OpError> {
    info!(
        event = "core.discover.started",
        adopt = req.adopt,
        dry_run = req.dry_run
    );

    let mut result = DiscoverResult {
        dry_run: req.dry_run,
        ..Default::default()
    };

    for wt in git.list_worktrees(req.repo)? {
        if wt.is_main {
            continue;
        }

        if is_tracked(&wt.path) {
            result.tracked.push(wt);
            continue;
        }

        let kind = if wt.path.starts_with(req.worktrees_root) {
            UnmanagedKind::ManagedRoot
        } else {
            UnmanagedKind::External
        };

        let mut adopted = false;
        if req.adopt && !req.dry_run {
            match adopt(&wt) {
                Ok(()) => {
                    adopted = true;
                    result.adopted += 1;
                    info!(
                        event = "core.discover.adopted",
                        path = %wt.path.display(),
                        branch = ?wt.branch
                    );
                }
                Err(e) => {
                    // Per-entry warning, never a batch failure
                    warn!(
                        event = "core.discover.adoption_failed",
                        path = %wt.path.display(),
                        error = %e
                    );
                }
            }
        }

        result.unmanaged.push(UnmanagedWorktree {
            info: wt,
            kind,
            adopted,
        });
    }

    info!(
        event = "core.discover.completed",
        tracked = result.tracked.len(),
        unmanaged = result.unmanaged.len(),
        adopted = result.adopted
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockGit;
    use crate::git::types::WorktreeInfo;
    use std::cell::RefCell;
    use std::path::PathBuf;

    fn wt_info(path: &str, branch: Option<&str>, is_main: bool) -> WorktreeInfo {
        WorktreeInfo {
            path: PathBuf::from(path),
            branch: branch.map(|b| b.to_string()),
            head: None,
            is_main,
        }
    }

    fn request<'a>(
        repo: &'a std::path::Path,
        root: &'a std::path::Path,
        adopt: bool,
        dry_run: bool,
    ) -> DiscoverRequest<'a> {
        DiscoverRequest {
            repo,
            worktrees_root: root,
            adopt,
            dry_run,
        }
    }

    #[test]
    fn test_all_tracked_yields_empty_unmanaged_and_no_adoption() {
        let git = MockGit {
            worktrees: vec![
                wt_info("/repo", Some("main"), true),
                wt_info("/wts/project/auth", Some("feature/auth"), false),
            ],
            ..Default::default()
        };
        let repo = PathBuf::from("/repo");
        let root = PathBuf::from("/wts/project");
        let adoptions = RefCell::new(0);
        let adopt: &AdoptFn = &|_| {
            *adoptions.borrow_mut() += 1;
            Ok(())
        };

        let result = discover(&git, &request(&repo, &root, true, false), &|_| true, adopt).unwrap();
        assert!(result.unmanaged.is_empty());
        assert_eq!(result.tracked.len(), 1);
        assert_eq!(result.adopted, 0);
        assert_eq!(*adoptions.borrow(), 0);
    }

    #[test]
    fn test_unmanaged_classified_by_root_containment() {
        let git = MockGit {
            worktrees: vec![
                wt_info("/repo", Some("main"), true),
                wt_info("/wts/project/auth", Some("feature/auth"), false),
                wt_info("/elsewhere/spike", Some("spike"), false),
            ],
            ..Default::default()
        };
        let repo = PathBuf::from("/repo");
        let root = PathBuf::from("/wts/project");

        let result =
            discover(&git, &request(&repo, &root, false, false), &|_| false, &|_| Ok(())).unwrap();
        assert_eq!(result.unmanaged.len(), 2);
        assert_eq!(result.unmanaged[0].kind, UnmanagedKind::ManagedRoot);
        assert_eq!(result.unmanaged[1].kind, UnmanagedKind::External);
        assert!(!result.unmanaged[0].adopted);
    }

    #[test]
    fn test_adopt_flag_adopts_each_unmanaged_entry() {
        let git = MockGit {
            worktrees: vec![
                wt_info("/repo", Some("main"), true),
                wt_info("/wts/project/auth", Some("feature/auth"), false),
                wt_info("/wts/project/api", Some("feature/api"), false),
            ],
            ..Default::default()
        };
        let repo = PathBuf::from("/repo");
        let root = PathBuf::from("/wts/project");
        let adopted_paths = RefCell::new(Vec::new());
        let adopt: &AdoptFn = &|wt| {
            adopted_paths.borrow_mut().push(wt.path.clone());
            Ok(())
        };

        let result = discover(&git, &request(&repo, &root, true, false), &|_| false, adopt).unwrap();
        assert_eq!(result.adopted, 2);
        assert_eq!(adopted_paths.borrow().len(), 2);
        assert!(result.unmanaged.iter().all(|u| u.adopted));
    }

    #[test]
    fn test_adoption_failure_is_per_entry_warning() {
        let git = MockGit {
            worktrees: vec![
                wt_info("/repo", Some("main"), true),
                wt_info("/wts/project/auth", Some("feature/auth"), false),
                wt_info("/wts/project/api", Some("feature/api"), false),
            ],
            ..Default::default()
        };
        let repo = PathBuf::from("/repo");
        let root = PathBuf::from("/wts/project");
        let adopt: &AdoptFn = &|wt| {
            if wt.path.ends_with("auth") {
                Err("record write failed".to_string())
            } else {
                Ok(())
            }
        };

        let result = discover(&git, &request(&repo, &root, true, false), &|_| false, adopt).unwrap();
        assert_eq!(result.adopted, 1);
        assert_eq!(result.unmanaged.len(), 2);
        assert!(!result.unmanaged[0].adopted);
        assert!(result.unmanaged[1].adopted);
    }

    #[test]
    fn test_dry_run_never_adopts() {
        let git = MockGit {
            worktrees: vec![
                wt_info("/repo", Some("main"), true),
                wt_info("/wts/project/auth", Some("feature/auth"), false),
            ],
            ..Default::default()
        };
        let repo = PathBuf::from("/repo");
        let root = PathBuf::from("/wts/project");
        let adoptions = RefCell::new(0);
        let adopt: &AdoptFn = &|_| {
            *adoptions.borrow_mut() += 1;
            Ok(())
        };

        let result = discover(&git, &request(&repo, &root, true, true), &|_| false, adopt).unwrap();
        assert_eq!(result.adopted, 0);
        assert_eq!(*adoptions.borrow(), 0);
        assert_eq!(result.unmanaged.len(), 1);
        assert!(result.dry_run);
    }
}
