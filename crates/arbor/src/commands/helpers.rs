//! Shared command wiring: the client/store bundle, prompts, and the `gh`
//! shell-out used for PR creation.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use arbor_core::config::{ArborConfig, Config};
use arbor_core::git::cli::GitCli;
use arbor_core::git::client::VersionControl;
use arbor_core::resolve;
use arbor_core::state::{WorktreeRecord, WorktreeStateStore};
use arbor_core::terminal::tmux::TmuxClient;
use arbor_core::terminal::types::SessionVariant;
use arbor_core::trust::TrustStore;

/// Everything a command handler needs, resolved once per invocation.
pub(crate) struct CliContext {
    pub arbor_config: ArborConfig,
    pub git: GitCli,
    pub terminal: TmuxClient,
    pub state: WorktreeStateStore,
    pub trust: TrustStore,
    /// Path of the main checkout.
    pub repo: PathBuf,
    pub repo_name: String,
    pub worktrees_root: PathBuf,
}

impl CliContext {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::new();
        let arbor_config = load_config_with_warning();
        let git = GitCli::new();

        let cwd = std::env::current_dir()?;
        let here = git.repo_root(&cwd)?;
        // Running from inside a linked worktree still addresses the main
        // checkout: it is the first entry of the worktree list
        let repo = git
            .list_worktrees(&here)?
            .into_iter()
            .find(|wt| wt.is_main)
            .map(|wt| wt.path)
            .unwrap_or(here);
        let repo_name = git.repo_name(&repo)?;
        let worktrees_root = resolve::worktrees_root(&config.worktrees_dir(), &repo_name);

        let terminal = TmuxClient::new(arbor_config.terminal.session.clone());
        let state = WorktreeStateStore::new(config.state_file());
        let trust = TrustStore::new(config.trust_file());

        Ok(Self {
            arbor_config,
            git,
            terminal,
            state,
            trust,
            repo,
            repo_name,
            worktrees_root,
        })
    }

    /// The assistant variant for new session pairs.
    pub fn variant(&self) -> Result<SessionVariant, Box<dyn std::error::Error>> {
        Ok(SessionVariant::try_new(
            self.arbor_config.assistant_command(),
        )?)
    }

    /// Resolve an identifier to (worktree path, record, branch).
    pub fn resolve_target(
        &self,
        ident: &str,
    ) -> Result<(PathBuf, Option<WorktreeRecord>, String), Box<dyn std::error::Error>> {
        if let Some(record) = self.state.find_by_branch(ident)? {
            let path = record.path.clone();
            let branch = record.branch.clone();
            return Ok((path, Some(record), branch));
        }

        let path = resolve::resolve_worktree_path(&self.worktrees_root, ident);
        let record = self.state.get(&path)?;
        let branch = resolve::resolve_branch(record.as_ref(), ident);
        Ok((path, record, branch))
    }
}

/// Load configuration with a warning on errors.
///
/// Falls back to defaults if config loading fails, notifying the user via
/// stderr and a structured log event.
pub(crate) fn load_config_with_warning() -> ArborConfig {
    match ArborConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.arbor/config.toml and ./.arbor/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            ArborConfig::default()
        }
    }
}

/// Validate a branch identifier from the command line.
///
/// Allows alphanumerics, hyphens, underscores, dots, and forward slashes;
/// rejects path traversal and special characters.
pub(crate) fn is_valid_branch_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.starts_with('/')
        && !name.ends_with('/')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '/')
        && name.len() <= 255
}

/// Interactive deletion prompt. Reads one line from stdin; anything but an
/// explicit yes declines.
pub(crate) fn confirm_deletion(path: &Path, branch: &str) -> bool {
    print!(
        "Delete worktree '{}' at {}? Uncommitted or unpushed work will be lost. [y/N] ",
        branch,
        path.display()
    );
    let _ = std::io::stdout().flush();

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// PR creation via the `gh` CLI. The argument list is prepared by the
/// operation layer; stdout (the PR URL) is the result.
pub(crate) fn create_pr_with_gh(worktree: &Path, args: &[String]) -> Result<String, String> {
    let output = std::process::Command::new("gh")
        .current_dir(worktree)
        .args(args)
        .output()
        .map_err(|e| format!("Failed to execute gh: {}", e))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }
}
