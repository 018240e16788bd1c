use clap::ArgMatches;
use tracing::info;

use arbor_core::ops;
use arbor_core::ops::types::{AdoptFn, DiscoverRequest, UnmanagedKind};
use arbor_core::state::WorktreeRecord;

use super::helpers::CliContext;

pub(crate) fn handle_discover_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let adopt = matches.get_flag("adopt");
    let dry_run = matches.get_flag("dry-run");

    let ctx = CliContext::new()?;

    info!(event = "cli.discover_started", adopt = adopt, dry_run = dry_run);

    let req = DiscoverRequest {
        repo: &ctx.repo,
        worktrees_root: &ctx.worktrees_root,
        adopt,
        dry_run,
    };

    let is_tracked = |path: &std::path::Path| ctx.state.get(path).ok().flatten().is_some();

    let adopt_fn: &AdoptFn = &|wt| {
        let branch = wt
            .branch
            .clone()
            .unwrap_or_else(|| arbor_core::resolve::branch_dir_name_of(&wt.path));
        let record = WorktreeRecord {
            path: wt.path.clone(),
            repo_name: ctx.repo_name.clone(),
            branch,
            primary_session_id: None,
            secondary_session_id: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        ctx.state.set(record).map_err(|e| e.to_string())
    };

    let result = ops::discover(&ctx.git, &req, &is_tracked, adopt_fn)?;

    println!("{} tracked worktree(s)", result.tracked.len());

    if result.unmanaged.is_empty() {
        println!("No unmanaged worktrees.");
    } else {
        println!("{} unmanaged worktree(s):", result.unmanaged.len());
        for entry in &result.unmanaged {
            let kind = match entry.kind {
                UnmanagedKind::ManagedRoot => "managed-root",
                UnmanagedKind::External => "external",
            };
            let status = if entry.adopted {
                " [adopted]"
            } else if adopt && dry_run {
                " [would adopt]"
            } else {
                ""
            };
            println!(
                "  {} ({}){}",
                entry.info.path.display(),
                kind,
                status
            );
        }
    }

    info!(
        event = "cli.discover_completed",
        tracked = result.tracked.len(),
        unmanaged = result.unmanaged.len(),
        adopted = result.adopted
    );
    Ok(())
}
