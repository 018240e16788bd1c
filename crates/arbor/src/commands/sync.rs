use clap::ArgMatches;
use tracing::{error, info};

use arbor_core::git::types::SyncStrategy;
use arbor_core::ops;
use arbor_core::ops::types::{SyncAllRequest, SyncRequest};

use super::helpers::{CliContext, is_valid_branch_name};

pub(crate) fn handle_sync_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let all = matches.get_flag("all");
    let force = matches.get_flag("force");
    let dry_run = matches.get_flag("dry-run");
    let strategy = matches
        .get_one::<String>("strategy")
        .and_then(|s| SyncStrategy::parse(s))
        .unwrap_or(SyncStrategy::Merge);

    let ctx = CliContext::new()?;

    if all {
        return sync_all(&ctx, strategy, force, dry_run);
    }

    let ident = matches
        .get_one::<String>("ident")
        .ok_or("Worktree identifier is required")?;

    if !is_valid_branch_name(ident) {
        eprintln!("Invalid identifier: {}", ident);
        error!(event = "cli.sync_invalid_ident", ident = ident);
        return Err("Invalid identifier".into());
    }

    let (path, _record, branch) = ctx.resolve_target(ident)?;
    if !path.exists() {
        eprintln!("❌ No worktree found for '{}'", ident);
        return Err(format!("No worktree found for '{}'", ident).into());
    }

    info!(
        event = "cli.sync_started",
        branch = %branch,
        strategy = %strategy,
        dry_run = dry_run
    );

    let req = SyncRequest {
        repo: &ctx.repo,
        base_branch: &ctx.arbor_config.git.base_branch,
        remote: &ctx.arbor_config.git.remote,
        worktree_path: &path,
        branch: &branch,
        strategy,
        force,
        dry_run,
    };

    match ops::sync(&ctx.git, &req) {
        Ok(result) if result.resumed => {
            println!("✅ Continued interrupted {} for '{}'", strategy, branch);
            Ok(())
        }
        Ok(result) if result.already_synced => {
            println!("✅ '{}' is already up to date with {}", branch, result.effective_source);
            Ok(())
        }
        Ok(result) if result.dry_run => {
            println!(
                "Would sync '{}' from {} ({} behind, {} ahead)",
                branch, result.effective_source, result.behind, result.ahead
            );
            Ok(())
        }
        Ok(result) => {
            println!(
                "✅ Synced '{}' from {} ({} commit(s))",
                branch, result.effective_source, result.behind
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Sync failed for '{}': {}", branch, e);
            error!(event = "cli.sync_failed", branch = %branch, error = %e);
            Err(e.into())
        }
    }
}

fn sync_all(
    ctx: &CliContext,
    strategy: SyncStrategy,
    force: bool,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.sync_all_started", strategy = %strategy, dry_run = dry_run);

    let req = SyncAllRequest {
        repo: &ctx.repo,
        base_branch: &ctx.arbor_config.git.base_branch,
        remote: &ctx.arbor_config.git.remote,
        strategy,
        force,
        dry_run,
    };

    let summary = ops::sync_all(&ctx.git, &req)?;

    println!(
        "{} synced, {} already up to date, {} skipped, {} conflicted",
        summary.synced, summary.already_synced, summary.skipped, summary.conflicts
    );

    info!(
        event = "cli.sync_all_completed",
        synced = summary.synced,
        already_synced = summary.already_synced,
        skipped = summary.skipped,
        conflicts = summary.conflicts
    );

    if summary.conflicts > 0 {
        println!(
            "Resolve conflicts in the listed worktrees, then re-run 'arbor sync' for each."
        );
    }
    Ok(())
}
