use clap::ArgMatches;
use tracing::{error, info};

use arbor_core::lifecycle::manager::DeleteOptions;
use arbor_core::ops::types::{DeleteHooks, ResolveWorktreeFn};
use arbor_core::{LifecycleManager, ops};

use super::helpers::{CliContext, confirm_deletion, is_valid_branch_name};

pub(crate) fn handle_delete_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let all = matches.get_flag("all");
    let force = matches.get_flag("force");
    let keep_branch = matches.get_flag("keep-branch");
    let dry_run = matches.get_flag("dry-run");

    let ctx = CliContext::new()?;

    if all {
        return delete_all(&ctx, !keep_branch, force, dry_run);
    }

    let ident = matches
        .get_one::<String>("ident")
        .ok_or("Worktree identifier is required")?;

    if !is_valid_branch_name(ident) {
        eprintln!("Invalid identifier: {}", ident);
        error!(event = "cli.delete_invalid_ident", ident = ident);
        return Err("Invalid identifier".into());
    }

    info!(
        event = "cli.delete_started",
        ident = ident,
        force = force,
        dry_run = dry_run
    );

    let manager = LifecycleManager::new(&ctx.git, &ctx.terminal, &ctx.state, &ctx.trust);
    let opts = DeleteOptions {
        delete_branch: !keep_branch,
        force,
        dry_run,
    };

    match manager.delete(&ctx.repo, ident, &ctx.worktrees_root, opts, &confirm_deletion) {
        Ok(()) => {
            if dry_run {
                println!("Would delete worktree '{}'", ident);
            } else {
                println!("✅ Deleted worktree '{}'", ident);
            }
            info!(event = "cli.delete_completed", ident = ident);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Failed to delete '{}': {}", ident, e);
            error!(event = "cli.delete_failed", ident = ident, error = %e);
            Err(e.into())
        }
    }
}

fn delete_all(
    ctx: &CliContext,
    delete_branches: bool,
    force: bool,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.delete_all_started", force = force, dry_run = dry_run);

    let resolve: &ResolveWorktreeFn = &|wt| match ctx.state.get(&wt.path) {
        Ok(Some(record)) => {
            let session = record.session();
            (record.branch, session)
        }
        _ => (
            wt.branch
                .clone()
                .unwrap_or_else(|| arbor_core::resolve::branch_dir_name_of(&wt.path)),
            None,
        ),
    };

    let hooks = DeleteHooks {
        confirm: &confirm_deletion,
        remove_state: &|path| ctx.state.remove(path).map_err(|e| e.to_string()),
        remove_trust: &|path| ctx.trust.remove(path).map_err(|e| e.to_string()),
    };

    let summary = ops::delete_all(
        &ctx.git,
        &ctx.terminal,
        &ctx.repo,
        delete_branches,
        force,
        dry_run,
        resolve,
        &hooks,
    )?;

    println!(
        "{} deleted, {} skipped, {} failed",
        summary.deleted, summary.skipped, summary.failed
    );

    info!(
        event = "cli.delete_all_completed",
        deleted = summary.deleted,
        skipped = summary.skipped,
        failed = summary.failed
    );

    if summary.failed > 0 {
        return Err(format!("{} worktree(s) failed to delete", summary.failed).into());
    }
    Ok(())
}
