use clap::ArgMatches;
use tracing::{error, info};

use arbor_core::LifecycleManager;

use super::helpers::{CliContext, is_valid_branch_name};

pub(crate) fn handle_open_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let ident = matches
        .get_one::<String>("ident")
        .ok_or("Worktree identifier is required")?;

    if !is_valid_branch_name(ident) {
        eprintln!("Invalid identifier: {}", ident);
        error!(event = "cli.open_invalid_ident", ident = ident);
        return Err("Invalid identifier".into());
    }

    let ctx = CliContext::new()?;

    info!(event = "cli.open_started", ident = ident);

    let manager = LifecycleManager::new(&ctx.git, &ctx.terminal, &ctx.state, &ctx.trust);
    let record = match manager.open(&ctx.repo, ident, &ctx.worktrees_root, &ctx.variant()?) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("❌ Failed to open '{}': {}", ident, e);
            error!(event = "cli.open_failed", ident = ident, error = %e);
            return Err(e.into());
        }
    };

    println!("✅ Opened '{}' at {}", record.branch, record.path.display());

    info!(event = "cli.open_completed", branch = %record.branch);
    Ok(())
}
