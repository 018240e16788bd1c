use clap::ArgMatches;
use tracing::{error, info};

use arbor_core::LifecycleManager;

use super::helpers::{CliContext, is_valid_branch_name};

pub(crate) fn handle_create_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let branch = matches
        .get_one::<String>("branch")
        .ok_or("Branch argument is required")?;

    if !is_valid_branch_name(branch) {
        eprintln!("Invalid branch name: {}", branch);
        error!(event = "cli.create_invalid_branch", branch = branch);
        return Err("Invalid branch name".into());
    }

    let ctx = CliContext::new()?;
    let base = matches
        .get_one::<String>("base")
        .map(|s| s.as_str())
        .unwrap_or(&ctx.arbor_config.git.base_branch);

    info!(event = "cli.create_started", branch = branch, base = base);

    let manager = LifecycleManager::new(&ctx.git, &ctx.terminal, &ctx.state, &ctx.trust);
    let record = match manager.create(
        &ctx.repo,
        branch,
        base,
        &ctx.worktrees_root,
        &ctx.variant()?,
    ) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("❌ Failed to create worktree '{}': {}", branch, e);
            error!(event = "cli.create_failed", branch = branch, error = %e);
            return Err(e.into());
        }
    };

    println!("✅ Worktree ready: {}", record.path.display());
    println!("   Branch: {}", record.branch);
    match record.session() {
        Some(pair) => println!("   Session: {} (shell: {})", pair.primary_id, pair.secondary_id),
        None => println!("   Session: not created — run 'arbor open {}' to retry", branch),
    }

    info!(event = "cli.create_completed", branch = branch);
    Ok(())
}
