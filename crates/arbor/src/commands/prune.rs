use clap::ArgMatches;
use tracing::info;

use arbor_core::ops;
use arbor_core::ops::types::{PruneHooks, PruneStateFn, PruneTrustFn};

use super::helpers::CliContext;

pub(crate) fn handle_prune_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let dry_run = matches.get_flag("dry-run");

    let ctx = CliContext::new()?;

    info!(event = "cli.prune_started", dry_run = dry_run);

    let prune_state: &PruneStateFn =
        &|| ctx.state.prune_missing().map_err(|e| e.to_string());
    let prune_trust: &PruneTrustFn =
        &|root| ctx.trust.prune_missing_under(root).map_err(|e| e.to_string());

    let hooks = PruneHooks {
        prune_state,
        prune_trust: Some(prune_trust),
    };

    let result = ops::prune(&ctx.git, &ctx.repo, &ctx.worktrees_root, dry_run, &hooks);

    if result.dry_run {
        println!("Would prune stale state records, trust records, and git worktree bookkeeping.");
    } else {
        println!(
            "Pruned {} state record(s), {} trust record(s); git prune {}",
            result.state_removed,
            result.trust_removed,
            if result.git_pruned { "ok" } else { "failed" }
        );
    }

    info!(
        event = "cli.prune_completed",
        state_removed = result.state_removed,
        trust_removed = result.trust_removed,
        git_pruned = result.git_pruned
    );
    Ok(())
}
