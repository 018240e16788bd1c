use clap::ArgMatches;
use tracing::{error, info};

use arbor_core::git::types::SyncStrategy;
use arbor_core::ops;
use arbor_core::ops::types::{DeleteHooks, DeleteRequest, MergeHooks, MergeRequest};

use super::helpers::{CliContext, create_pr_with_gh, is_valid_branch_name};

pub(crate) fn handle_merge_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let ident = matches
        .get_one::<String>("ident")
        .ok_or("Worktree identifier is required")?;

    if !is_valid_branch_name(ident) {
        eprintln!("Invalid identifier: {}", ident);
        error!(event = "cli.merge_invalid_ident", ident = ident);
        return Err("Invalid identifier".into());
    }

    let ctx = CliContext::new()?;
    let (path, record, branch) = ctx.resolve_target(ident)?;
    if !path.exists() {
        eprintln!("❌ No worktree found for '{}'", ident);
        return Err(format!("No worktree found for '{}'", ident).into());
    }

    let strategy = matches
        .get_one::<String>("strategy")
        .and_then(|s| SyncStrategy::parse(s))
        .unwrap_or(SyncStrategy::Merge);

    let req = MergeRequest {
        repo: &ctx.repo,
        base_branch: &ctx.arbor_config.git.base_branch,
        remote: &ctx.arbor_config.git.remote,
        worktree_path: &path,
        branch: &branch,
        strategy,
        force: matches.get_flag("force"),
        dry_run: matches.get_flag("dry-run"),
        create_pr: matches.get_flag("pr"),
        no_cleanup: matches.get_flag("no-cleanup"),
        pr_title: matches.get_one::<String>("title").map(|s| s.as_str()),
        pr_body: matches.get_one::<String>("body").map(|s| s.as_str()),
        pr_draft: matches.get_flag("draft"),
    };

    info!(
        event = "cli.merge_started",
        branch = %branch,
        strategy = %strategy,
        create_pr = req.create_pr,
        dry_run = req.dry_run
    );

    // Cleanup after a successful merge is a full teardown of the worktree.
    // The merge already landed, so the teardown runs unprompted and forced.
    let session = record.as_ref().and_then(|r| r.session());
    let cleanup = |wt_path: &std::path::Path, wt_branch: &str| {
        let delete_req = DeleteRequest {
            repo: &ctx.repo,
            worktree_path: wt_path,
            branch: wt_branch,
            session: session.clone(),
            delete_branch: true,
            force: true,
            dry_run: false,
        };
        let hooks = DeleteHooks {
            confirm: &|_, _| true,
            remove_state: &|p| ctx.state.remove(p).map_err(|e| e.to_string()),
            remove_trust: &|p| ctx.trust.remove(p).map_err(|e| e.to_string()),
        };
        ops::delete(&ctx.git, &ctx.terminal, &delete_req, &hooks)
            .map(|_| ())
            .map_err(|e| e.to_string())
    };

    let hooks = MergeHooks {
        cleanup: &cleanup,
        create_pr: &create_pr_with_gh,
    };

    match ops::merge(&ctx.git, &req, &hooks) {
        Ok(result) if result.nothing_to_merge => {
            println!("✅ Nothing to merge: '{}' has no commits beyond the base branch", branch);
            Ok(())
        }
        Ok(result) if result.dry_run => {
            println!(
                "Would merge '{}' into {} via {}",
                branch,
                ctx.arbor_config.git.base_branch,
                if req.create_pr { "pull request" } else { "local merge" }
            );
            Ok(())
        }
        Ok(result) if result.pr_failed => {
            println!(
                "⚠️  Branch '{}' was pushed, but PR creation failed. Create it manually or re-run.",
                branch
            );
            Ok(())
        }
        Ok(result) => {
            if let Some(url) = &result.pr_url {
                println!("✅ Pull request created: {}", url);
            } else {
                println!(
                    "✅ Merged '{}' into {}",
                    branch, ctx.arbor_config.git.base_branch
                );
                if result.resumed {
                    println!("   (continued an interrupted merge)");
                }
                if !result.cleaned_up && !req.no_cleanup {
                    println!("   Worktree cleanup failed — remove it with 'arbor delete {}'", branch);
                }
            }
            info!(event = "cli.merge_completed", branch = %branch);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Merge failed for '{}': {}", branch, e);
            error!(event = "cli.merge_failed", branch = %branch, error = %e);
            Err(e.into())
        }
    }
}
