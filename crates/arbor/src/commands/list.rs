use clap::ArgMatches;
use tracing::info;

use arbor_core::terminal::client::TerminalSessions;

use super::helpers::CliContext;
use crate::table::{ListRow, TableFormatter};

pub(crate) fn handle_list_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    let ctx = CliContext::new()?;

    info!(event = "cli.list_started", repo = %ctx.repo_name);

    let records: Vec<_> = ctx
        .state
        .all()?
        .into_values()
        .filter(|record| record.repo_name == ctx.repo_name)
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No worktrees for '{}'. Create one with 'arbor create <branch>'.", ctx.repo_name);
        return Ok(());
    }

    let rows: Vec<ListRow> = records
        .iter()
        .map(|record| {
            let session = match record.session() {
                Some(pair) => {
                    if ctx
                        .terminal
                        .session_exists(&pair.primary_id)
                        .unwrap_or(false)
                    {
                        format!("live ({})", pair.primary_id)
                    } else {
                        "stale".to_string()
                    }
                }
                None => "none".to_string(),
            };
            let missing = !record.path.exists();
            ListRow {
                branch: record.branch.clone(),
                path: record.path.display().to_string(),
                session,
                created_at: record.created_at.clone(),
                missing,
            }
        })
        .collect();

    TableFormatter::new(&rows).print_table(&rows);

    if rows.iter().any(|row| row.missing) {
        println!("Some worktrees are missing on disk. Run 'arbor prune' to drop their records.");
    }

    info!(event = "cli.list_completed", count = records.len());
    Ok(())
}
