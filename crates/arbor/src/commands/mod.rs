use clap::ArgMatches;

pub mod helpers;

mod completions;
mod create;
mod delete;
mod discover;
mod list;
mod merge;
mod open;
mod prune;
mod sync;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("create", sub_matches)) => create::handle_create_command(sub_matches),
        Some(("open", sub_matches)) => open::handle_open_command(sub_matches),
        Some(("delete", sub_matches)) => delete::handle_delete_command(sub_matches),
        Some(("sync", sub_matches)) => sync::handle_sync_command(sub_matches),
        Some(("merge", sub_matches)) => merge::handle_merge_command(sub_matches),
        Some(("list", sub_matches)) => list::handle_list_command(sub_matches),
        Some(("discover", sub_matches)) => discover::handle_discover_command(sub_matches),
        Some(("prune", sub_matches)) => prune::handle_prune_command(sub_matches),
        Some(("completions", sub_matches)) => {
            completions::handle_completions_command(sub_matches)
        }
        _ => {
            eprintln!("Unknown command. Use --help for usage information.");
            Err("Unknown command".into())
        }
    }
}
