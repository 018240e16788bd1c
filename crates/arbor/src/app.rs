use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("arbor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage parallel git worktrees bound to terminal session pairs")
        .long_about(
            "Arbor creates a dedicated git worktree per branch, binds a terminal \
             window pair to it (assistant + shell), keeps it synchronized with the \
             base branch, and folds it back via local merge or pull request.",
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only emit error-level log output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("create")
                .about("Create a worktree for a branch and open its session pair")
                .arg(
                    Arg::new("branch")
                        .help("Branch name for the worktree")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("base")
                        .long("base")
                        .short('b')
                        .help("Base branch to cut a new branch from (overrides config)"),
                ),
        )
        .subcommand(
            Command::new("open")
                .about("Focus a worktree's session pair, recreating it if it died")
                .arg(
                    Arg::new("ident")
                        .help("Branch name or worktree directory name")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Remove a worktree, its session pair, and its registry entries")
                .arg(
                    Arg::new("ident")
                        .help("Branch name or worktree directory name")
                        .required_unless_present("all")
                        .index(1),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Delete every worktree except the main checkout")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .short('f')
                        .help("Skip safety checks; uncommitted work will be lost")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("keep-branch")
                        .long("keep-branch")
                        .help("Keep the branch after removing the worktree")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Report what would be deleted without deleting")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("sync")
                .about("Bring a worktree (or all of them) up to date with the base branch")
                .arg(
                    Arg::new("ident")
                        .help("Branch name or worktree directory name")
                        .required_unless_present("all")
                        .index(1),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Sync every worktree except the main checkout")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .short('s')
                        .help("How to integrate base changes")
                        .value_parser(["merge", "rebase"]),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .short('f')
                        .help("Sync even if the worktree has uncommitted changes")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Report what would be synced without syncing")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("merge")
                .about("Fold a worktree's branch back into the base branch")
                .arg(
                    Arg::new("ident")
                        .help("Branch name or worktree directory name")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .short('s')
                        .help("merge keeps a merge commit; rebase produces linear history")
                        .value_parser(["merge", "rebase"]),
                )
                .arg(
                    Arg::new("pr")
                        .long("pr")
                        .help("Push the branch and create a pull request instead of merging locally")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .help("Pull request title (default: auto-fill from commits)")
                        .requires("pr"),
                )
                .arg(
                    Arg::new("body")
                        .long("body")
                        .help("Pull request body")
                        .requires("pr")
                        .requires("title"),
                )
                .arg(
                    Arg::new("draft")
                        .long("draft")
                        .help("Create the pull request as a draft")
                        .action(ArgAction::SetTrue)
                        .requires("pr"),
                )
                .arg(
                    Arg::new("no-cleanup")
                        .long("no-cleanup")
                        .help("Keep the worktree after a successful merge")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .short('f')
                        .help("Merge even if the worktree has uncommitted changes")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Report what would be merged without merging")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List managed worktrees for the current repository")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("discover")
                .about("Find worktrees git knows about that arbor is not tracking")
                .arg(
                    Arg::new("adopt")
                        .long("adopt")
                        .help("Register each unmanaged worktree in the state registry")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Report without adopting")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("prune")
                .about("Drop registry entries and git bookkeeping for missing worktrees")
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Report without pruning")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for")
                        .required(true)
                        .value_parser(clap::value_parser!(clap_complete::Shell)),
                ),
        )
}
