//! recsync CLI
//!
//! Syncs configured local sources to the remote record store and helps
//! inspect both sides.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::resolve(cli.state_dir, cli.config)?;
    let command = cli.command.unwrap_or_default();

    ctx.state().ensure()?;
    let verbose = cli.verbose || command.is_dry_run();
    if let Err(e) = logging::init(verbose, Some(&ctx.log_path())) {
        eprintln!("{}: logging disabled: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!(command = ?command, "starting");

    execute_command(&ctx, command)
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sync(args) => commands::run_sync(ctx, args.into()),
        Commands::Check => commands::run_check(ctx),
        Commands::Collections { target } => commands::run_collections(ctx, target),
        Commands::Fields { target, collection } => {
            commands::run_fields(ctx, target, &collection)
        }
        Commands::Schema { target } => commands::run_schema(ctx, target),
    }
}
