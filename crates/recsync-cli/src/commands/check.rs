//! Check command implementation
//!
//! Runs the same gates a sync passes through without touching any data.

use colored::Colorize;

use recsync_core::{ConnectorFactory, HttpRemote, SourceFactory};

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the check command
pub fn run_check(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;

    println!("{} Checking remote API...", "=>".blue().bold());
    HttpRemote::healthy(&config.remote).map_err(CliError::RemoteUnavailable)?;
    println!(
        "   {} {}",
        "OK".green().bold(),
        config.remote.base_url().cyan()
    );

    println!("{} Checking sources...", "=>".blue().bold());
    let mut failures = 0;
    for (target, structure) in config.targets() {
        let label = format!("{target} ({})", structure.connection_type);
        let result = structure
            .validate()
            .and_then(|()| SourceFactory.connect(structure).map(|_| ()));
        match result {
            Ok(()) => println!("   {} {}", "OK".green().bold(), label.cyan()),
            Err(e) => {
                failures += 1;
                println!("   {} {}: {}", "FAILED".red().bold(), label.cyan(), e);
            }
        }
    }

    if config.targets().next().is_none() {
        println!("   {} no targets configured", "-".dimmed());
    }
    if failures > 0 {
        return Err(CliError::user(format!("{failures} source check(s) failed")));
    }
    Ok(())
}
