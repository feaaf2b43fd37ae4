//! Sync command implementation

use colored::Colorize;

use recsync_core::{
    HistoryStore, HttpRemote, LogNotifier, Notifier, Reconciler, RunSummary, SummaryStatus,
    SyncOptions, TargetOutcome,
};

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the sync command
///
/// Probes the remote first; when that fails nothing else is attempted.
/// Per-target failures end up in the summary, not in the exit code.
pub fn run_sync(ctx: &Context, options: SyncOptions) -> Result<()> {
    let config = ctx.load_config()?;

    println!(
        "{} Connecting to {}...",
        "=>".blue().bold(),
        config.remote.base_url().cyan()
    );
    let remote = HttpRemote::healthy(&config.remote).map_err(|e| {
        tracing::error!(error = %e, "remote API unavailable; nothing was sent");
        CliError::RemoteUnavailable(e)
    })?;

    let mut history = HistoryStore::load(&ctx.history_path())?;
    let summary = Reconciler::new(&remote, &mut history, options).run(&config);

    LogNotifier::new(config.notify.min_level).notify(&summary);
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if summary.dry_run {
        println!("{} Dry run, nothing was written.", "DRY-RUN".yellow().bold());
    }
    for outcome in &summary.targets {
        print_outcome(outcome);
    }

    let status = match summary.status() {
        SummaryStatus::NothingToDo => "OK".green().bold(),
        SummaryStatus::AllSucceeded => "OK".green().bold(),
        SummaryStatus::PartialFailure => "PARTIAL".yellow().bold(),
        SummaryStatus::TotalFailure => "FAILED".red().bold(),
    };
    println!();
    for line in summary.message().lines() {
        println!("{status} {line}");
    }
}

fn print_outcome(outcome: &TargetOutcome) {
    let label = format!("{} ({})", outcome.target, outcome.source);
    match outcome.aborted_at {
        Some(phase) => println!(
            "   {} {}: aborted during {}",
            "x".red(),
            label.cyan(),
            phase
        ),
        None if outcome.failed > 0 => println!(
            "   {} {}: {} ok, {} failed",
            "!".yellow(),
            label.cyan(),
            outcome.success,
            outcome.failed
        ),
        None => println!(
            "   {} {}: {} new, {} changed, {} ok",
            "+".green(),
            label.cyan(),
            outcome.new_records,
            outcome.changed_records,
            outcome.success
        ),
    }
}
