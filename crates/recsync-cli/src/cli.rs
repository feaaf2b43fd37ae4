//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use recsync_connectors::ConnectionType;
use recsync_core::{SyncOptions, Target};

/// recsync - Keep a remote record store in line with local databases
#[derive(Parser, Debug)]
#[command(name = "recsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to cfg.json in the state directory)
    #[arg(long, global = true, env = "RECSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// State directory holding configuration, history and logs
    #[arg(long, global = true, env = "RECSYNC_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// The command to run; `sync` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Push new and changed records to the remote
    Sync(SyncArgs),

    /// Probe the remote API and every configured source
    Check,

    /// List the collections of a target's source
    Collections {
        /// Target whose connection is used (asset or project)
        target: Target,
    },

    /// List the fields of a collection with sample values
    Fields {
        /// Target whose connection is used (asset or project)
        target: Target,

        /// Table or view to inspect
        collection: String,
    },

    /// Show the fields the remote accepts for a target
    Schema {
        /// Target to describe (asset or project)
        target: Target,
    },
}

impl Commands {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::Sync(args) if args.dry_run)
    }
}

impl Default for Commands {
    fn default() -> Self {
        Self::Sync(SyncArgs::default())
    }
}

/// Options of the sync command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncArgs {
    /// Compute and log what would be sent without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Only sync targets bound to these source types
    #[arg(long, num_args = 1..)]
    pub limit_src: Vec<ConnectionType>,

    /// Only sync these targets
    #[arg(long, num_args = 1..)]
    pub limit_target: Vec<Target>,
}

impl From<SyncArgs> for SyncOptions {
    fn from(args: SyncArgs) -> Self {
        SyncOptions {
            dry_run: args.dry_run,
            targets: args.limit_target,
            sources: args.limit_src,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn no_command_means_sync() {
        let cli = parse(&["recsync"]);
        assert_eq!(cli.command.unwrap_or_default(), Commands::default());
    }

    #[test]
    fn sync_limits_parse() {
        let cli = parse(&[
            "recsync",
            "sync",
            "--dry-run",
            "--limit-src",
            "sqlite",
            "TopKontor",
            "--limit-target",
            "project",
        ]);
        let Some(Commands::Sync(args)) = cli.command else {
            panic!("expected sync");
        };
        assert!(args.dry_run);
        assert_eq!(
            args.limit_src,
            vec![ConnectionType::Sqlite, ConnectionType::TopKontor]
        );
        assert_eq!(args.limit_target, vec![Target::Project]);
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Cli::try_parse_from(["recsync", "sync", "--limit-src", "excel"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["recsync", "check", "-v", "--state-dir", "/tmp/state"]);
        assert!(cli.verbose);
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/state")));
        assert_eq!(cli.command, Some(Commands::Check));
    }

    #[test]
    fn fields_takes_target_and_collection() {
        let cli = parse(&["recsync", "fields", "asset", "machines"]);
        assert_eq!(
            cli.command,
            Some(Commands::Fields {
                target: Target::Asset,
                collection: "machines".into()
            })
        );
    }

    #[test]
    fn dry_run_detection() {
        assert!(parse(&["recsync", "sync", "--dry-run"]).command.unwrap().is_dry_run());
        assert!(!Commands::Check.is_dry_run());
    }
}
