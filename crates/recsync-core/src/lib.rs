//! Reconciliation engine for recsync
//!
//! Keeps a remote record store in line with local sources by pushing only
//! what is new or changed:
//!
//! - **history**: content digests of the last pushed version of each record
//! - **transform**: field mapping from source rows to remote payloads
//! - **remote**: the remote record API
//! - **sync**: the per-target reconciliation run
//! - **report**: run summary and notification
//!
//! # Architecture
//!
//! ```text
//!                 recsync-cli
//!                      |
//!                 recsync-core
//!                  /        \
//!   recsync-connectors    recsync-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use recsync_core::{HistoryStore, HttpRemote, Reconciler, SyncConfig, SyncOptions};
//!
//! let config = SyncConfig::load(&path)?;
//! let remote = HttpRemote::healthy(&config.remote)?;
//! let mut history = HistoryStore::load(&history_path)?;
//! let summary = Reconciler::new(&remote, &mut history, SyncOptions::default()).run(&config);
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod remote;
pub mod report;
pub mod sync;
pub mod template;
pub mod transform;

pub use config::{
    ConnectionStructure, FieldMapping, FieldRule, NotifyConfig, RemoteConfig, SourceKind,
    SyncConfig, Target,
};
pub use error::{Error, Result};
pub use history::{HashHistory, HistoryStore, ident_key, record_digest};
pub use remote::{HttpRemote, Payload, RemoteApi};
pub use report::{LogNotifier, Notifier, RunSummary, Severity, SummaryStatus, TargetOutcome};
pub use sync::{ConnectorFactory, Reconciler, SourceFactory, SyncOptions, TargetPhase};
pub use template::Template;
pub use transform::{transform, transform_one};
