//! Run outcomes, the end-of-run summary and its notification

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{SourceKind, Target};
use crate::sync::TargetPhase;

/// Result of syncing one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub target: Target,
    pub source: SourceKind,
    pub success: usize,
    pub failed: usize,
    /// Records fetched as unknown to the remote
    pub new_records: usize,
    /// Known records whose content changed
    pub changed_records: usize,
    /// Phase the target stopped in, when it did not finish
    pub aborted_at: Option<TargetPhase>,
}

impl TargetOutcome {
    pub fn new(target: Target, source: impl Into<SourceKind>) -> Self {
        Self {
            target,
            source: source.into(),
            success: 0,
            failed: 0,
            new_records: 0,
            changed_records: 0,
            aborted_at: None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted_at.is_some()
    }

    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// Overall state of a run, as reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStatus {
    NothingToDo,
    AllSucceeded,
    PartialFailure,
    TotalFailure,
}

impl SummaryStatus {
    pub fn severity(&self) -> Severity {
        match self {
            Self::NothingToDo => Severity::Debug,
            Self::AllSucceeded => Severity::Info,
            Self::PartialFailure | Self::TotalFailure => Severity::Error,
        }
    }
}

/// Notification severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Aggregated outcome of a whole run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub targets: Vec<TargetOutcome>,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            dry_run,
            started_at: now,
            finished_at: now,
            targets: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: TargetOutcome) {
        self.targets.push(outcome);
        self.finished_at = Utc::now();
    }

    pub fn success(&self) -> usize {
        self.targets.iter().map(|t| t.success).sum()
    }

    pub fn failed(&self) -> usize {
        self.targets.iter().map(|t| t.failed).sum()
    }

    pub fn total(&self) -> usize {
        self.success() + self.failed()
    }

    /// Share of successful records in percent; `None` when nothing ran
    pub fn success_rate(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.success() as f64 * 100.0 / total as f64),
        }
    }

    pub fn status(&self) -> SummaryStatus {
        match (self.success(), self.failed()) {
            (0, 0) => SummaryStatus::NothingToDo,
            (_, 0) => SummaryStatus::AllSucceeded,
            (0, _) => SummaryStatus::TotalFailure,
            _ => SummaryStatus::PartialFailure,
        }
    }

    pub fn severity(&self) -> Severity {
        self.status().severity()
    }

    /// Operator-facing text of the summary
    pub fn message(&self) -> String {
        let mut lines = Vec::new();
        match self.status() {
            SummaryStatus::NothingToDo => lines.push("Sync finished. Nothing to do.".to_string()),
            _ => {
                lines.push(format!("Sync finished. {} records processed.", self.total()));
                if let Some(rate) = self.success_rate() {
                    lines.push(format!("Succeeded: {} ({rate:.1}%).", self.success()));
                }
                if self.failed() > 0 {
                    lines.push(format!("{} failures occurred, see the log.", self.failed()));
                }
            }
        }
        for outcome in self.targets.iter().filter(|t| t.is_aborted()) {
            if let Some(phase) = outcome.aborted_at {
                lines.push(format!(
                    "Target {} ({}) aborted during {phase}.",
                    outcome.target, outcome.source
                ));
            }
        }
        if self.dry_run {
            lines.push("Dry run: no data was changed.".to_string());
        }
        lines.join("\n")
    }
}

/// Receives the end-of-run summary.
pub trait Notifier {
    fn notify(&self, summary: &RunSummary);
}

/// Writes summaries to the log, dropping those below `min_level`.
#[derive(Debug, Clone, Copy)]
pub struct LogNotifier {
    min_level: Severity,
}

impl LogNotifier {
    pub fn new(min_level: Severity) -> Self {
        Self { min_level }
    }

    /// Whether a summary with `severity` passes the threshold
    pub fn accepts(&self, severity: Severity) -> bool {
        severity >= self.min_level
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, summary: &RunSummary) {
        let severity = summary.severity();
        if !self.accepts(severity) {
            return;
        }
        let message = summary.message();
        let (success, failed) = (summary.success(), summary.failed());
        match severity {
            Severity::Debug => tracing::debug!(success, failed, "{message}"),
            Severity::Info => tracing::info!(success, failed, "{message}"),
            Severity::Warn => tracing::warn!(success, failed, "{message}"),
            Severity::Error => tracing::error!(success, failed, "{message}"),
        }
    }
}
