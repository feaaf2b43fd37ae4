//! Phases of a single target sync

use std::fmt;

/// Where a target sync currently is.
///
/// Phases advance strictly in declaration order; `Aborted` ends a target
/// early and is reachable from any phase that can fail as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetPhase {
    Idle,
    ConnectorHealthCheck,
    FetchRemoteIdentifiers,
    FetchNewRows,
    PushNew,
    CommitNewHistory,
    FetchCandidateRows,
    ClassifyChanged,
    PushChangedOneByOne,
    CommitChangedHistory,
    Done,
    Aborted,
}

impl TargetPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ConnectorHealthCheck => "connector health check",
            Self::FetchRemoteIdentifiers => "fetching remote identifiers",
            Self::FetchNewRows => "fetching new rows",
            Self::PushNew => "pushing new records",
            Self::CommitNewHistory => "committing new records",
            Self::FetchCandidateRows => "fetching known rows",
            Self::ClassifyChanged => "classifying changes",
            Self::PushChangedOneByOne => "pushing updates",
            Self::CommitChangedHistory => "committing updates",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for TargetPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
