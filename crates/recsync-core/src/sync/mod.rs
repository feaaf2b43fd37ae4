//! Reconciliation of local sources against the remote record store
//!
//! This module provides:
//! - **phase**: the steps a target passes through
//! - **factory**: how configured sources become connectors
//! - **engine**: the run itself, one target after the other

mod engine;
mod factory;
mod phase;

pub use engine::{Reconciler, SyncOptions};
pub use factory::{ConnectorFactory, SourceFactory};
pub use phase::TargetPhase;
