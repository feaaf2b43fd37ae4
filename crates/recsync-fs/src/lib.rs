//! Filesystem layer for recsync
//!
//! Provides the per-user state directory, atomic locked writes, content
//! digests and a format-agnostic configuration store.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod state;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use state::{StateDir, StateFile};
