//! The per-user state directory.
//!
//! Configuration, change history and logs live side by side in one folder,
//! `~/.recsync` unless overridden.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default folder name below the home directory
pub const STATE_DIR_NAME: &str = ".recsync";

/// Files kept in the state directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFile {
    /// Sync configuration
    Config,
    /// Change-history digests
    History,
    /// Run log
    Log,
}

impl StateFile {
    /// Get the file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "cfg.json",
            Self::History => "history.json",
            Self::Log => "logs.log",
        }
    }
}

impl std::fmt::Display for StateFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle on the state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Use an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/.recsync`
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self::new(home.join(STATE_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a state file, whether or not it exists.
    pub fn path(&self, file: StateFile) -> PathBuf {
        self.root.join(file.as_str())
    }

    pub fn exists(&self, file: StateFile) -> bool {
        self.path(file).is_file()
    }

    /// Create the directory if missing and return its path.
    pub fn ensure(&self) -> Result<&Path> {
        if !self.root.is_dir() {
            tracing::info!(path = %self.root.display(), "creating state directory");
            fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
        }
        Ok(&self.root)
    }
}
