//! Where configuration, history and logs live for this invocation

use std::path::{Path, PathBuf};

use recsync_core::{ConnectionStructure, SyncConfig, Target};
use recsync_fs::{StateDir, StateFile};

use crate::error::{CliError, Result};

/// Resolved paths for one invocation
#[derive(Debug, Clone)]
pub struct Context {
    state: StateDir,
    config_path: PathBuf,
}

impl Context {
    /// Explicit paths win; otherwise everything lives in `~/.recsync`.
    pub fn resolve(state_dir: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let state = match state_dir {
            Some(dir) => StateDir::new(dir),
            None => StateDir::default_location()?,
        };
        let config_path = config.unwrap_or_else(|| state.path(StateFile::Config));
        Ok(Self { state, config_path })
    }

    pub fn state(&self) -> &StateDir {
        &self.state
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn history_path(&self) -> PathBuf {
        self.state.path(StateFile::History)
    }

    pub fn log_path(&self) -> PathBuf {
        self.state.path(StateFile::Log)
    }

    pub fn load_config(&self) -> Result<SyncConfig> {
        if !self.config_path.is_file() {
            return Err(CliError::ConfigMissing {
                path: self.config_path.clone(),
            });
        }
        Ok(SyncConfig::load(&self.config_path)?)
    }
}

/// The connection configured for `target`
pub fn target_structure(config: &SyncConfig, target: Target) -> Result<&ConnectionStructure> {
    config
        .target(target)
        .ok_or(CliError::TargetNotConfigured { target })
}
