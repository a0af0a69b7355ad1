//! Tool configuration
//!
//! Where the RizomUV executable lives and how runs are supervised. The
//! configuration is stored in `{config_dir}/rizom-stage/config.json`; a
//! missing file means defaults. `RIZOMUV_PATH` overrides the executable.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable that overrides the configured executable
pub const EXECUTABLE_ENV: &str = "RIZOMUV_PATH";

/// Configuration for running RizomUV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolConfig {
    /// Path to the RizomUV executable
    pub executable: PathBuf,
    /// Kill RizomUV if a run takes longer than this many seconds
    pub timeout_secs: Option<u64>,
    /// Keep the generated script after a run
    pub keep_script: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            timeout_secs: None,
            keep_script: false,
        }
    }
}

impl ToolConfig {
    /// Run timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the configuration from `path`
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the configuration from the default location and apply the
    /// environment override
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) => Self::load_from(&path)?,
            None => {
                warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `RIZOMUV_PATH` if it is set and not empty
    pub fn apply_env(&mut self) {
        if let Some(path) = std::env::var_os(EXECUTABLE_ENV).filter(|p| !p.is_empty()) {
            self.executable = PathBuf::from(path);
        }
    }

    /// Save the configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Save the configuration to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()
            .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;
        self.save_to(&path)?;
        Ok(path)
    }
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("rizom-stage").join("config.json"))
}

fn default_executable() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Program Files\Rizom Lab\RizomUV 2022\rizomuv.exe")
    } else {
        PathBuf::from("rizomuv")
    }
}
