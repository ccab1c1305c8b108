//! Unified path management for SinoScript files.
//!
//! Directories are resolved through `AppPaths` from version-migrate so that
//! configuration and data follow the platform conventions (XDG on Linux).
//!
//! ```text
//! ~/.config/sinoscript/          # Config directory
//! ├── config.toml                # Portal configuration
//! └── logs/                      # Rolling log files
//!     └── sinoscript.log.YYYY-MM-DD
//!
//! ~/.local/share/sinoscript/     # Data directory
//! └── store/                     # Local key-value store, one file per key
//!     ├── form-sessions.json
//!     └── auth-session.json
//! ```

use std::path::PathBuf;
use version_migrate::AppPaths;

use sinoscript_core::error::{PortalError, Result};

pub const APP_NAME: &str = "sinoscript";

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "SINOSCRIPT_CONFIG";
/// Overrides the data directory.
pub const DATA_DIR_ENV: &str = "SINOSCRIPT_DATA_DIR";

pub struct SinoScriptPaths;

impl SinoScriptPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new(APP_NAME)
    }

    pub fn config_dir() -> Result<PathBuf> {
        Self::app_paths()
            .config_dir()
            .map_err(|e| PortalError::config(format!("Cannot resolve config directory: {}", e)))
    }

    /// Data directory, honouring `SINOSCRIPT_DATA_DIR`.
    pub fn data_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        Self::app_paths()
            .data_dir()
            .map_err(|e| PortalError::config(format!("Cannot resolve data directory: {}", e)))
    }

    /// Path to config.toml, honouring `SINOSCRIPT_CONFIG`.
    pub fn config_file() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("logs"))
    }

    /// Default location of the file-backed key-value store.
    pub fn store_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("store"))
    }
}
