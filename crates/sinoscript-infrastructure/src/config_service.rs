//! Portal configuration loaded from `config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::draft_session_repository::DEFAULT_SESSIONS_KEY;
use crate::paths::SinoScriptPaths;
use sinoscript_core::error::{PortalError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the file-backed store; the platform data dir when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub sessions_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            sessions_key: DEFAULT_SESSIONS_KEY.to_string(),
        }
    }
}

/// Hosted catalogue endpoint. The portal runs offline when `base_url` is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
    pub timeout_secs: u64,
    /// JSON catalogue served when running offline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalogue_file: Option<PathBuf>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            anon_key: None,
            timeout_secs: 10,
            catalogue_file: None,
        }
    }
}

impl RemoteConfig {
    pub fn is_configured(&self) -> bool {
        self.base_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `SINOSCRIPT_LOG` is unset.
    pub level: String,
    /// Also write a daily-rolling log file.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub storage: StorageConfig,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

impl PortalConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Directory for the file-backed key-value store.
    pub fn store_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => SinoScriptPaths::store_dir(),
        }
    }
}

/// Loads and caches the portal configuration.
///
/// The file is read lazily on first access. A missing file yields the
/// defaults; a malformed one is an error.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<PortalConfig>>>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Service bound to the platform config file (or `SINOSCRIPT_CONFIG`).
    pub fn from_default_location() -> Result<Self> {
        Ok(Self::new(SinoScriptPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_config(&self) -> Result<PortalConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load_config(&self.path)?;

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(path: &Path) -> Result<PortalConfig> {
        if !path.exists() {
            tracing::debug!(
                "[ConfigService] No config at {}, using defaults",
                path.display()
            );
            return Ok(PortalConfig::default());
        }

        let content = fs::read_to_string(path)?;
        PortalConfig::from_toml_str(&content).map_err(|e| {
            PortalError::config(format!("Invalid config '{}': {}", path.display(), e))
        })
    }
}
