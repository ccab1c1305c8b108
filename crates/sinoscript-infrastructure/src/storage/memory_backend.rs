//! In-process key-value store.

use std::collections::HashMap;
use std::sync::Mutex;

use sinoscript_core::error::{PortalError, Result};
use sinoscript_core::storage::KeyValueBackend;

/// Map-backed store with an optional total size limit.
///
/// With a quota set, a write that would push the summed key and value bytes
/// past the limit fails with a storage error and leaves the map unchanged.
#[derive(Debug, Default)]
pub struct MemoryKeyValueBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Raw stored text for `key`, bypassing the trait's error type.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }
}

impl KeyValueBackend for MemoryKeyValueBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock();
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(PortalError::storage(format!(
                    "Quota exceeded writing '{}': {} bytes needed, {} allowed",
                    key, needed, quota
                )));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
