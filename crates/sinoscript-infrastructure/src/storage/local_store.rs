//! JSON adapter over a [`KeyValueBackend`].
//!
//! Every failure (backend unavailable, quota exceeded, undecodable value) is
//! logged and swallowed here. Callers see a missing value on read and nothing
//! at all on write.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use sinoscript_core::storage::KeyValueBackend;

#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Serializes `value` as JSON and stores it under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("[LocalStore] Failed to serialize value for '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = self.backend.write(key, &json) {
            tracing::warn!("[LocalStore] Failed to write '{}': {}", key, e);
        }
    }

    /// Reads and decodes the value under `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("[LocalStore] Failed to read '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("[LocalStore] Failed to decode '{}': {}", key, e);
                None
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            tracing::warn!("[LocalStore] Failed to remove '{}': {}", key, e);
        }
    }
}
