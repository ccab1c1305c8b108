//! Draft session list persisted through the local store.

use crate::dto::{DraftSessionDTO, create_draft_session_migrator};
use crate::storage::LocalStore;
use sinoscript_core::error::Result;
use sinoscript_core::session::{DraftSession, DraftSessionRepository};

/// Storage key used by the browser portal.
pub const DEFAULT_SESSIONS_KEY: &str = "form-sessions";

/// Schema version assumed for records written without a `version` key.
const LEGACY_VERSION: &str = "1.0.0";

/// Keeps every draft session as one JSON array under a single key.
///
/// Each array element is a flat, versioned record (see [`crate::dto`]).
/// Reads run the records through the migrator; writes always emit the
/// latest version.
pub struct LocalDraftSessionRepository {
    store: LocalStore,
    key: String,
}

impl LocalDraftSessionRepository {
    pub fn new(store: LocalStore) -> Self {
        Self::with_key(store, DEFAULT_SESSIONS_KEY)
    }

    pub fn with_key(store: LocalStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn decode(records: Vec<serde_json::Value>) -> Result<Vec<DraftSession>> {
        let records = records
            .into_iter()
            .map(|mut record| {
                if let Some(obj) = record.as_object_mut() {
                    obj.entry("version")
                        .or_insert_with(|| serde_json::Value::String(LEGACY_VERSION.to_string()));
                }
                record
            })
            .collect::<Vec<_>>();

        let migrator = create_draft_session_migrator()?;
        let sessions = migrator.load_vec_flat_from("draft_session", records)?;
        Ok(sessions)
    }

    fn encode(sessions: &[DraftSession]) -> Result<Vec<serde_json::Value>> {
        let dtos: Vec<DraftSessionDTO> = sessions.iter().map(|s| s.into()).collect();

        let migrator = create_draft_session_migrator()?;
        let json_str = migrator.save_vec_flat(dtos)?;
        let values: Vec<serde_json::Value> = serde_json::from_str(&json_str)?;
        Ok(values)
    }
}

impl DraftSessionRepository for LocalDraftSessionRepository {
    fn load_all(&self) -> Option<Vec<DraftSession>> {
        let records: Vec<serde_json::Value> = self.store.get(&self.key)?;

        match Self::decode(records) {
            Ok(sessions) => {
                tracing::debug!(
                    "[DraftSessionRepository] Loaded {} session(s) from '{}'",
                    sessions.len(),
                    self.key
                );
                Some(sessions)
            }
            Err(e) => {
                tracing::warn!(
                    "[DraftSessionRepository] Discarding unreadable session list '{}': {}",
                    self.key,
                    e
                );
                None
            }
        }
    }

    fn save_all(&self, sessions: &[DraftSession]) {
        match Self::encode(sessions) {
            Ok(values) => self.store.set(&self.key, &values),
            Err(e) => tracing::warn!(
                "[DraftSessionRepository] Failed to encode {} session(s): {}",
                sessions.len(),
                e
            ),
        }
    }
}
