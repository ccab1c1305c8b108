//! Draft session DTOs and migrations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use version_migrate::{IntoDomain, MigratesTo, Versioned};

use sinoscript_core::error::Result;
use sinoscript_core::session::{DataBag, DraftSession, FieldValue, WorkflowAction};

/// Draft session V1.0.0: the record layout written by the browser portal.
///
/// Timestamps are ISO-8601 strings and the data bag is untyped JSON.
/// Records stored without a `version` key are read as this version.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct DraftSessionV1_0_0 {
    pub id: String,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(rename = "textId", default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<String>,
    #[serde(rename = "authorId", default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Draft session V1.1.0.
///
/// camelCase throughout, typed timestamps, typed workflow actions and a
/// tagged data bag.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
#[serde(rename_all = "camelCase")]
pub struct DraftSessionV1_1_0 {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub data: DataBag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_action: Option<WorkflowAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_action: Option<WorkflowAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Type alias for the latest draft session version.
pub type DraftSessionDTO = DraftSessionV1_1_0;

// ============================================================================
// Migration implementations
// ============================================================================

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_action(raw: Option<String>) -> Option<WorkflowAction> {
    raw.and_then(|s| s.parse().ok())
}

/// Untyped JSON to the closed field value union.
///
/// Nulls are dropped; arrays and objects are kept as their JSON text.
fn field_value_from_json(value: serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(FieldValue::Bool(b)),
        serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
        serde_json::Value::String(s) => match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(date) => Some(FieldValue::Date(date)),
            Err(_) => Some(FieldValue::Text(s)),
        },
        other => Some(FieldValue::Text(other.to_string())),
    }
}

/// Data-bag keys the browser portal stored selections under.
const REGION_KEYS: &[&str] = &["region"];
const TEXT_ID_KEYS: &[&str] = &["textId", "text_id"];
const AUTHOR_ID_KEYS: &[&str] = &["authorId", "author_id"];

/// Removes `keys` from the bag, returning the first usable value.
fn take_selection(data: &mut BTreeMap<String, serde_json::Value>, keys: &[&str]) -> Option<String> {
    let mut found = None;
    for key in keys {
        let value = match data.remove(*key) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        found = found.or(value);
    }
    found
}

/// Migration from V1.0.0 to V1.1.0.
/// Parses timestamps and actions and types the data bag. Selections the
/// browser kept in the data bag move to the workflow fields; a top-level
/// value wins. An unreadable `createdAt` falls back to the epoch and an
/// unreadable `updatedAt` to the creation time.
impl MigratesTo<DraftSessionV1_1_0> for DraftSessionV1_0_0 {
    fn migrate(mut self) -> DraftSessionV1_1_0 {
        let region = self.region.take().or_else(|| take_selection(&mut self.data, REGION_KEYS));
        let text_id = self.text_id.take().or_else(|| take_selection(&mut self.data, TEXT_ID_KEYS));
        let author_id = self
            .author_id
            .take()
            .or_else(|| take_selection(&mut self.data, AUTHOR_ID_KEYS));
        for keys in [REGION_KEYS, TEXT_ID_KEYS, AUTHOR_ID_KEYS] {
            take_selection(&mut self.data, keys);
        }

        let created_at = parse_timestamp(&self.created_at).unwrap_or_else(|| {
            tracing::warn!(
                "[DraftSessionMigration] Session '{}' has unreadable createdAt '{}'",
                self.id,
                self.created_at
            );
            DateTime::<Utc>::UNIX_EPOCH
        });
        let updated_at = parse_timestamp(&self.updated_at)
            .unwrap_or(created_at)
            .max(created_at);

        let data = self
            .data
            .into_iter()
            .filter_map(|(k, v)| field_value_from_json(v).map(|v| (k, v)))
            .collect();

        DraftSessionV1_1_0 {
            id: self.id,
            name: self.name,
            created_at,
            updated_at,
            data,
            text_action: parse_action(self.action_text),
            author_action: parse_action(self.action_author),
            text_id,
            author_id,
            region,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<DraftSession> for DraftSessionV1_1_0 {
    fn into_domain(self) -> DraftSession {
        DraftSession {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
            data: self.data,
            text_action: self.text_action,
            author_action: self.author_action,
            text_id: self.text_id,
            author_id: self.author_id,
            region: self.region,
        }
    }
}

impl From<&DraftSession> for DraftSessionV1_1_0 {
    fn from(session: &DraftSession) -> Self {
        DraftSessionV1_1_0 {
            id: session.id.clone(),
            name: session.name.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
            data: session.data.clone(),
            text_action: session.text_action,
            author_action: session.author_action,
            text_id: session.text_id.clone(),
            author_id: session.author_id.clone(),
            region: session.region.clone(),
        }
    }
}

impl version_migrate::FromDomain<DraftSession> for DraftSessionV1_1_0 {
    fn from_domain(session: DraftSession) -> Self {
        DraftSessionV1_1_0::from(&session)
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates the migrator for draft session records.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: parses timestamps and actions, types the data bag
/// - V1.1.0 → DraftSession
pub fn create_draft_session_migrator() -> Result<version_migrate::Migrator> {
    let mut migrator = version_migrate::Migrator::builder().build();

    let draft_session_path = version_migrate::Migrator::define("draft_session")
        .from::<DraftSessionV1_0_0>()
        .step::<DraftSessionV1_1_0>()
        .into_with_save::<DraftSession>();

    migrator.register(draft_session_path)?;

    Ok(migrator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrator_creation() {
        assert!(create_draft_session_migrator().is_ok());
    }

    #[test]
    fn test_migration_v1_0_0_to_domain() {
        let migrator = create_draft_session_migrator().unwrap();

        let records = vec![serde_json::json!({
            "version": "1.0.0",
            "id": "0b7e",
            "name": "Session 1",
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-01T10:05:00.000Z",
            "data": {
                "text_name_english": "Classic of Poetry",
                "num_sections": 3,
                "creation_date": "1000-01-01",
                "unused": null
            },
            "action_text": "edit",
            "textId": "17",
            "action_author": "nonsense",
            "region": "China"
        })];

        let sessions: Vec<DraftSession> = migrator
            .load_vec_flat_from("draft_session", records)
            .unwrap();

        assert_eq!(sessions.len(), 1);
        let session = &sessions[0];
        assert_eq!(session.id, "0b7e");
        assert_eq!(session.text_action, Some(WorkflowAction::Edit));
        assert_eq!(session.author_action, None);
        assert_eq!(session.text_id.as_deref(), Some("17"));
        assert_eq!(session.region.as_deref(), Some("China"));
        assert!(session.updated_at > session.created_at);
        assert_eq!(session.data.len(), 3);
        assert_eq!(
            session.data.get("num_sections"),
            Some(&FieldValue::Number(3.0))
        );
        assert_eq!(
            session.data.get("creation_date"),
            Some(&FieldValue::Date(NaiveDate::from_ymd_opt(1000, 1, 1).unwrap()))
        );
    }

    #[test]
    fn test_save_writes_latest_version() {
        let migrator = create_draft_session_migrator().unwrap();
        let now = Utc::now();
        let session = DraftSession::new(
            "abc".into(),
            "Session 1".into(),
            now,
            DataBag::new().with("author_name_english", "Du Fu"),
        );

        let dtos: Vec<DraftSessionDTO> = vec![(&session).into()];
        let json = migrator.save_vec_flat(dtos).unwrap();

        assert!(json.contains("\"version\":\"1.1.0\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"kind\":\"text\""));
    }

    #[test]
    fn test_unreadable_timestamps_fall_back() {
        let legacy = DraftSessionV1_0_0 {
            id: "x".into(),
            name: "Session 1".into(),
            created_at: "yesterday".into(),
            updated_at: "".into(),
            data: BTreeMap::new(),
            action_text: None,
            text_id: None,
            author_id: None,
            action_author: None,
            region: None,
        };
        let migrated: DraftSessionV1_1_0 = legacy.migrate();
        assert_eq!(migrated.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(migrated.updated_at, migrated.created_at);
    }

    #[test]
    fn test_top_level_selection_wins_over_data_bag() {
        let mut data = BTreeMap::new();
        data.insert("region".to_string(), serde_json::json!("Japan"));
        data.insert("author_id".to_string(), serde_json::json!(42));
        let legacy = DraftSessionV1_0_0 {
            id: "y".into(),
            name: "Session 2".into(),
            created_at: "2024-05-01T08:00:00.000Z".into(),
            updated_at: "2024-05-01T08:00:00.000Z".into(),
            data,
            action_text: None,
            text_id: None,
            author_id: None,
            action_author: Some("edit".into()),
            region: Some("Korea".into()),
        };

        let migrated: DraftSessionV1_1_0 = legacy.migrate();
        assert_eq!(migrated.region.as_deref(), Some("Korea"));
        assert_eq!(migrated.author_id.as_deref(), Some("42"));
        assert!(migrated.data.is_empty());
    }
}
