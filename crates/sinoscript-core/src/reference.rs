//! Read-only reference records from the remote catalogue and the source
//! contract used to fetch them.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// A geographic region texts are grouped by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
}

/// A name carried in both English and the original script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    #[serde(default)]
    pub english: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

/// A catalogued text.
///
/// Columns beyond the id, name and region are kept as-is in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: LocalizedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A catalogued author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: LocalizedName,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TextRecord {
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

impl AuthorRecord {
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

/// Row ids arrive as numbers or strings depending on the table.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// The remote catalogue.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// All regions, ordered by name.
    async fn regions(&self) -> Result<Vec<Region>>;

    async fn texts_in_region(&self, region: &str) -> Result<Vec<TextRecord>>;

    /// `Ok(None)` when no text has that id.
    async fn text(&self, id: &str) -> Result<Option<TextRecord>>;

    async fn authors(&self) -> Result<Vec<AuthorRecord>>;

    async fn author(&self, id: &str) -> Result<Option<AuthorRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_record_accepts_numeric_id_and_extra_columns() {
        let json = serde_json::json!({
            "id": 42,
            "name": {"english": "Classic of Poetry", "original": "詩經"},
            "region": "China",
            "writing_system": "Hanzi"
        });
        let text: TextRecord = serde_json::from_value(json).unwrap();
        assert_eq!(text.id, "42");
        assert_eq!(text.name.english, "Classic of Poetry");
        assert_eq!(text.name.original.as_deref(), Some("詩經"));
        assert_eq!(text.extra_str("writing_system"), Some("Hanzi"));
    }

    #[test]
    fn test_author_record_rejects_object_id() {
        let json = serde_json::json!({"id": {"nested": true}, "name": {"english": "X"}});
        assert!(serde_json::from_value::<AuthorRecord>(json).is_err());
    }
}
