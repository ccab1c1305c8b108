//! Draft session domain model.
//!
//! A draft session is one in-progress, multi-step catalogue entry. It holds
//! the free-form field values typed on the detail pages (the data bag) and
//! the workflow choices made on the selection pages.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumString};

/// A single value stored in the data bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// Per-field values of a draft session.
///
/// The bag only grows through [`DataBag::merge`] (shallow overwrite per key)
/// or is emptied wholesale through [`DataBag::clear`]. There is no per-key
/// removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataBag(BTreeMap<String, FieldValue>);

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for constructing patches.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Shallow merge: every key in `patch` overwrites the existing entry.
    pub fn merge(&mut self, patch: DataBag) {
        self.0.extend(patch.0);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy holding only the entries whose key passes `keep`.
    pub fn subset(&self, keep: impl Fn(&str) -> bool) -> DataBag {
        DataBag(
            self.0
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(String, FieldValue)> for DataBag {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        DataBag(iter.into_iter().collect())
    }
}

impl IntoIterator for DataBag {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Whether the user is editing an existing record or creating a new one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkflowAction {
    Edit,
    Create,
}

/// Identifies one of the workflow fields of a [`DraftSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WorkflowField {
    Region,
    TextId,
    TextAction,
    AuthorId,
    AuthorAction,
}

impl WorkflowField {
    pub const ALL: [WorkflowField; 5] = [
        WorkflowField::Region,
        WorkflowField::TextId,
        WorkflowField::TextAction,
        WorkflowField::AuthorId,
        WorkflowField::AuthorAction,
    ];
}

/// A locally persisted, in-progress multi-step form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSession {
    /// Unique session identifier (UUID format), never reassigned
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
    pub data: DataBag,
    pub text_action: Option<WorkflowAction>,
    pub author_action: Option<WorkflowAction>,
    pub text_id: Option<String>,
    pub author_id: Option<String>,
    pub region: Option<String>,
}

impl DraftSession {
    pub fn new(id: String, name: String, now: DateTime<Utc>, data: DataBag) -> Self {
        Self {
            id,
            name,
            created_at: now,
            updated_at: now,
            data,
            text_action: None,
            author_action: None,
            text_id: None,
            author_id: None,
            region: None,
        }
    }

    /// Returns the string form of a workflow field, if set.
    pub fn workflow_value(&self, field: WorkflowField) -> Option<String> {
        match field {
            WorkflowField::Region => self.region.clone(),
            WorkflowField::TextId => self.text_id.clone(),
            WorkflowField::TextAction => self.text_action.map(|a| a.to_string()),
            WorkflowField::AuthorId => self.author_id.clone(),
            WorkflowField::AuthorAction => self.author_action.map(|a| a.to_string()),
        }
    }

    pub fn has_workflow_state(&self) -> bool {
        WorkflowField::ALL
            .iter()
            .any(|f| self.workflow_value(*f).is_some())
    }

    /// Shallow-merges `patch` into the top-level fields. Timestamps are untouched.
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        patch.text_action.apply(&mut self.text_action);
        patch.author_action.apply(&mut self.author_action);
        patch.text_id.apply(&mut self.text_id);
        patch.author_id.apply(&mut self.author_id);
        patch.region.apply(&mut self.region);
    }
}

/// Change to a single optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldPatch<T> {
    #[default]
    Keep,
    Set(T),
    Unset,
}

impl<T> FieldPatch<T> {
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            FieldPatch::Keep => {}
            FieldPatch::Set(value) => *target = Some(value),
            FieldPatch::Unset => *target = None,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, FieldPatch::Keep)
    }
}

impl<T> From<Option<T>> for FieldPatch<T> {
    /// `Some` sets, `None` unsets.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldPatch::Set(v),
            None => FieldPatch::Unset,
        }
    }
}

/// Shallow update of a session's top-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub name: Option<String>,
    pub text_action: FieldPatch<WorkflowAction>,
    pub author_action: FieldPatch<WorkflowAction>,
    pub text_id: FieldPatch<String>,
    pub author_id: FieldPatch<String>,
    pub region: FieldPatch<String>,
}

impl SessionPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn region(mut self, region: impl Into<FieldPatch<String>>) -> Self {
        self.region = region.into();
        self
    }

    pub fn text_id(mut self, text_id: impl Into<FieldPatch<String>>) -> Self {
        self.text_id = text_id.into();
        self
    }

    pub fn text_action(mut self, action: impl Into<FieldPatch<WorkflowAction>>) -> Self {
        self.text_action = action.into();
        self
    }

    pub fn author_id(mut self, author_id: impl Into<FieldPatch<String>>) -> Self {
        self.author_id = author_id.into();
        self
    }

    pub fn author_action(mut self, action: impl Into<FieldPatch<WorkflowAction>>) -> Self {
        self.author_action = action.into();
        self
    }

    /// Patch that sets (or unsets) one workflow field from its string form.
    ///
    /// Action fields that fail to parse are treated as unset.
    pub fn workflow(field: WorkflowField, value: Option<String>) -> Self {
        let patch = Self::default();
        match field {
            WorkflowField::Region => patch.region(value),
            WorkflowField::TextId => patch.text_id(value),
            WorkflowField::AuthorId => patch.author_id(value),
            WorkflowField::TextAction => {
                patch.text_action(value.and_then(|v| v.parse::<WorkflowAction>().ok()))
            }
            WorkflowField::AuthorAction => {
                patch.author_action(value.and_then(|v| v.parse::<WorkflowAction>().ok()))
            }
        }
    }

    /// Combines two patches; fields touched by `other` win.
    pub fn and(mut self, other: SessionPatch) -> Self {
        if other.name.is_some() {
            self.name = other.name;
        }
        if !other.text_action.is_keep() {
            self.text_action = other.text_action;
        }
        if !other.author_action.is_keep() {
            self.author_action = other.author_action;
        }
        if !other.text_id.is_keep() {
            self.text_id = other.text_id;
        }
        if !other.author_id.is_keep() {
            self.author_id = other.author_id;
        }
        if !other.region.is_keep() {
            self.region = other.region;
        }
        self
    }
}

impl From<WorkflowAction> for FieldPatch<WorkflowAction> {
    fn from(value: WorkflowAction) -> Self {
        FieldPatch::Set(value)
    }
}

impl From<String> for FieldPatch<String> {
    fn from(value: String) -> Self {
        FieldPatch::Set(value)
    }
}

impl From<&str> for FieldPatch<String> {
    fn from(value: &str) -> Self {
        FieldPatch::Set(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DraftSession {
        DraftSession::new(
            "s-1".to_string(),
            "Session 1".to_string(),
            Utc::now(),
            DataBag::new(),
        )
    }

    #[test]
    fn test_data_bag_merge_overwrites_shallowly() {
        let mut bag = DataBag::new().with("a", "1").with("b", "2");
        bag.merge(DataBag::new().with("b", "3").with("c", 4.0));

        assert_eq!(bag.len(), 3);
        assert_eq!(bag.get("a"), Some(&FieldValue::Text("1".into())));
        assert_eq!(bag.get("b"), Some(&FieldValue::Text("3".into())));
        assert_eq!(bag.get("c"), Some(&FieldValue::Number(4.0)));
    }

    #[test]
    fn test_data_bag_subset() {
        let bag = DataBag::new().with("keep", "x").with("drop", "y");
        let kept = bag.subset(|k| k == "keep");
        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key("keep"));
    }

    #[test]
    fn test_field_value_serializes_tagged() {
        let json = serde_json::to_value(FieldValue::Text("Vietnam".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "text", "value": "Vietnam"}));

        let date = NaiveDate::from_ymd_opt(1700, 3, 1).unwrap();
        let json = serde_json::to_value(FieldValue::Date(date)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "date", "value": "1700-03-01"}));
    }

    #[test]
    fn test_workflow_action_round_trips_as_lowercase() {
        assert_eq!(WorkflowAction::Edit.to_string(), "edit");
        assert_eq!("create".parse::<WorkflowAction>().unwrap(), WorkflowAction::Create);
        assert!("delete".parse::<WorkflowAction>().is_err());
    }

    #[test]
    fn test_session_patch_keep_set_unset() {
        let mut s = session();
        s.region = Some("China".into());
        s.text_id = Some("t-1".into());

        s.apply(
            SessionPatch::default()
                .region("Vietnam")
                .text_id(None)
                .text_action(WorkflowAction::Edit),
        );

        assert_eq!(s.region.as_deref(), Some("Vietnam"));
        assert_eq!(s.text_id, None);
        assert_eq!(s.text_action, Some(WorkflowAction::Edit));
        assert_eq!(s.author_action, None);
        assert_eq!(s.name, "Session 1");
    }

    #[test]
    fn test_workflow_patch_from_string() {
        let mut s = session();
        s.apply(SessionPatch::workflow(
            WorkflowField::AuthorAction,
            Some("create".into()),
        ));
        assert_eq!(s.author_action, Some(WorkflowAction::Create));
        assert_eq!(
            s.workflow_value(WorkflowField::AuthorAction).as_deref(),
            Some("create")
        );
        assert!(s.has_workflow_state());
    }

    #[test]
    fn test_patch_and_prefers_later_fields() {
        let combined = SessionPatch::default()
            .region("China")
            .and(SessionPatch::default().region("Vietnam").text_id(None));
        assert_eq!(combined.region, FieldPatch::Set("Vietnam".into()));
        assert_eq!(combined.text_id, FieldPatch::Unset);
    }
}
