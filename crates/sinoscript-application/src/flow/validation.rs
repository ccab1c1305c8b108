//! Per-step validation.
//!
//! Validation only gates moving forward; edits are always accepted.

use sinoscript_core::session::{DataBag, DraftSession, WorkflowAction};

use crate::flow::fields::FieldSpec;

pub const SESSION_NAME_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected field errors for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors_for(&self, field: &str) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors_for(field).next().is_some()
    }
}

pub fn validate_session_name(name: &str, report: &mut ValidationReport) {
    let len = name.trim().chars().count();
    if len == 0 {
        report.push("name", "Session name is required");
    } else if len > SESSION_NAME_MAX {
        report.push(
            "name",
            format!("Session name must be at most {} characters", SESSION_NAME_MAX),
        );
    }
}

/// Selection state shown on a select page, after reconciling local input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub region: Option<String>,
    pub id: Option<String>,
    pub action: Option<WorkflowAction>,
}

impl Selection {
    pub fn text_of(session: &DraftSession) -> Self {
        Self {
            region: session.region.clone(),
            id: session.text_id.clone(),
            action: session.text_action,
        }
    }

    pub fn author_of(session: &DraftSession) -> Self {
        Self {
            region: session.region.clone(),
            id: session.author_id.clone(),
            action: session.author_action,
        }
    }

    /// `edit` chosen with no record to edit.
    pub fn edits_nothing(&self) -> bool {
        self.action == Some(WorkflowAction::Edit) && self.id.is_none()
    }
}

pub fn validate_text_selection(selection: &Selection) -> ValidationReport {
    let mut report = ValidationReport::new();

    if selection.region.is_none() {
        report.push("region", "Select a region");
        if selection.id.is_some() {
            report.push("text_id", "A text cannot be chosen without a region");
        }
    }
    match selection.action {
        None => report.push("text_action", "Choose whether to edit or create a text"),
        Some(_) if selection.edits_nothing() => report.push("text_id", "Select the text to edit"),
        Some(_) => {}
    }

    report
}

pub fn validate_author_selection(selection: &Selection) -> ValidationReport {
    let mut report = ValidationReport::new();

    if selection.region.is_none() {
        report.push("region", "Select a region");
    }
    match selection.action {
        None => report.push("author_action", "Choose whether to edit or create an author"),
        Some(_) if selection.edits_nothing() => {
            report.push("author_id", "Select the author to edit")
        }
        Some(_) => {}
    }

    report
}

/// Checks a field group against the values currently shown.
///
/// `raw` returns the text shown in the input for a key, if any.
pub fn validate_fields(
    fields: &[FieldSpec],
    raw: impl Fn(&str) -> Option<String>,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    for spec in fields {
        let value = raw(spec.key).filter(|v| !v.trim().is_empty());
        match value {
            None if spec.required => report.push(spec.key, format!("{} is required", spec.label)),
            None => {}
            Some(v) => {
                if let Err(message) = spec.kind.parse(&v) {
                    report.push(spec.key, format!("{} {}", spec.label, message));
                }
            }
        }
    }

    report
}

/// Display text of a persisted value.
pub fn shown_value(data: &DataBag, key: &str) -> Option<String> {
    data.get(key).map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::fields::{AUTHOR_FIELDS, TEXT_FIELDS};

    #[test]
    fn test_session_name_bounds() {
        let mut report = ValidationReport::new();
        validate_session_name("   ", &mut report);
        validate_session_name(&"x".repeat(101), &mut report);
        assert_eq!(report.errors.len(), 2);

        let mut ok = ValidationReport::new();
        validate_session_name(&format!("  {}  ", "y".repeat(100)), &mut ok);
        assert!(ok.is_valid());
    }

    #[test]
    fn test_text_selection_rules() {
        let empty = validate_text_selection(&Selection::default());
        assert!(empty.has_error("region"));
        assert!(empty.has_error("text_action"));

        let orphan = validate_text_selection(&Selection {
            region: None,
            id: Some("7".into()),
            action: Some(WorkflowAction::Create),
        });
        assert!(orphan.has_error("text_id"));

        let edit_without_text = validate_text_selection(&Selection {
            region: Some("China".into()),
            id: None,
            action: Some(WorkflowAction::Edit),
        });
        assert_eq!(edit_without_text.errors.len(), 1);
        assert!(edit_without_text.has_error("text_id"));

        let create = validate_text_selection(&Selection {
            region: Some("China".into()),
            id: None,
            action: Some(WorkflowAction::Create),
        });
        assert!(create.is_valid());
    }

    #[test]
    fn test_author_selection_rules() {
        let report = validate_author_selection(&Selection {
            region: Some("Korea".into()),
            id: None,
            action: Some(WorkflowAction::Edit),
        });
        assert!(report.has_error("author_id"));

        let report = validate_author_selection(&Selection {
            region: None,
            id: Some("a1".into()),
            action: Some(WorkflowAction::Edit),
        });
        assert!(report.has_error("region"));
        assert!(!report.has_error("author_id"));
    }

    #[test]
    fn test_text_fields_required_and_typed() {
        let data = DataBag::new()
            .with("original_language", "Classical Chinese")
            .with("num_sections", "zero")
            .with("description_link", "ctext.org");
        let report = validate_fields(TEXT_FIELDS, |k| shown_value(&data, k));

        assert!(!report.has_error("original_language"));
        assert!(report.has_error("writing_system"));
        assert!(report.has_error("num_sections"));
        assert!(report.has_error("description_link"));
    }

    #[test]
    fn test_author_optional_fields() {
        let data = DataBag::new()
            .with("author_name_english", "Li Bai")
            .with("author_name_original", "李白");
        let report = validate_fields(AUTHOR_FIELDS, |k| shown_value(&data, k));
        assert!(report.is_valid());
    }
}
