//! Field groups of the detail pages.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use sinoscript_core::reference::{AuthorRecord, TextRecord};
use sinoscript_core::session::{DataBag, FieldValue};

/// How raw input for a field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Whole number greater than zero.
    PositiveInt,
    /// `http(s)` URL.
    Url,
    /// ISO date when it parses as one, free text otherwise.
    DateOrText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Column of the remote record this field is pre-filled from.
    pub column: Option<&'static str>,
}

const fn field(
    key: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
    column: Option<&'static str>,
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required,
        column,
    }
}

pub const TEXT_NAME_ENGLISH: &str = "text_name_english";
pub const TEXT_NAME_ORIGINAL: &str = "text_name_original";
pub const AUTHOR_NAME_ENGLISH: &str = "author_name_english";
pub const AUTHOR_NAME_ORIGINAL: &str = "author_name_original";

pub const TEXT_FIELDS: &[FieldSpec] = &[
    field("original_language", "Original language", FieldKind::Text, true, Some("original_language")),
    field("writing_system", "Writing system", FieldKind::Text, true, Some("writing_system")),
    field(TEXT_NAME_ENGLISH, "Name (English)", FieldKind::Text, true, None),
    field(TEXT_NAME_ORIGINAL, "Name (original)", FieldKind::Text, true, None),
    field("creation_date", "Creation date", FieldKind::DateOrText, true, Some("creation_date")),
    field("description_content", "Description", FieldKind::Text, true, Some("description_content")),
    field("description_source", "Description source", FieldKind::Text, true, Some("description_source")),
    field("description_link", "Description link", FieldKind::Url, false, Some("description_link")),
    field("num_sections", "Number of sections", FieldKind::PositiveInt, true, Some("num_sections")),
    field("num_chapters", "Number of chapters", FieldKind::PositiveInt, true, Some("num_chapters")),
];

pub const AUTHOR_FIELDS: &[FieldSpec] = &[
    field(AUTHOR_NAME_ENGLISH, "Name (English)", FieldKind::Text, true, None),
    field(AUTHOR_NAME_ORIGINAL, "Name (original)", FieldKind::Text, true, None),
    field("author_origin_country", "Country of origin", FieldKind::Text, false, Some("origin_country")),
    field("author_birthdate", "Birth date", FieldKind::DateOrText, false, Some("birthdate")),
    field("author_deathdate", "Death date", FieldKind::DateOrText, false, Some("deathdate")),
];

pub fn find_field(fields: &[FieldSpec], key: &str) -> Option<FieldSpec> {
    fields.iter().find(|f| f.key == key).copied()
}

fn url_pattern() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("URL pattern must compile")
    })
}

impl FieldKind {
    /// Interprets `raw` for storage. `Err` carries the message shown next to
    /// the field; callers may still store the raw text.
    pub fn parse(&self, raw: &str) -> Result<FieldValue, String> {
        let trimmed = raw.trim();
        match self {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::PositiveInt => match trimmed.parse::<u32>() {
                Ok(n) if n > 0 => Ok(FieldValue::Number(f64::from(n))),
                _ => Err("must be a whole number greater than zero".to_string()),
            },
            FieldKind::Url => {
                if url_pattern().is_match(trimmed) {
                    Ok(FieldValue::Text(trimmed.to_string()))
                } else {
                    Err("must be an http(s) link".to_string())
                }
            }
            FieldKind::DateOrText => match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                Ok(date) => Ok(FieldValue::Date(date)),
                Err(_) => Ok(FieldValue::Text(raw.to_string())),
            },
        }
    }
}

fn value_from_json(spec: &FieldSpec, value: &serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => {
            Some(spec.kind.parse(s).unwrap_or_else(|_| FieldValue::Text(s.clone())))
        }
        serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
        serde_json::Value::Bool(b) => Some(FieldValue::Bool(*b)),
        other => Some(FieldValue::Text(other.to_string())),
    }
}

fn prefill_from(
    fields: &[FieldSpec],
    names: [(&str, Option<&str>); 2],
    extra: &std::collections::BTreeMap<String, serde_json::Value>,
) -> DataBag {
    let mut bag = DataBag::new();
    for (key, value) in names {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            bag.insert(key, value);
        }
    }
    for spec in fields {
        let Some(column) = spec.column else { continue };
        if let Some(value) = extra.get(column).and_then(|v| value_from_json(spec, v)) {
            bag.insert(spec.key, value);
        }
    }
    bag
}

/// Field values of an existing text, keyed like [`TEXT_FIELDS`].
pub fn text_prefill(text: &TextRecord) -> DataBag {
    prefill_from(
        TEXT_FIELDS,
        [
            (TEXT_NAME_ENGLISH, Some(text.name.english.as_str())),
            (TEXT_NAME_ORIGINAL, text.name.original.as_deref()),
        ],
        &text.extra,
    )
}

/// Field values of an existing author, keyed like [`AUTHOR_FIELDS`].
pub fn author_prefill(author: &AuthorRecord) -> DataBag {
    prefill_from(
        AUTHOR_FIELDS,
        [
            (AUTHOR_NAME_ENGLISH, Some(author.name.english.as_str())),
            (AUTHOR_NAME_ORIGINAL, author.name.original.as_deref()),
        ],
        &author.extra,
    )
}
