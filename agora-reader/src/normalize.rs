//! Field normalization
//!
//! The store hands back loosely-typed fields: the same field may arrive as a
//! string, a list, or not at all. Each function here maps one field to a
//! single canonical type. Normalization is pure and never fails; ambiguous
//! content degrades to a documented default (empty list, `Unrecognized`,
//! absent optional).

use agora_common::{Stance, Topic, Viewpoint};
use serde_json::Value;

use crate::record_store::RawRecord;

/// Field names used by the topic and viewpoint tables
pub mod fields {
    pub const QUESTION: &str = "Question";
    pub const HASHTAGS: &str = "Hashtag List";
    pub const TEXT: &str = "Text";
    pub const URL: &str = "URL";
    pub const AUTHOR: &str = "Author";
    pub const STANCE: &str = "Stance";
}

/// Hashtag-like field to an ordered list of `#`-prefixed tags
///
/// - absent or null → empty list
/// - list → each string element trimmed, empties dropped
/// - string → split on commas and/or whitespace runs, empties dropped
///
/// A piece made only of `#` counts as empty.
///
/// A leading `#` is added only when missing, so canonical input is returned
/// unchanged.
pub fn hashtags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| has_name(tag))
            .map(with_hash)
            .collect(),
        Some(Value::String(raw)) => raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|tag| has_name(tag))
            .map(with_hash)
            .collect(),
        _ => Vec::new(),
    }
}

fn has_name(tag: &str) -> bool {
    !tag.trim_start_matches('#').is_empty()
}

fn with_hash(tag: &str) -> String {
    if tag.starts_with('#') {
        tag.to_string()
    } else {
        format!("#{}", tag)
    }
}

/// Stance field, exact case-sensitive match on `For`, `Against`, `Mixed`
pub fn stance(value: Option<&Value>) -> Stance {
    match value.and_then(Value::as_str) {
        Some("For") => Stance::For,
        Some("Against") => Stance::Against,
        Some("Mixed") => Stance::Mixed,
        _ => Stance::Unrecognized,
    }
}

/// Optional scalar: present non-empty strings pass through unchanged
pub fn optional_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Display string that must exist on the entity; missing reads as empty
pub fn display_text(value: Option<&Value>) -> String {
    optional_text(value).unwrap_or_default()
}

/// Linked record id list
///
/// Absent and empty are equivalent. A string is read as comma-separated ids.
pub fn id_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(raw)) => raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Raw topic record to a [`Topic`]
///
/// `forward_field` names the topic field holding viewpoint links when the
/// deployment uses forward links.
pub fn topic(record: &RawRecord, forward_field: Option<&str>) -> Topic {
    Topic {
        id: record.id.clone(),
        question: display_text(record.field(fields::QUESTION)),
        hashtags: hashtags(record.field(fields::HASHTAGS)),
        viewpoint_refs: forward_field
            .map(|field| id_list(record.field(field)))
            .unwrap_or_default(),
    }
}

/// Raw viewpoint record to a [`Viewpoint`]
pub fn viewpoint(record: &RawRecord) -> Viewpoint {
    Viewpoint {
        id: record.id.clone(),
        text: display_text(record.field(fields::TEXT)),
        url: optional_text(record.field(fields::URL)),
        author: optional_text(record.field(fields::AUTHOR)),
        stance: stance(record.field(fields::STANCE)),
    }
}
