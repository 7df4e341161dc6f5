//! Loose value encoding for free-form database entries.
//!
//! Unlike the rule tables in [`crate::records`], entries here arrive as an
//! arbitrary `{name: value}` object and are shaped purely by the declared
//! column kinds.

use serde_json::{Map, Value};
use symbiotica_notion::{DatabaseSchema, PropertyKind, PropertyMap, PropertyValue};
use tracing::debug;

use crate::mapper::parse_flag;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedEntry {
    pub properties: PropertyMap,
    /// Input names that produced no property.
    pub dropped: Vec<String>,
}

/// Shape `value` for a column of kind `kind`, or nothing when it does not fit.
pub fn encode_loose(kind: PropertyKind, value: &Value) -> Option<PropertyValue> {
    match kind {
        PropertyKind::Title => scalar_text(value).map(PropertyValue::Title),
        PropertyKind::RichText => scalar_text(value).map(PropertyValue::RichText),
        PropertyKind::Url => scalar_text(value).map(PropertyValue::Url),
        PropertyKind::Select => scalar_text(value).map(PropertyValue::Select),
        PropertyKind::MultiSelect => {
            let items = match value {
                Value::String(s) => s.split(',').map(str::to_string).collect(),
                other => string_items(other),
            };
            non_empty(items).map(PropertyValue::MultiSelect)
        }
        PropertyKind::Relation => {
            let items = match value {
                Value::String(s) => vec![s.clone()],
                other => string_items(other),
            };
            non_empty(items).map(PropertyValue::Relation)
        }
        PropertyKind::Checkbox => match value {
            Value::Bool(b) => Some(PropertyValue::Checkbox(*b)),
            Value::String(s) => parse_flag(s).map(PropertyValue::Checkbox),
            _ => None,
        },
        PropertyKind::Date => match value {
            Value::String(s) if !s.trim().is_empty() => Some(PropertyValue::date(s.trim())),
            Value::Object(range) => {
                let start = range.get("start").and_then(Value::as_str)?.trim();
                if start.is_empty() {
                    return None;
                }
                let end = range
                    .get("end")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string);
                Some(PropertyValue::Date {
                    start: start.to_string(),
                    end,
                })
            }
            _ => None,
        },
        PropertyKind::Unsupported => None,
    }
}

/// Encode every entry whose name is declared in `schema`.
pub fn encode_entry(schema: &DatabaseSchema, entry: &Map<String, Value>) -> EncodedEntry {
    let mut encoded = EncodedEntry::default();

    for (name, value) in entry {
        let encoded_value = schema
            .lookup(name)
            .and_then(|(declared, kind)| encode_loose(kind, value).map(|v| (declared, v)));
        match encoded_value {
            Some((declared, value)) => {
                encoded.properties.insert(declared.to_string(), value);
            }
            None => {
                debug!(property = %name, "entry value not encodable, dropping");
                encoded.dropped.push(name.clone());
            }
        }
    }

    encoded
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string_items(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    let mut cleaned: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !cleaned.iter().any(|c| c == item) {
            cleaned.push(item.to_string());
        }
    }
    (!cleaned.is_empty()).then_some(cleaned)
}
