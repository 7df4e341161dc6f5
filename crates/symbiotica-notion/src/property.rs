//! Database property kinds and their wire encodings.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum characters the document API accepts in a single text run.
pub const MAX_TEXT_RUN_CHARS: usize = 2000;

/// Declared type of a database column.
///
/// Kinds the bridge does not write (number, people, formula, ...) all
/// deserialize to [`PropertyKind::Unsupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Title,
    RichText,
    Url,
    Select,
    MultiSelect,
    Relation,
    Checkbox,
    Date,
    #[serde(other)]
    Unsupported,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Url => "url",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Relation => "relation",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Unsupported => "unsupported",
        }
    }

    /// Parse a caller-supplied kind name. Accepts a few common aliases.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "title" => Some(Self::Title),
            "rich_text" | "text" => Some(Self::RichText),
            "url" => Some(Self::Url),
            "select" => Some(Self::Select),
            "multi_select" | "tags" => Some(Self::MultiSelect),
            "relation" => Some(Self::Relation),
            "checkbox" | "boolean" => Some(Self::Checkbox),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    /// Column definition used when creating a database.
    ///
    /// Relations need a target database and cannot be declared this way.
    pub fn column_definition(&self) -> Option<Value> {
        match self {
            Self::Relation | Self::Unsupported => None,
            kind => {
                let mut definition = serde_json::Map::new();
                definition.insert(kind.as_str().to_string(), json!({}));
                Some(Value::Object(definition))
            }
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property name to declared kind, as discovered from a database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseSchema {
    kinds: BTreeMap<String, PropertyKind>,
}

impl DatabaseSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, kind: PropertyKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    pub fn kind_of(&self, name: &str) -> Option<PropertyKind> {
        self.kinds.get(name).copied()
    }

    /// Exact name match first, then a case-insensitive one.
    pub fn lookup(&self, name: &str) -> Option<(&str, PropertyKind)> {
        if let Some((declared, kind)) = self.kinds.get_key_value(name) {
            return Some((declared.as_str(), *kind));
        }
        self.kinds
            .iter()
            .find(|(declared, _)| declared.eq_ignore_ascii_case(name))
            .map(|(declared, kind)| (declared.as_str(), *kind))
    }

    /// Name of the title column, if any.
    pub fn title_property(&self) -> Option<&str> {
        self.kinds
            .iter()
            .find(|(_, kind)| **kind == PropertyKind::Title)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PropertyKind)> {
        self.kinds.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl FromIterator<(String, PropertyKind)> for DatabaseSchema {
    fn from_iter<I: IntoIterator<Item = (String, PropertyKind)>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

/// A value already shaped for one property kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Url(String),
    Select(String),
    MultiSelect(Vec<String>),
    /// Page ids in the related database.
    Relation(Vec<String>),
    Checkbox(bool),
    Date { start: String, end: Option<String> },
}

impl PropertyValue {
    pub fn date(start: impl Into<String>) -> Self {
        Self::Date {
            start: start.into(),
            end: None,
        }
    }

    /// Encode into the document API's property value object.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Title(text) => json!({ "title": text_runs(text) }),
            Self::RichText(text) => json!({ "rich_text": text_runs(text) }),
            Self::Url(url) => json!({ "url": url }),
            Self::Select(name) => json!({ "select": { "name": name } }),
            Self::MultiSelect(names) => json!({
                "multi_select": names.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>()
            }),
            Self::Relation(ids) => json!({
                "relation": ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>()
            }),
            Self::Checkbox(checked) => json!({ "checkbox": checked }),
            Self::Date { start, end: None } => json!({ "date": { "start": start } }),
            Self::Date {
                start,
                end: Some(end),
            } => json!({ "date": { "start": start, "end": end } }),
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

/// Properties keyed by column name, ready for a page create/update call.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Split `content` into text runs the document API accepts.
///
/// Empty content still yields one empty run.
pub fn text_runs(content: &str) -> Vec<Value> {
    if content.is_empty() {
        return vec![json!({ "text": { "content": "" } })];
    }

    let chars: Vec<char> = content.chars().collect();
    chars
        .chunks(MAX_TEXT_RUN_CHARS)
        .map(|chunk| {
            let piece: String = chunk.iter().collect();
            json!({ "text": { "content": piece } })
        })
        .collect()
}
