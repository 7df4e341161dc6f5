//! Document API wire types.
//!
//! Only the fields the bridge reads are modelled; everything else is kept as
//! raw JSON so responses survive API additions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::property::{text_runs, DatabaseSchema, PropertyKind, PropertyMap};

/// Results requested per call. Only one page of results is ever fetched.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A rich text run as returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
}

pub fn plain_text(runs: &[RichText]) -> String {
    runs.iter().map(|r| r.plain_text.as_str()).collect()
}

/// Concatenate `plain_text` from a raw JSON array of rich text runs.
fn plain_text_value(runs: &Value) -> String {
    runs.as_array()
        .map(|runs| {
            runs.iter()
                .filter_map(|r| r.get("plain_text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDeclaration>,
}

impl Database {
    pub fn title_text(&self) -> String {
        plain_text(&self.title)
    }

    pub fn schema(&self) -> DatabaseSchema {
        self.properties
            .iter()
            .map(|(name, decl)| (name.clone(), decl.kind))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    /// Plain text of the page's title property (empty when untitled).
    pub fn title(&self) -> String {
        self.properties
            .values()
            .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))
            .and_then(|p| p.get("title"))
            .map(plain_text_value)
            .unwrap_or_default()
    }

    /// Flatten property values into plain JSON for callers that do not speak
    /// the API's property format.
    pub fn simplified_properties(&self) -> Map<String, Value> {
        self.properties
            .iter()
            .map(|(name, value)| (name.clone(), simplify_property(value)))
            .collect()
    }
}

fn simplify_property(value: &Value) -> Value {
    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return Value::Null;
    };
    let inner = value.get(kind).unwrap_or(&Value::Null);

    match kind {
        "title" | "rich_text" => Value::String(plain_text_value(inner)),
        "select" | "status" => inner.get("name").cloned().unwrap_or(Value::Null),
        "multi_select" => Value::Array(
            inner
                .as_array()
                .map(|opts| opts.iter().filter_map(|o| o.get("name").cloned()).collect())
                .unwrap_or_default(),
        ),
        "relation" => Value::Array(
            inner
                .as_array()
                .map(|refs| refs.iter().filter_map(|r| r.get("id").cloned()).collect())
                .unwrap_or_default(),
        ),
        "date" => inner.get("start").cloned().unwrap_or(Value::Null),
        _ => inner.clone(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Block {
    /// Text carried by the block's `rich_text`, if its type has any.
    pub fn plain_text(&self) -> String {
        self.data
            .get(&self.kind)
            .and_then(|inner| inner.get("rich_text"))
            .map(plain_text_value)
            .unwrap_or_default()
    }

    /// Render as a line of plain text, keeping list and heading markers.
    pub fn render_line(&self) -> Option<String> {
        let text = self.plain_text();
        let line = match self.kind.as_str() {
            "heading_1" => format!("# {text}"),
            "heading_2" => format!("## {text}"),
            "heading_3" => format!("### {text}"),
            "bulleted_list_item" => format!("- {text}"),
            "numbered_list_item" => format!("1. {text}"),
            "quote" => format!("> {text}"),
            "to_do" => {
                let checked = self
                    .data
                    .get("to_do")
                    .and_then(|t| t.get("checked"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                format!("[{}] {text}", if checked { "x" } else { " " })
            }
            "code" => format!("```\n{text}\n```"),
            "divider" => "---".to_string(),
            _ => text,
        };
        if line.trim().is_empty() {
            None
        } else {
            Some(line)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parent {
    DatabaseId(String),
    PageId(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePage {
    pub parent: Parent,
    pub properties: PropertyMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Value>,
}

impl CreatePage {
    pub fn new(parent: Parent, properties: PropertyMap) -> Self {
        Self {
            parent,
            properties,
            children: Vec::new(),
        }
    }

    pub fn in_database(database_id: impl Into<String>, properties: PropertyMap) -> Self {
        Self::new(Parent::DatabaseId(database_id.into()), properties)
    }

    pub fn with_children(mut self, children: Vec<Value>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDatabase {
    pub parent: Parent,
    pub title: Vec<Value>,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl DatabaseQuery {
    /// Exact match on the `Name` title column.
    pub fn title_equals(property: &str, name: &str) -> Self {
        Self {
            filter: Some(json!({ "property": property, "title": { "equals": name } })),
            sorts: None,
            page_size: Some(1),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl SearchRequest {
    /// Pages only, optionally matching `query`, most recently edited first.
    pub fn pages(query: Option<String>) -> Self {
        Self {
            query: query.filter(|q| !q.trim().is_empty()),
            filter: Some(json!({ "property": "object", "value": "page" })),
            sort: Some(json!({ "direction": "descending", "timestamp": "last_edited_time" })),
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }
}

// ============================================================================
// Block builders
// ============================================================================

pub fn paragraph_block(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": text_runs(text) }
    })
}

/// One paragraph per non-empty line of `content`.
pub fn paragraphs(content: &str) -> Vec<Value> {
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(paragraph_block)
        .collect()
}

/// Body for replacing a paragraph block's text.
pub fn paragraph_update(text: &str) -> Value {
    json!({ "paragraph": { "rich_text": text_runs(text) } })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_json() -> Value {
        json!({
            "object": "page",
            "id": "page-1",
            "url": "https://www.notion.so/page-1",
            "last_edited_time": "2024-05-01T10:00:00.000Z",
            "properties": {
                "Name": {
                    "id": "title",
                    "type": "title",
                    "title": [
                        {"type": "text", "plain_text": "Hello "},
                        {"type": "text", "plain_text": "World"}
                    ]
                },
                "Tags": {
                    "id": "t",
                    "type": "multi_select",
                    "multi_select": [{"name": "a"}, {"name": "b"}]
                },
                "Status": {"id": "s", "type": "select", "select": {"name": "Open"}},
                "Done": {"id": "d", "type": "checkbox", "checkbox": true}
            }
        })
    }

    #[test]
    fn test_page_title_concatenates_runs() {
        let page: Page = serde_json::from_value(page_json()).unwrap();
        assert_eq!(page.title(), "Hello World");
        assert!(page.last_edited_time.is_some());
    }

    #[test]
    fn test_simplified_properties() {
        let page: Page = serde_json::from_value(page_json()).unwrap();
        let simple = page.simplified_properties();
        assert_eq!(simple["Name"], json!("Hello World"));
        assert_eq!(simple["Tags"], json!(["a", "b"]));
        assert_eq!(simple["Status"], json!("Open"));
        assert_eq!(simple["Done"], json!(true));
    }

    #[test]
    fn test_database_schema_from_response() {
        let db: Database = serde_json::from_value(json!({
            "object": "database",
            "id": "db-1",
            "title": [{"plain_text": "Articles"}],
            "properties": {
                "Name": {"id": "title", "type": "title", "title": {}},
                "Authors": {"id": "a", "type": "relation", "relation": {}},
                "Score": {"id": "n", "type": "number", "number": {}}
            }
        }))
        .unwrap();

        let schema = db.schema();
        assert_eq!(db.title_text(), "Articles");
        assert_eq!(schema.kind_of("Authors"), Some(PropertyKind::Relation));
        assert_eq!(schema.kind_of("Score"), Some(PropertyKind::Unsupported));
        assert_eq!(schema.title_property(), Some("Name"));
    }

    #[test]
    fn test_block_render_line() {
        let block: Block = serde_json::from_value(json!({
            "object": "block",
            "id": "b1",
            "type": "bulleted_list_item",
            "has_children": false,
            "bulleted_list_item": {"rich_text": [{"plain_text": "item"}]}
        }))
        .unwrap();
        assert_eq!(block.plain_text(), "item");
        assert_eq!(block.render_line().as_deref(), Some("- item"));

        let empty: Block = serde_json::from_value(json!({
            "id": "b2",
            "type": "paragraph",
            "paragraph": {"rich_text": []}
        }))
        .unwrap();
        assert_eq!(empty.render_line(), None);
    }

    #[test]
    fn test_paragraphs_skip_blank_lines() {
        let blocks = paragraphs("first\n\n  \nsecond");
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1]["paragraph"]["rich_text"][0]["text"]["content"],
            json!("second")
        );
    }

    #[test]
    fn test_parent_serialization() {
        assert_eq!(
            serde_json::to_value(Parent::DatabaseId("db".into())).unwrap(),
            json!({"database_id": "db"})
        );
        assert_eq!(
            serde_json::to_value(Parent::PageId("p".into())).unwrap(),
            json!({"page_id": "p"})
        );
    }

    #[test]
    fn test_search_request_drops_blank_query() {
        let req = SearchRequest::pages(Some("  ".into()));
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("query").is_none());
        assert_eq!(value["filter"]["value"], json!("page"));
    }
}
