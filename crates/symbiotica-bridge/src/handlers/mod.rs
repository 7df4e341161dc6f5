pub mod assist;
pub mod databases;
pub mod pages;
pub mod records;

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use symbiotica_notion::Page;

use crate::server::ENDPOINTS;

/// Page listing entry shared by list, search and weekly summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub last_edited: Option<String>,
}

impl From<&Page> for PageSummary {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title(),
            url: page.url.clone(),
            last_edited: page.last_edited_time.map(|t| t.to_rfc3339()),
        }
    }
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn help() -> Json<Value> {
    let endpoints: Vec<Value> = ENDPOINTS
        .iter()
        .map(|(method, path, description)| {
            json!({ "method": method, "path": path, "description": description })
        })
        .collect();
    Json(json!({
        "service": "symbiotica-gpt-bridge",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}
