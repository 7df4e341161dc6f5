//! Database creation, entries and queries.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use symbiotica_core::{encode_entry, NAME_PROPERTY};
use symbiotica_notion::types::DEFAULT_PAGE_SIZE;
use symbiotica_notion::{text_runs, CreateDatabase, CreatePage, DatabaseQuery, Parent, PropertyKind};
use tracing::{info, warn};

use crate::error::{required, BridgeError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseRequest {
    title: Option<String>,
    parent_id: Option<String>,
    /// Column name to kind name, e.g. `{"Tags": "multi_select"}`.
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

/// Column definitions for a new database. `Name` is always the title column.
fn column_definitions(requested: &BTreeMap<String, String>) -> Map<String, Value> {
    let mut columns = Map::new();
    columns.insert(NAME_PROPERTY.to_string(), json!({ "title": {} }));

    for (name, kind_name) in requested {
        if name == NAME_PROPERTY {
            continue;
        }
        let definition = PropertyKind::parse(kind_name)
            .filter(|kind| *kind != PropertyKind::Title)
            .and_then(|kind| kind.column_definition());
        match definition {
            Some(definition) => {
                columns.insert(name.clone(), definition);
            }
            None => warn!(column = %name, kind = %kind_name, "skipping column of unsupported kind"),
        }
    }
    columns
}

#[tracing::instrument(skip_all)]
pub async fn create_database(
    State(state): State<AppState>,
    Json(request): Json<CreateDatabaseRequest>,
) -> Result<Json<Value>, BridgeError> {
    let title = required(request.title, "title")?;
    let parent = state.parent_page(request.parent_id)?;

    let database = state
        .documents
        .create_database(&CreateDatabase {
            parent: Parent::PageId(parent),
            title: text_runs(&title),
            properties: column_definitions(&request.properties),
        })
        .await
        .map_err(BridgeError::within("Failed to create database"))?;
    info!(database_id = %database.id, "database created");

    Ok(Json(json!({
        "success": true,
        "databaseId": database.id,
        "url": database.url,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDatabaseEntryRequest {
    database_id: Option<String>,
    properties: Option<Map<String, Value>>,
}

#[tracing::instrument(skip_all)]
pub async fn add_database_entry(
    State(state): State<AppState>,
    Json(request): Json<AddDatabaseEntryRequest>,
) -> Result<Json<Value>, BridgeError> {
    const CONTEXT: &str = "Failed to add database entry";
    let database_id = required(request.database_id, "databaseId")?;
    let entry = request
        .properties
        .ok_or(BridgeError::MissingField("properties"))?;

    let database = state
        .documents
        .retrieve_database(&database_id)
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    let encoded = encode_entry(&database.schema(), &entry);
    if !encoded.dropped.is_empty() {
        warn!(dropped = ?encoded.dropped, "entry fields not written");
    }

    let page = state
        .documents
        .create_page(&CreatePage::in_database(&database_id, encoded.properties))
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    info!(%database_id, page_id = %page.id, "database entry added");

    Ok(Json(json!({ "success": true, "pageId": page.id })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDatabaseRequest {
    database_id: Option<String>,
    filter: Option<Value>,
    sorts: Option<Value>,
}

#[tracing::instrument(skip_all)]
pub async fn query_database(
    State(state): State<AppState>,
    Json(request): Json<QueryDatabaseRequest>,
) -> Result<Json<Value>, BridgeError> {
    let database_id = required(request.database_id, "databaseId")?;
    let query = DatabaseQuery {
        filter: request.filter.filter(|f| !f.is_null()),
        sorts: request.sorts.filter(|s| !s.is_null()),
        page_size: Some(DEFAULT_PAGE_SIZE),
    };

    let found = state
        .documents
        .query_database(&database_id, &query)
        .await
        .map_err(BridgeError::within("Failed to query database"))?;

    let results: Vec<Value> = found
        .results
        .iter()
        .map(|page| {
            json!({
                "id": page.id,
                "url": page.url,
                "title": page.title(),
                "properties": page.simplified_properties(),
            })
        })
        .collect();
    Ok(Json(json!({ "success": true, "results": results })))
}
