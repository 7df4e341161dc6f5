//! Page lookup, creation and block editing.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use symbiotica_core::{encode_entry, render_blocks};
use symbiotica_notion::{
    paragraph_update, paragraphs, CreatePage, Page, Parent, PropertyMap, PropertyValue,
    SearchRequest,
};
use tracing::{debug, info};

use super::PageSummary;
use crate::error::{required, BridgeError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GetPageRequest {
    title: Option<String>,
}

/// First page whose title equals `title` ignoring case, else the first whose
/// title contains it.
fn best_match<'a>(pages: &'a [Page], title: &str) -> Option<&'a Page> {
    let wanted = title.to_lowercase();
    pages
        .iter()
        .find(|page| page.title().to_lowercase() == wanted)
        .or_else(|| {
            pages
                .iter()
                .find(|page| page.title().to_lowercase().contains(&wanted))
        })
}

#[tracing::instrument(skip_all)]
pub async fn get_page(
    State(state): State<AppState>,
    Json(request): Json<GetPageRequest>,
) -> Result<Json<Value>, BridgeError> {
    const CONTEXT: &str = "Failed to retrieve page";
    let title = required(request.title, "title")?;

    let found = state
        .documents
        .search(&SearchRequest::pages(Some(title.clone())))
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    let page = best_match(&found.results, &title)
        .ok_or_else(|| BridgeError::NotFound(format!("No page found with title '{title}'")))?;

    let blocks = state
        .documents
        .block_children(&page.id)
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    debug!(page_id = %page.id, blocks = blocks.results.len(), "loaded page content");

    Ok(Json(json!({
        "page_id": page.id,
        "title": page.title(),
        "content": render_blocks(&blocks.results),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    title: Option<String>,
    content: Option<String>,
    parent_id: Option<String>,
    /// Create the page as an entry of this database instead.
    database_id: Option<String>,
    properties: Option<Map<String, Value>>,
}

#[tracing::instrument(skip_all)]
pub async fn create_page(
    State(state): State<AppState>,
    Json(request): Json<CreatePageRequest>,
) -> Result<Json<Value>, BridgeError> {
    const CONTEXT: &str = "Failed to create page";
    let title = required(request.title, "title")?;
    let children = request.content.as_deref().map(paragraphs).unwrap_or_default();

    let (parent, properties) = match request.database_id.filter(|id| !id.trim().is_empty()) {
        Some(database_id) => {
            let database = state
                .documents
                .retrieve_database(&database_id)
                .await
                .map_err(BridgeError::within(CONTEXT))?;
            let schema = database.schema();
            let mut properties = request
                .properties
                .map(|entry| encode_entry(&schema, &entry).properties)
                .unwrap_or_default();
            if let Some(title_property) = schema.title_property() {
                properties.insert(title_property.to_string(), PropertyValue::Title(title));
            }
            (Parent::DatabaseId(database_id), properties)
        }
        None => {
            let mut properties = PropertyMap::new();
            properties.insert("title".to_string(), PropertyValue::Title(title));
            (Parent::PageId(state.parent_page(request.parent_id)?), properties)
        }
    };

    let page = state
        .documents
        .create_page(&CreatePage::new(parent, properties).with_children(children))
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    info!(page_id = %page.id, "page created");

    Ok(Json(json!({ "success": true, "pageId": page.id, "url": page.url })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteToPageRequest {
    page_id: Option<String>,
    content: Option<String>,
}

#[tracing::instrument(skip_all)]
pub async fn write_to_page(
    State(state): State<AppState>,
    Json(request): Json<WriteToPageRequest>,
) -> Result<Json<Value>, BridgeError> {
    let page_id = required(request.page_id, "pageId")?;
    let children = paragraphs(&required(request.content, "content")?);

    let appended = state
        .documents
        .append_block_children(&page_id, &children)
        .await
        .map_err(BridgeError::within("Failed to write to page"))?;
    let block_ids: Vec<String> = appended.results.into_iter().map(|block| block.id).collect();
    info!(%page_id, blocks = block_ids.len(), "appended to page");

    Ok(Json(json!({ "success": true, "blockIds": block_ids })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlockRequest {
    block_id: Option<String>,
    content: Option<String>,
}

#[tracing::instrument(skip_all)]
pub async fn update_block(
    State(state): State<AppState>,
    Json(request): Json<UpdateBlockRequest>,
) -> Result<Json<Value>, BridgeError> {
    let block_id = required(request.block_id, "blockId")?;
    let content = request.content.ok_or(BridgeError::MissingField("content"))?;

    let block = state
        .documents
        .update_block(&block_id, &paragraph_update(&content))
        .await
        .map_err(BridgeError::within("Failed to update block"))?;

    Ok(Json(json!({ "success": true, "blockId": block.id })))
}

#[tracing::instrument(skip_all)]
pub async fn list_pages(State(state): State<AppState>) -> Result<Json<Value>, BridgeError> {
    let found = state
        .documents
        .search(&SearchRequest::pages(None))
        .await
        .map_err(BridgeError::within("Failed to list pages"))?;
    let pages: Vec<PageSummary> = found.results.iter().map(PageSummary::from).collect();
    Ok(Json(json!({ "pages": pages })))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchPagesRequest {
    #[serde(default)]
    query: Option<String>,
}

async fn search(state: &AppState, query: Option<String>) -> Result<Json<Value>, BridgeError> {
    let found = state
        .documents
        .search(&SearchRequest::pages(query))
        .await
        .map_err(BridgeError::within("Failed to search pages"))?;
    let results: Vec<PageSummary> = found.results.iter().map(PageSummary::from).collect();
    Ok(Json(json!({ "results": results })))
}

#[tracing::instrument(skip_all)]
pub async fn search_pages_get(
    State(state): State<AppState>,
    Query(request): Query<SearchPagesRequest>,
) -> Result<Json<Value>, BridgeError> {
    search(&state, request.query).await
}

#[tracing::instrument(skip_all)]
pub async fn search_pages_post(
    State(state): State<AppState>,
    Json(request): Json<SearchPagesRequest>,
) -> Result<Json<Value>, BridgeError> {
    search(&state, request.query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(id: &str, title: &str) -> Page {
        serde_json::from_value(json!({
            "id": id,
            "properties": {
                "Name": {"type": "title", "title": [{"plain_text": title}]}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_best_match_prefers_exact_title() {
        let pages = vec![titled("1", "Roadmap 2024"), titled("2", "roadmap")];
        assert_eq!(best_match(&pages, "Roadmap").unwrap().id, "2");
    }

    #[test]
    fn test_best_match_falls_back_to_contains() {
        let pages = vec![titled("1", "Meeting notes"), titled("2", "Q3 Roadmap draft")];
        assert_eq!(best_match(&pages, "roadmap").unwrap().id, "2");
        assert!(best_match(&pages, "budget").is_none());
    }
}
