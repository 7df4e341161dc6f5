//! Endpoints that call the completion API.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use symbiotica_completion::prompts;
use symbiotica_core::{fetch_article, render_blocks};
use symbiotica_notion::{Page, SearchRequest};
use tracing::{debug, info};

use super::PageSummary;
use crate::error::{required, BridgeError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizePageRequest {
    page_id: Option<String>,
}

#[tracing::instrument(skip_all)]
pub async fn summarize_page(
    State(state): State<AppState>,
    Json(request): Json<SummarizePageRequest>,
) -> Result<Json<Value>, BridgeError> {
    const CONTEXT: &str = "Failed to summarize page";
    let page_id = required(request.page_id, "pageId")?;
    let completion = state.completion(CONTEXT)?;

    let page = state
        .documents
        .retrieve_page(&page_id)
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    let blocks = state
        .documents
        .block_children(&page_id)
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    let content = render_blocks(&blocks.results);

    let summary = completion
        .complete(
            prompts::PAGE_SUMMARY_SYSTEM,
            &prompts::page_summary(&page.title(), &content),
        )
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    info!(%page_id, model = %summary.model, "page summarized");

    Ok(Json(json!({ "success": true, "summary": summary.text })))
}

#[derive(Debug, Default, Deserialize)]
pub struct WeeklySummaryRequest {
    #[serde(default)]
    summarize: bool,
}

/// Pages edited at or after `since`. Input is newest first.
fn edited_since(pages: &[Page], since: DateTime<Utc>) -> Vec<&Page> {
    pages
        .iter()
        .filter(|page| page.last_edited_time.is_some_and(|edited| edited >= since))
        .collect()
}

async fn weekly_summary(state: &AppState, summarize: bool) -> Result<Json<Value>, BridgeError> {
    const CONTEXT: &str = "Failed to build weekly summary";
    let since = Utc::now() - Duration::days(7);

    let found = state
        .documents
        .search(&SearchRequest::pages(None))
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    let recent = edited_since(&found.results, since);
    debug!(pages = recent.len(), "pages edited this week");
    let pages: Vec<PageSummary> = recent.iter().map(|page| PageSummary::from(*page)).collect();

    let mut body = json!({ "since": since.to_rfc3339(), "pages": pages });
    if summarize {
        let completion = state.completion(CONTEXT)?;
        let lines: Vec<String> = pages
            .iter()
            .map(|page| match &page.last_edited {
                Some(edited) => format!("{} ({edited})", page.title),
                None => page.title.clone(),
            })
            .collect();
        let summary = completion
            .complete(
                prompts::WEEKLY_SUMMARY_SYSTEM,
                &prompts::weekly_summary(&since.date_naive().to_string(), &lines),
            )
            .await
            .map_err(BridgeError::within(CONTEXT))?;
        body["summary"] = Value::String(summary.text);
    }
    Ok(Json(body))
}

#[tracing::instrument(skip_all)]
pub async fn weekly_summary_get(
    State(state): State<AppState>,
    Query(request): Query<WeeklySummaryRequest>,
) -> Result<Json<Value>, BridgeError> {
    weekly_summary(&state, request.summarize).await
}

#[tracing::instrument(skip_all)]
pub async fn weekly_summary_post(
    State(state): State<AppState>,
    Json(request): Json<WeeklySummaryRequest>,
) -> Result<Json<Value>, BridgeError> {
    weekly_summary(&state, request.summarize).await
}

#[derive(Debug, Deserialize)]
pub struct ParseArticleRequest {
    url: Option<String>,
}

#[tracing::instrument(skip_all)]
pub async fn parse_article(
    State(state): State<AppState>,
    Json(request): Json<ParseArticleRequest>,
) -> Result<Json<Value>, BridgeError> {
    const CONTEXT: &str = "Failed to parse article";
    let url = required(request.url, "url")?;
    let completion = state.completion(CONTEXT)?;

    let parsed = fetch_article(&state.http, &url, &state.config.article)
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    let structured = completion
        .complete(
            prompts::ARTICLE_EXTRACTION_SYSTEM,
            &prompts::article_extraction(&parsed.url, parsed.title.as_deref(), &parsed.text),
        )
        .await
        .map_err(BridgeError::within(CONTEXT))?;
    info!(%url, truncated = parsed.truncated, "article parsed");

    Ok(Json(json!({ "parsed": parsed, "structured": structured.text })))
}
