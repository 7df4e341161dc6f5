//! Schema-mapped submissions into the linked collections.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use symbiotica_config::Collection;
use symbiotica_core::{
    plan, ArticleSubmission, FieldRule, HelpLogEntry, IdeaSubmission, RecordInput, ARTICLE_RULES,
    HELP_LOG_RULES, IDEA_RULES,
};
use symbiotica_notion::CreatePage;
use tracing::{debug, info};

use crate::error::{required, BridgeError};
use crate::state::AppState;

/// Discover the collection's schema, map `input` onto it and create the page.
async fn submit_record(
    state: &AppState,
    collection: Collection,
    rules: &[FieldRule],
    input: &RecordInput,
    context: &'static str,
) -> Result<String, BridgeError> {
    let database_id = state.database_id(collection, context)?;
    let database = state
        .documents
        .retrieve_database(database_id)
        .await
        .map_err(BridgeError::within(context))?;

    let mapping = plan(rules, &database.schema(), input);
    debug!(
        %collection,
        ready = mapping.ready.len(),
        pending = mapping.pending.len(),
        "planned properties"
    );
    let properties = mapping
        .resolve(&state.resolver())
        .await
        .map_err(BridgeError::within(context))?;

    let page = state
        .documents
        .create_page(&CreatePage::in_database(database_id, properties))
        .await
        .map_err(BridgeError::within(context))?;
    info!(%collection, page_id = %page.id, "record created");
    Ok(page.id)
}

#[tracing::instrument(skip_all)]
pub async fn submit_article(
    State(state): State<AppState>,
    Json(submission): Json<ArticleSubmission>,
) -> Result<Json<Value>, BridgeError> {
    let page_id = submit_record(
        &state,
        Collection::Articles,
        ARTICLE_RULES,
        &submission.to_input(),
        "Failed to submit article",
    )
    .await?;
    Ok(Json(json!({ "status": "success", "pageId": page_id })))
}

#[tracing::instrument(skip_all)]
pub async fn submit_idea(
    State(state): State<AppState>,
    Json(mut idea): Json<IdeaSubmission>,
) -> Result<Json<Value>, BridgeError> {
    idea.title = Some(required(idea.title.take(), "title")?);
    let page_id = submit_record(
        &state,
        Collection::Ideas,
        IDEA_RULES,
        &idea.to_input(),
        "Failed to submit idea",
    )
    .await?;
    Ok(Json(json!({ "success": true, "pageId": page_id })))
}

#[tracing::instrument(skip_all)]
pub async fn log_help_entry(
    State(state): State<AppState>,
    Json(mut entry): Json<HelpLogEntry>,
) -> Result<Json<Value>, BridgeError> {
    entry.question = Some(required(entry.question.take(), "question")?);
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let page_id = submit_record(
        &state,
        Collection::HelpLog,
        HELP_LOG_RULES,
        &entry.to_input(&today),
        "Failed to log help entry",
    )
    .await?;
    Ok(Json(json!({ "success": true, "pageId": page_id })))
}
