//! axum HTTP server.
//!
//! One route per assistant action; every handler is an independent
//! translator over the shared [`AppState`].

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{self, assist, databases, pages, records};
use crate::state::AppState;

/// `(method, path, description)` for every route, served by `/help`.
pub const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("POST", "/submit-article", "Create an article record with linked entities"),
    ("POST", "/get-page", "Find a page by title and return its text content"),
    ("POST", "/create-page", "Create a page or database entry"),
    ("POST", "/write-to-page", "Append one paragraph per line to a page"),
    ("POST", "/update-block", "Replace a paragraph block's text"),
    ("POST", "/summarize-page", "Summarize a page's content"),
    ("POST", "/create-database", "Create a database with the given columns"),
    ("POST", "/add-database-entry", "Add a schema-aware database entry"),
    ("POST", "/query-database", "Query a database"),
    ("POST", "/submit-idea", "Record an idea"),
    ("POST", "/log-help-entry", "Record a question and its answer"),
    ("GET", "/list-pages", "List recently edited pages"),
    ("GET|POST", "/search-pages", "Search pages by text"),
    ("GET|POST", "/weekly-summary", "Pages edited in the last 7 days"),
    ("POST", "/parse-article", "Extract article metadata from a URL"),
    ("GET", "/help", "This endpoint list"),
    ("GET", "/health", "Liveness check"),
];

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/submit-article", post(records::submit_article))
        .route("/submit-idea", post(records::submit_idea))
        .route("/log-help-entry", post(records::log_help_entry))
        .route("/get-page", post(pages::get_page))
        .route("/create-page", post(pages::create_page))
        .route("/write-to-page", post(pages::write_to_page))
        .route("/update-block", post(pages::update_block))
        .route("/list-pages", get(pages::list_pages))
        .route(
            "/search-pages",
            get(pages::search_pages_get).post(pages::search_pages_post),
        )
        .route("/create-database", post(databases::create_database))
        .route("/add-database-entry", post(databases::add_database_entry))
        .route("/query-database", post(databases::query_database))
        .route("/summarize-page", post(assist::summarize_page))
        .route(
            "/weekly-summary",
            get(assist::weekly_summary_get).post(assist::weekly_summary_post),
        )
        .route("/parse-article", post(assist::parse_article))
        .route("/help", get(handlers::help))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "symbiotica-bridge listening");

    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}
