//! reqwest-backed document API client

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::{DocumentApi, NotionResult};
use crate::types::{
    Block, CreateDatabase, CreatePage, Database, DatabaseQuery, ListResponse, Page, SearchRequest,
    DEFAULT_PAGE_SIZE,
};
use crate::NotionError;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";
pub const DEFAULT_VERSION: &str = "2022-06-28";

pub struct NotionClient {
    client: Client,
    base_url: String,
}

impl NotionClient {
    pub fn new(
        token: &SecretString,
        base_url: impl Into<String>,
        version: &str,
        timeout: Duration,
    ) -> Result<Self, NotionError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", token.expose_secret())
                .parse()
                .map_err(|_| NotionError::Configuration("Invalid token format".into()))?,
        );
        headers.insert(
            "Notion-Version",
            version
                .parse()
                .map_err(|_| NotionError::Configuration("Invalid version header".into()))?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| NotionError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%method, %url, "document API request");
        self.client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> NotionResult<T> {
        let response = request.send().await.map_err(NotionError::transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = api_error(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "document API call failed");
            return Err(err);
        }

        let bytes = response.bytes().await.map_err(NotionError::transport)?;
        serde_json::from_slice(&bytes).map_err(|e| NotionError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

fn api_error(status: u16, body: &str) -> NotionError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => NotionError::Api {
            status,
            code: parsed.code,
            message: parsed.message,
        },
        _ => NotionError::Api {
            status,
            code: "unknown".to_string(),
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl DocumentApi for NotionClient {
    #[tracing::instrument(skip(self))]
    async fn retrieve_database(&self, database_id: &str) -> NotionResult<Database> {
        self.send(self.request(Method::GET, &format!("databases/{database_id}")))
            .await
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> NotionResult<ListResponse<Page>> {
        self.send(
            self.request(Method::POST, &format!("databases/{database_id}/query"))
                .json(query),
        )
        .await
    }

    async fn create_database(&self, request: &CreateDatabase) -> NotionResult<Database> {
        self.send(self.request(Method::POST, "databases").json(request))
            .await
    }

    async fn retrieve_page(&self, page_id: &str) -> NotionResult<Page> {
        self.send(self.request(Method::GET, &format!("pages/{page_id}")))
            .await
    }

    #[tracing::instrument(skip_all)]
    async fn create_page(&self, request: &CreatePage) -> NotionResult<Page> {
        self.send(self.request(Method::POST, "pages").json(request))
            .await
    }

    async fn search(&self, request: &SearchRequest) -> NotionResult<ListResponse<Page>> {
        self.send(self.request(Method::POST, "search").json(request))
            .await
    }

    async fn block_children(&self, block_id: &str) -> NotionResult<ListResponse<Block>> {
        self.send(
            self.request(Method::GET, &format!("blocks/{block_id}/children"))
                .query(&[("page_size", DEFAULT_PAGE_SIZE)]),
        )
        .await
    }

    async fn append_block_children(
        &self,
        block_id: &str,
        children: &[Value],
    ) -> NotionResult<ListResponse<Block>> {
        self.send(
            self.request(Method::PATCH, &format!("blocks/{block_id}/children"))
                .json(&json!({ "children": children })),
        )
        .await
    }

    async fn update_block(&self, block_id: &str, body: &Value) -> NotionResult<Block> {
        self.send(
            self.request(Method::PATCH, &format!("blocks/{block_id}"))
                .json(body),
        )
        .await
    }
}
