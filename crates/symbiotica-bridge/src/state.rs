use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use symbiotica_completion::{
    CompletionClient, CompletionConfig, CompletionError, OpenAICompletionClient,
};
use symbiotica_config::{BridgeConfig, Collection};
use symbiotica_core::{DocumentEntityResolver, MapError};
use symbiotica_notion::{DocumentApi, NotionClient};
use tracing::warn;

use crate::error::BridgeError;

/// Shared, immutable handles every handler works from.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<dyn DocumentApi>,
    pub completion: Option<Arc<dyn CompletionClient>>,
    pub config: Arc<BridgeConfig>,
    /// Plain client for fetching articles.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(
        documents: Arc<dyn DocumentApi>,
        completion: Option<Arc<dyn CompletionClient>>,
        config: BridgeConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("symbiotica-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build article fetch client")?;

        Ok(Self {
            documents,
            completion,
            config: Arc::new(config),
            http,
        })
    }

    /// Build the real API clients from configuration.
    pub fn from_config(config: BridgeConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let token = config
            .notion
            .token
            .as_ref()
            .context("NOTION_TOKEN must be set")?;
        let documents = NotionClient::new(
            token,
            config.notion.base_url.clone(),
            &config.notion.version,
            timeout,
        )
        .context("failed to build document API client")?;

        let completion: Option<Arc<dyn CompletionClient>> = match &config.completion.api_key {
            Some(api_key) => {
                let client = OpenAICompletionClient::new(CompletionConfig {
                    api_key: Some(api_key.clone()),
                    base_url: config.completion.base_url.clone(),
                    model: config.completion.model.clone(),
                    temperature: config.completion.temperature,
                    max_tokens: config.completion.max_tokens,
                    timeout,
                })
                .context("failed to build completion client")?;
                let client: Arc<dyn CompletionClient> = Arc::new(client);
                Some(client)
            }
            None => {
                warn!("OPENAI_API_KEY not set; completion endpoints will fail");
                None
            }
        };

        Self::new(Arc::new(documents), completion, config)
    }

    /// Database id for `collection`, or an error naming the missing setting.
    pub fn database_id(
        &self,
        collection: Collection,
        context: &'static str,
    ) -> Result<&str, BridgeError> {
        self.config.database_id(collection).ok_or_else(|| {
            BridgeError::upstream(context, MapError::CollectionNotConfigured(collection))
        })
    }

    pub fn completion(&self, context: &'static str) -> Result<&dyn CompletionClient, BridgeError> {
        self.completion.as_deref().ok_or_else(|| {
            BridgeError::upstream(
                context,
                CompletionError::Configuration("OPENAI_API_KEY is not set".into()),
            )
        })
    }

    /// Default parent page for new pages and databases.
    pub fn parent_page(&self, requested: Option<String>) -> Result<String, BridgeError> {
        requested
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .or_else(|| self.config.parent_page_id.clone().filter(|id| !id.is_empty()))
            .ok_or(BridgeError::MissingField("parentId"))
    }

    pub fn resolver(&self) -> DocumentEntityResolver {
        DocumentEntityResolver::new(self.documents.clone(), self.config.databases.clone())
    }
}
