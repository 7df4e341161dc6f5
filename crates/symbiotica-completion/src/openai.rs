//! OpenAI-compatible `chat/completions` client

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Completion, CompletionClient, CompletionError, CompletionResult, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct OpenAICompletionClient {
    client: Client,
    config: CompletionConfig,
}

impl OpenAICompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let api_key = config.api_key.as_ref().ok_or_else(|| {
            CompletionError::Configuration("API key required for completion client".into())
        })?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", api_key.expose_secret())
                .parse()
                .map_err(|_| CompletionError::Configuration("Invalid API key format".into()))?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAICompletionClient {
    #[tracing::instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(&self, system: &str, user: &str) -> CompletionResult<Completion> {
        let request = self.build_request(system, user);
        debug!(
            model = %self.config.model,
            temperature = self.config.temperature,
            prompt_chars = user.len(),
            "completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "completion API call failed");
            return Err(CompletionError::Api { status, body });
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(CompletionError::transport)?;

        let model = api_response.model;
        let usage = api_response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });
        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        Ok(Completion { text, model, usage })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = OpenAICompletionClient::new(CompletionConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, CompletionError::Configuration(_)));
    }

    #[test]
    fn test_request_shape() {
        let client = OpenAICompletionClient::new(CompletionConfig {
            api_key: Some(SecretString::from("sk-test")),
            temperature: 0.2,
            ..CompletionConfig::default()
        })
        .unwrap();

        let value = serde_json::to_value(client.build_request("sys", "hi")).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert!((value["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");
    }
}
