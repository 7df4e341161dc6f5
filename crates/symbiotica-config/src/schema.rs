use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main bridge configuration
///
/// Loaded in layers (later wins):
/// 1. built-in defaults
/// 2. `symbiotica.yml` / `symbiotica.yaml` (or the file named by `SYMBIOTICA_CONFIG`)
/// 3. environment variables
///
/// Credentials are never read from the file; they only come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub notion: NotionSettings,

    #[serde(default)]
    pub completion: CompletionSettings,

    /// Database ids of the linked collections
    #[serde(default)]
    pub databases: DatabaseIds,

    /// Default parent page for `/create-page` and `/create-database`
    #[serde(default)]
    pub parent_page_id: Option<String>,

    /// Timeout applied to every outbound call (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub article: ArticleSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            notion: NotionSettings::default(),
            completion: CompletionSettings::default(),
            databases: DatabaseIds::default(),
            parent_page_id: None,
            request_timeout_secs: default_request_timeout(),
            article: ArticleSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl BridgeConfig {
    pub fn database_id(&self, collection: Collection) -> Option<&str> {
        self.databases.get(collection)
    }
}

// ============================================================================
// Server
// ============================================================================

/// ```yaml
/// server:
///   host: 0.0.0.0
///   port: 3000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

// ============================================================================
// Document API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionSettings {
    /// Integration token, from `NOTION_TOKEN` only
    #[serde(skip)]
    pub token: Option<SecretString>,

    #[serde(default = "default_notion_base_url")]
    pub base_url: String,

    /// Value sent in the `Notion-Version` header
    #[serde(default = "default_notion_version")]
    pub version: String,
}

impl Default for NotionSettings {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_notion_base_url(),
            version: default_notion_version(),
        }
    }
}

fn default_notion_base_url() -> String {
    "https://api.notion.com".to_string()
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

// ============================================================================
// Completion API
// ============================================================================

/// ```yaml
/// completion:
///   model: gpt-4o-mini
///   temperature: 0.3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// API key, from `OPENAI_API_KEY` only
    #[serde(skip)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    #[serde(default = "default_completion_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_completion_base_url(),
            model: default_completion_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_completion_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_completion_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

// ============================================================================
// Linked collections
// ============================================================================

/// A database the bridge writes into or resolves entities against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Articles,
    People,
    Organizations,
    Events,
    HelpLog,
    Ideas,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Articles,
        Collection::People,
        Collection::Organizations,
        Collection::Events,
        Collection::HelpLog,
        Collection::Ideas,
    ];

    /// Environment variable holding this collection's database id.
    pub fn env_var(self) -> &'static str {
        match self {
            Collection::Articles => "ARTICLES_DB_ID",
            Collection::People => "PEOPLE_DB_ID",
            Collection::Organizations => "ORGANIZATIONS_DB_ID",
            Collection::Events => "EVENTS_DB_ID",
            Collection::HelpLog => "HELP_LOG_DB_ID",
            Collection::Ideas => "IDEAS_DB_ID",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Articles => "articles",
            Collection::People => "people",
            Collection::Organizations => "organizations",
            Collection::Events => "events",
            Collection::HelpLog => "help_log",
            Collection::Ideas => "ideas",
        };
        f.write_str(name)
    }
}

/// ```yaml
/// databases:
///   articles: 1b2c...
///   people: ${PEOPLE_DB_ID}
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseIds {
    #[serde(default)]
    pub articles: Option<String>,
    #[serde(default)]
    pub people: Option<String>,
    #[serde(default)]
    pub organizations: Option<String>,
    #[serde(default)]
    pub events: Option<String>,
    #[serde(default)]
    pub help_log: Option<String>,
    #[serde(default)]
    pub ideas: Option<String>,
}

impl DatabaseIds {
    pub fn get(&self, collection: Collection) -> Option<&str> {
        let id = match collection {
            Collection::Articles => &self.articles,
            Collection::People => &self.people,
            Collection::Organizations => &self.organizations,
            Collection::Events => &self.events,
            Collection::HelpLog => &self.help_log,
            Collection::Ideas => &self.ideas,
        };
        id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn set(&mut self, collection: Collection, id: String) {
        let slot = match collection {
            Collection::Articles => &mut self.articles,
            Collection::People => &mut self.people,
            Collection::Organizations => &mut self.organizations,
            Collection::Events => &mut self.events,
            Collection::HelpLog => &mut self.help_log,
            Collection::Ideas => &mut self.ideas,
        };
        *slot = Some(id);
    }
}

// ============================================================================
// Article extraction
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSettings {
    /// Characters of extracted text forwarded to the completion API (default: 8000)
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Bytes of response body read from the article server (default: 2 MiB)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Permit fetching loopback, private and link-local addresses
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for ArticleSettings {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            max_bytes: default_max_bytes(),
            allow_private_hosts: false,
        }
    }
}

fn default_max_chars() -> usize {
    8000
}

fn default_max_bytes() -> usize {
    2 * 1024 * 1024
}

// ============================================================================
// Logging
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
