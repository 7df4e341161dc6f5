pub mod loader;
pub mod schema;

pub use loader::{apply_env_overrides, load_config, load_config_from_file, CONFIG_PATH_ENV};
pub use schema::{
    ArticleSettings, BridgeConfig, Collection, CompletionSettings, DatabaseIds, LoggingSettings,
    NotionSettings, ServerSettings,
};
