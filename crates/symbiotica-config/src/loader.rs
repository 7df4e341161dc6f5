use crate::schema::{BridgeConfig, Collection};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SYMBIOTICA_CONFIG";

const CONFIG_CANDIDATES: &[&str] = &[
    "symbiotica.yml",
    "symbiotica.yaml",
    ".symbiotica.yml",
    ".symbiotica.yaml",
];

/// Load configuration from the discovered file (if any) and the process environment.
pub fn load_config() -> Result<BridgeConfig> {
    let explicit = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let path = explicit.or_else(find_config_file);

    let base = match path {
        Some(path) => load_config_from_file(&path)?,
        None => BridgeConfig::default(),
    };

    apply_env_overrides(base, |key| env::var(key).ok())
}

pub fn load_config_from_file(path: &Path) -> Result<BridgeConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config_content(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(expand_env_vars(config))
}

fn parse_config_content(content: &str) -> Result<BridgeConfig> {
    if content.trim().is_empty() {
        return Ok(BridgeConfig::default());
    }
    serde_yaml_ng::from_str(content).context("Failed to parse YAML")
}

fn find_config_file() -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so callers can supply a fixed map.
pub fn apply_env_overrides<F>(mut config: BridgeConfig, lookup: F) -> Result<BridgeConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("PORT is not a valid port number: {port}"))?;
    }

    if let Some(token) = get("NOTION_TOKEN") {
        config.notion.token = Some(SecretString::from(token));
    }
    if let Some(url) = get("NOTION_BASE_URL") {
        config.notion.base_url = url;
    }
    if let Some(version) = get("NOTION_VERSION") {
        config.notion.version = version;
    }

    if let Some(key) = get("OPENAI_API_KEY") {
        config.completion.api_key = Some(SecretString::from(key));
    }
    if let Some(url) = get("OPENAI_BASE_URL") {
        config.completion.base_url = url;
    }
    if let Some(model) = get("OPENAI_MODEL") {
        config.completion.model = model;
    }
    if let Some(temperature) = get("OPENAI_TEMPERATURE") {
        config.completion.temperature = temperature
            .trim()
            .parse()
            .with_context(|| format!("OPENAI_TEMPERATURE is not a number: {temperature}"))?;
    }

    for collection in Collection::ALL {
        if let Some(id) = get(collection.env_var()) {
            config.databases.set(collection, id);
        }
    }

    if let Some(parent) = get("PARENT_PAGE_ID") {
        config.parent_page_id = Some(parent);
    }
    if let Some(secs) = get("REQUEST_TIMEOUT_SECS") {
        config.request_timeout_secs = secs
            .trim()
            .parse()
            .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: {secs}"))?;
    }
    if let Some(max_chars) = get("ARTICLE_MAX_CHARS") {
        config.article.max_chars = max_chars
            .trim()
            .parse()
            .with_context(|| format!("ARTICLE_MAX_CHARS is not a number: {max_chars}"))?;
    }
    if let Some(max_bytes) = get("ARTICLE_MAX_BYTES") {
        config.article.max_bytes = max_bytes
            .trim()
            .parse()
            .with_context(|| format!("ARTICLE_MAX_BYTES is not a number: {max_bytes}"))?;
    }
    if let Some(allow) = get("ARTICLE_ALLOW_PRIVATE_HOSTS") {
        config.article.allow_private_hosts = parse_bool(&allow);
    }

    if let Some(level) = get("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = get("LOG_JSON") {
        config.logging.json = parse_bool(&json);
    }

    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes")
}

fn expand_env_vars(config: BridgeConfig) -> BridgeConfig {
    expand_references(config, |name| env::var(name).ok())
}

/// Substitute environment references in the string-valued settings.
fn expand_references<F>(mut config: BridgeConfig, lookup: F) -> BridgeConfig
where
    F: Fn(&str) -> Option<String>,
{
    let expand = |s: &str| expand_with(s, &lookup);

    config.server.host = expand(&config.server.host);
    config.notion.base_url = expand(&config.notion.base_url);
    config.completion.base_url = expand(&config.completion.base_url);
    config.completion.model = expand(&config.completion.model);
    config.parent_page_id = config.parent_page_id.map(|s| expand(&s));

    for collection in Collection::ALL {
        if let Some(id) = config.databases.get(collection) {
            let expanded = expand(id);
            config.databases.set(collection, expanded);
        }
    }

    config
}

/// Replace `${NAME}` and `$NAME` with `lookup(NAME)`.
///
/// Unknown or empty names stay exactly as written.
fn expand_with<F>(s: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, reference, tail) = match after.strip_prefix('{') {
            Some(braced) => match braced.find('}') {
                Some(close) => (
                    &braced[..close],
                    &rest[pos..pos + close + 3],
                    &braced[close + 1..],
                ),
                None => (braced, &rest[pos..], ""),
            },
            None => {
                let end = after
                    .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], &rest[pos..pos + end + 1], &after[end..])
            }
        };

        match lookup(name).filter(|_| !name.is_empty()) {
            Some(value) => out.push_str(&value),
            None => out.push_str(reference),
        }
        rest = tail;
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_expand_braced_reference() {
        let lookup = lookup_from(&[("SYMBIOTICA_TEST_DB", "db_123")]);
        let result = expand_with("prefix_${SYMBIOTICA_TEST_DB}_suffix", &lookup);
        assert_eq!(result, "prefix_db_123_suffix");
    }

    #[test]
    fn test_expand_bare_reference() {
        let lookup = lookup_from(&[("SYMBIOTICA_TEST_HOST", "example.org")]);
        let result = expand_with("https://$SYMBIOTICA_TEST_HOST/v1", &lookup);
        assert_eq!(result, "https://example.org/v1");
    }

    #[test]
    fn test_unknown_references_are_kept() {
        let lookup = lookup_from(&[]);
        assert_eq!(expand_with("${MISSING}", &lookup), "${MISSING}");
        assert_eq!(expand_with("cost: $5 or $", &lookup), "cost: $5 or $");
        assert_eq!(expand_with("${}x", &lookup), "${}x");
        assert_eq!(expand_with("${OPEN", &lookup), "${OPEN");
    }

    #[test]
    fn test_references_expand_in_database_ids() {
        let mut config = BridgeConfig::default();
        config.databases.set(Collection::Ideas, "${IDEAS}".into());
        config.parent_page_id = Some("$PARENT".into());

        let lookup = lookup_from(&[("IDEAS", "ideas-42"), ("PARENT", "page-7")]);
        let config = expand_references(config, lookup);
        assert_eq!(config.database_id(Collection::Ideas), Some("ideas-42"));
        assert_eq!(config.parent_page_id.as_deref(), Some("page-7"));
    }

    #[test]
    fn test_env_overrides_defaults() {
        let lookup = lookup_from(&[
            ("PORT", "8080"),
            ("NOTION_TOKEN", "secret_abc"),
            ("ARTICLES_DB_ID", "articles-db"),
            ("PEOPLE_DB_ID", "people-db"),
            ("OPENAI_TEMPERATURE", "0.7"),
            ("LOG_JSON", "true"),
            ("ARTICLE_MAX_BYTES", "65536"),
            ("ARTICLE_ALLOW_PRIVATE_HOSTS", "yes"),
        ]);

        let config = apply_env_overrides(BridgeConfig::default(), lookup).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.notion.token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("secret_abc".to_string())
        );
        assert_eq!(config.database_id(Collection::Articles), Some("articles-db"));
        assert_eq!(config.database_id(Collection::People), Some("people-db"));
        assert_eq!(config.database_id(Collection::Events), None);
        assert!((config.completion.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.logging.json);
        assert_eq!(config.article.max_bytes, 65536);
        assert!(config.article.allow_private_hosts);
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let lookup = lookup_from(&[("PORT", "  "), ("EVENTS_DB_ID", "")]);
        let config = apply_env_overrides(BridgeConfig::default(), lookup).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database_id(Collection::Events), None);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let lookup = lookup_from(&[("PORT", "not-a-port")]);
        let err = apply_env_overrides(BridgeConfig::default(), lookup).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_load_config_from_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("symbiotica.yml");
        fs::write(
            &path,
            r#"
server:
  port: 9000
completion:
  model: gpt-4.1-mini
databases:
  articles: art-1
  organizations: org-1
request_timeout_secs: 10
"#,
        )
        .unwrap();

        let config = load_config_from_file(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.completion.model, "gpt-4.1-mini");
        assert_eq!(config.database_id(Collection::Articles), Some("art-1"));
        assert_eq!(config.database_id(Collection::Organizations), Some("org-1"));
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.notion.version, "2022-06-28");
        assert!(config.notion.token.is_none());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("symbiotica.yml");
        fs::write(&path, "").unwrap();

        let config = load_config_from_file(&path).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.article.max_chars, 8000);
        assert_eq!(config.article.max_bytes, 2 * 1024 * 1024);
        assert!(!config.article.allow_private_hosts);
    }
}
