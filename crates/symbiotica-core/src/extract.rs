//! Readable-text extraction from fetched web pages.

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use symbiotica_config::ArticleSettings;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid article url: {0}")]
    InvalidUrl(String),

    #[error("refusing to fetch article from private address {0}")]
    PrivateHost(String),

    #[error("timed out fetching article")]
    Timeout,

    #[error("failed to fetch article: {0}")]
    Fetch(#[source] reqwest::Error),

    #[error("article server responded with status {0}")]
    Status(u16),

    #[error("no readable text found in article")]
    NoReadableText,
}

impl ExtractError {
    fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExtractError::Timeout
        } else {
            ExtractError::Fetch(err)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleExtraction {
    pub url: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub published_time: Option<String>,
    pub text: String,
    /// Whether `text` was cut to the character limit.
    pub truncated: bool,
}

/// Fetch `url` and extract its readable content.
///
/// At most `settings.max_bytes` of the body are read; the rest is ignored.
#[tracing::instrument(skip(client, settings))]
pub async fn fetch_article(
    client: &reqwest::Client,
    url: &str,
    settings: &ArticleSettings,
) -> Result<ArticleExtraction, ExtractError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ExtractError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ExtractError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }
    if !settings.allow_private_hosts && is_private_host(&parsed) {
        return Err(ExtractError::PrivateHost(
            parsed.host_str().unwrap_or_default().to_string(),
        ));
    }

    let mut response = client
        .get(parsed.clone())
        .send()
        .await
        .map_err(ExtractError::transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::Status(status.as_u16()));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(ExtractError::transport)? {
        let room = settings.max_bytes - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            warn!(max_bytes = settings.max_bytes, "article body cut at byte limit");
            break;
        }
        body.extend_from_slice(&chunk);
    }
    let html = String::from_utf8_lossy(&body);
    debug!(bytes = body.len(), "fetched article");

    let extraction = extract_article(&html, parsed.as_str(), settings.max_chars)?;
    info!(
        chars = extraction.text.chars().count(),
        truncated = extraction.truncated,
        "extracted article"
    );
    Ok(extraction)
}

/// Loopback, private, link-local or unspecified literal address, or `localhost`.
///
/// Names that resolve to such addresses are not caught here.
fn is_private_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.eq_ignore_ascii_case("localhost") || host.ends_with(".localhost") {
        return true;
    }
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_private_v4(v4),
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_v4(v4),
            None => is_private_v6(v6),
        },
        Err(_) => false,
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}

/// Extract metadata and readable text from an HTML document.
pub fn extract_article(
    html: &str,
    url: &str,
    max_chars: usize,
) -> Result<ArticleExtraction, ExtractError> {
    let document = Html::parse_document(html);
    let meta = meta_tags(&document);

    let title = meta
        .get("property:og:title")
        .cloned()
        .or_else(|| first_text(&document, "title"))
        .or_else(|| first_text(&document, "h1"));
    let author = meta
        .get("name:author")
        .or_else(|| meta.get("property:article:author"))
        .cloned();

    let text = readable_text(&document);
    if text.is_empty() {
        return Err(ExtractError::NoReadableText);
    }
    let (text, truncated) = truncate_chars(&text, max_chars);

    Ok(ArticleExtraction {
        url: url.to_string(),
        title,
        author,
        site_name: meta.get("property:og:site_name").cloned(),
        published_time: meta.get("property:article:published_time").cloned(),
        text,
        truncated,
    })
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Non-empty `<meta>` contents keyed as `name:<name>` / `property:<property>`.
fn meta_tags(document: &Html) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    let Some(meta) = selector("meta") else {
        return tags;
    };

    for element in document.select(&meta) {
        let Some(content) = element.value().attr("content").map(str::trim) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }
        if let Some(name) = element.value().attr("name") {
            tags.entry(format!("name:{}", name.to_ascii_lowercase()))
                .or_insert_with(|| content.to_string());
        }
        if let Some(property) = element.value().attr("property") {
            tags.entry(format!("property:{}", property.to_ascii_lowercase()))
                .or_insert_with(|| content.to_string());
        }
    }
    tags
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn readable_text(document: &Html) -> String {
    let container = ["article", "main", "body"].iter().find_map(|css| {
        let selector = selector(css)?;
        document.select(&selector).next()
    });
    let Some(container) = container else {
        return String::new();
    };

    let paragraphs: Vec<String> = selector("p, h1, h2, h3, li, blockquote")
        .map(|blocks| {
            container
                .select(&blocks)
                .map(|element| collapse_whitespace(&element.text().collect::<String>()))
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if paragraphs.is_empty() {
        visible_text(container)
    } else {
        paragraphs.join("\n\n")
    }
}

/// Text of `root`, skipping script and style contents.
fn visible_text(root: ElementRef<'_>) -> String {
    let raw: String = root
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript"))
            });
            (!hidden).then(|| format!("{} ", &**text))
        })
        .collect();
    collapse_whitespace(&raw)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
<head>
  <title>Fallback Title</title>
  <meta property="og:title" content="Open Graph Title">
  <meta property="og:site_name" content="Example News">
  <meta name="author" content="Jo Writer">
  <meta property="article:published_time" content="2024-05-01T09:00:00Z">
</head>
<body>
  <nav><p>Navigation</p></nav>
  <article>
    <h1>Headline</h1>
    <p>First   paragraph
       spans lines.</p>
    <p>Second paragraph.</p>
  </article>
</body>
</html>"#;

    #[test]
    fn test_extracts_metadata_and_article_text() {
        let article = extract_article(PAGE, "https://example.com/a", 8000).unwrap();
        assert_eq!(article.title.as_deref(), Some("Open Graph Title"));
        assert_eq!(article.author.as_deref(), Some("Jo Writer"));
        assert_eq!(article.site_name.as_deref(), Some("Example News"));
        assert_eq!(
            article.published_time.as_deref(),
            Some("2024-05-01T09:00:00Z")
        );
        assert_eq!(
            article.text,
            "Headline\n\nFirst paragraph spans lines.\n\nSecond paragraph."
        );
        assert!(!article.truncated);
    }

    #[test]
    fn test_title_falls_back_to_title_tag_then_h1() {
        let html = "<html><head><title> Plain </title></head><body><p>x</p></body></html>";
        let article = extract_article(html, "https://e.com", 100).unwrap();
        assert_eq!(article.title.as_deref(), Some("Plain"));

        let html = "<html><body><h1>Heading</h1><p>x</p></body></html>";
        let article = extract_article(html, "https://e.com", 100).unwrap();
        assert_eq!(article.title.as_deref(), Some("Heading"));
    }

    #[test]
    fn test_author_falls_back_to_article_author() {
        let html = r#"<html><head><meta property="article:author" content="Sam"></head>
            <body><p>text</p></body></html>"#;
        let article = extract_article(html, "https://e.com", 100).unwrap();
        assert_eq!(article.author.as_deref(), Some("Sam"));
    }

    #[test]
    fn test_visible_text_fallback_skips_scripts() {
        let html = r#"<html><body><div>Loose <b>text</b></div>
            <script>var hidden = 1;</script><style>.x{}</style></body></html>"#;
        let article = extract_article(html, "https://e.com", 100).unwrap();
        assert_eq!(article.text, "Loose text");
    }

    #[test]
    fn test_empty_document_has_no_readable_text() {
        let err = extract_article("<html><body></body></html>", "https://e.com", 100).unwrap_err();
        assert!(matches!(err, ExtractError::NoReadableText));
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_chars("héllo", 2), ("hé".to_string(), true));
        assert_eq!(truncate_chars("abc", 3), ("abc".to_string(), false));
        assert_eq!(truncate_chars("abc", 10), ("abc".to_string(), false));
    }

    #[test]
    fn test_text_is_truncated_to_limit() {
        let html = format!("<html><body><p>{}</p></body></html>", "a".repeat(50));
        let article = extract_article(&html, "https://e.com", 10).unwrap();
        assert_eq!(article.text.len(), 10);
        assert!(article.truncated);
    }

    #[test]
    fn test_private_hosts_are_detected() {
        let private = [
            "http://localhost:8080/",
            "http://127.0.0.1/",
            "http://10.1.2.3/",
            "http://192.168.0.10/",
            "http://169.254.169.254/latest/meta-data",
            "http://0.0.0.0/",
            "http://[::1]/",
            "http://[fe80::1]/",
            "http://[fd00::5]/",
            "http://[::ffff:127.0.0.1]/",
        ];
        for url in private {
            assert!(is_private_host(&Url::parse(url).unwrap()), "{url}");
        }

        let public = ["https://example.com/a", "http://93.184.216.34/", "http://[2001:db8::1]/"];
        for url in public {
            assert!(!is_private_host(&Url::parse(url).unwrap()), "{url}");
        }
    }
}
