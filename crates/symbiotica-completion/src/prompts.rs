//! Fixed instruction templates.

pub const ARTICLE_EXTRACTION_SYSTEM: &str = "You extract structured metadata from news and \
research articles. Reply with a single JSON object and nothing else.";

pub const PAGE_SUMMARY_SYSTEM: &str = "You summarize workspace pages for a busy reader. \
Be concise and factual; use short paragraphs or bullet points.";

pub const WEEKLY_SUMMARY_SYSTEM: &str = "You write a weekly digest of workspace activity. \
Group related pages and highlight what changed.";

/// User prompt asking for article fields in the shape `/submit-article` accepts.
pub fn article_extraction(url: &str, title: Option<&str>, text: &str) -> String {
    format!(
        "Extract the following fields from the article below and return them as JSON with \
these keys: title, url, summary (2-3 sentences), authors (array of names), type (one of \
News, Report, Opinion, Research, Other), topics (array), organizations (array), people \
(array), events (array), publishedDate (YYYY-MM-DD or null), source (publication name).\n\n\
URL: {url}\nTitle: {title}\n\nArticle text:\n{text}",
        title = title.unwrap_or("unknown"),
    )
}

pub fn page_summary(title: &str, content: &str) -> String {
    format!("Summarize the page \"{title}\".\n\n{content}")
}

/// `pages` holds one `title (last edited)` line per page.
pub fn weekly_summary(since: &str, pages: &[String]) -> String {
    format!(
        "These pages were edited since {since}:\n{}\n\nWrite a short summary of the week's work.",
        pages
            .iter()
            .map(|line| format!("- {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    )
}
