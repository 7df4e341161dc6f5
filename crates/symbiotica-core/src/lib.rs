//! Symbiotica Core - request translation
//!
//! Everything between an assistant-facing payload and the document API:
//! schema-aware property mapping, get-or-create entity resolution, loose
//! value encoding, plain-text rendering of page content and readable-text
//! extraction from web articles.

pub mod content;
pub mod encode;
pub mod extract;
pub mod mapper;
pub mod records;
pub mod resolver;

pub use content::render_blocks;
pub use encode::{encode_entry, encode_loose, EncodedEntry};
pub use extract::{extract_article, fetch_article, truncate_chars, ArticleExtraction, ExtractError};
pub use mapper::{plan, FieldRule, InputValue, MappingPlan, PendingRelation, RecordInput, Transform};
pub use records::{
    ArticleSubmission, HelpLogEntry, IdeaSubmission, ListField, ARTICLE_RULES, HELP_LOG_RULES,
    IDEA_RULES,
};
pub use resolver::{DocumentEntityResolver, EntityResolver, MapError, NAME_PROPERTY};
