//! Symbiotica Notion - Document API client
//!
//! Typed access to the workspace API the bridge writes into:
//! - databases: schema retrieval, query, creation
//! - pages: create, retrieve, search
//! - blocks: list children, append, update
//!
//! [`DocumentApi`] is the seam the rest of the bridge depends on;
//! [`NotionClient`] is the HTTP implementation.

mod api;
mod client;
mod error;
pub mod property;
pub mod types;

pub use api::{DocumentApi, NotionResult};
pub use client::{NotionClient, DEFAULT_BASE_URL, DEFAULT_VERSION};
pub use error::NotionError;
pub use property::{text_runs, DatabaseSchema, PropertyKind, PropertyMap, PropertyValue};
pub use types::{
    paragraph_block, paragraph_update, paragraphs, Block, CreateDatabase, CreatePage, Database,
    DatabaseQuery, ListResponse, Page, Parent, RichText, SearchRequest,
};
