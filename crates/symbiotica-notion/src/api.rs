//! Document API trait

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{
    Block, CreateDatabase, CreatePage, Database, DatabaseQuery, ListResponse, Page, SearchRequest,
};
use crate::NotionError;

pub type NotionResult<T> = Result<T, NotionError>;

/// Operations the bridge performs against the document API.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn retrieve_database(&self, database_id: &str) -> NotionResult<Database>;

    async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> NotionResult<ListResponse<Page>>;

    async fn create_database(&self, request: &CreateDatabase) -> NotionResult<Database>;

    async fn retrieve_page(&self, page_id: &str) -> NotionResult<Page>;

    async fn create_page(&self, request: &CreatePage) -> NotionResult<Page>;

    async fn search(&self, request: &SearchRequest) -> NotionResult<ListResponse<Page>>;

    /// First page of a block's children.
    async fn block_children(&self, block_id: &str) -> NotionResult<ListResponse<Block>>;

    async fn append_block_children(
        &self,
        block_id: &str,
        children: &[Value],
    ) -> NotionResult<ListResponse<Block>>;

    async fn update_block(&self, block_id: &str, body: &Value) -> NotionResult<Block>;
}
