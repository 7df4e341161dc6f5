//! Entity resolution: turning a related record's name into its page id.

use async_trait::async_trait;
use std::sync::Arc;
use symbiotica_config::{Collection, DatabaseIds};
use symbiotica_notion::{
    CreatePage, DatabaseQuery, DocumentApi, NotionError, PropertyMap, PropertyValue,
};
use thiserror::Error;
use tracing::{debug, info};

/// Title column every linked collection is keyed by.
pub const NAME_PROPERTY: &str = "Name";

#[derive(Debug, Error)]
pub enum MapError {
    #[error("{} database id is not configured", .0.to_string().to_uppercase())]
    CollectionNotConfigured(Collection),

    #[error(transparent)]
    Document(#[from] NotionError),
}

#[async_trait]
pub trait EntityResolver: Send + Sync {
    /// Id of the record called `name` in `collection`.
    async fn resolve(&self, collection: Collection, name: &str) -> Result<String, MapError>;
}

/// Read-then-create against the document API.
///
/// Two requests resolving the same new name at once can both miss the
/// lookup and create duplicates; nothing here enforces uniqueness.
pub struct DocumentEntityResolver {
    api: Arc<dyn DocumentApi>,
    databases: DatabaseIds,
}

impl DocumentEntityResolver {
    pub fn new(api: Arc<dyn DocumentApi>, databases: DatabaseIds) -> Self {
        Self { api, databases }
    }
}

#[async_trait]
impl EntityResolver for DocumentEntityResolver {
    #[tracing::instrument(skip(self), fields(%collection))]
    async fn resolve(&self, collection: Collection, name: &str) -> Result<String, MapError> {
        let database_id = self
            .databases
            .get(collection)
            .ok_or(MapError::CollectionNotConfigured(collection))?;

        let existing = self
            .api
            .query_database(database_id, &DatabaseQuery::title_equals(NAME_PROPERTY, name))
            .await?;
        if let Some(page) = existing.results.into_iter().next() {
            debug!(page_id = %page.id, "matched existing entity");
            return Ok(page.id);
        }

        let mut properties = PropertyMap::new();
        properties.insert(
            NAME_PROPERTY.to_string(),
            PropertyValue::Title(name.to_string()),
        );
        let created = self
            .api
            .create_page(&CreatePage::in_database(database_id, properties))
            .await?;
        info!(page_id = %created.id, "created entity");
        Ok(created.id)
    }
}
