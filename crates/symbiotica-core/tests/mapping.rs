//! Property mapping and entity resolution against an in-memory document API.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use symbiotica_config::{Collection, DatabaseIds};
use symbiotica_core::{
    plan, ArticleSubmission, DocumentEntityResolver, EntityResolver, ListField, MapError,
    ARTICLE_RULES,
};
use symbiotica_notion::{
    Block, CreateDatabase, CreatePage, Database, DatabaseQuery, DatabaseSchema, DocumentApi,
    ListResponse, NotionError, NotionResult, Page, Parent, PropertyKind,
    PropertyValue, SearchRequest,
};

#[derive(Default)]
struct InMemoryDocuments {
    /// database id -> (name, page id)
    records: Mutex<HashMap<String, Vec<(String, String)>>>,
    queries: Mutex<Vec<(String, String)>>,
    creates: Mutex<Vec<String>>,
    fail_creates: bool,
}

impl InMemoryDocuments {
    fn with_record(self, database_id: &str, name: &str, page_id: &str) -> Self {
        self.records
            .lock()
            .unwrap()
            .entry(database_id.to_string())
            .or_default()
            .push((name.to_string(), page_id.to_string()));
        self
    }

    fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn created(&self) -> Vec<String> {
        self.creates.lock().unwrap().clone()
    }
}

fn page(id: &str) -> Page {
    serde_json::from_value(json!({ "id": id })).unwrap()
}

fn unsupported<T>() -> NotionResult<T> {
    Err(NotionError::InvalidResponse("not supported by fake".into()))
}

#[async_trait]
impl DocumentApi for InMemoryDocuments {
    async fn retrieve_database(&self, _database_id: &str) -> NotionResult<Database> {
        unsupported()
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> NotionResult<ListResponse<Page>> {
        let name = query
            .filter
            .as_ref()
            .and_then(|f| f["title"]["equals"].as_str())
            .unwrap_or_default()
            .to_string();
        self.queries
            .lock()
            .unwrap()
            .push((database_id.to_string(), name.clone()));

        let results = self
            .records
            .lock()
            .unwrap()
            .get(database_id)
            .into_iter()
            .flatten()
            .filter(|(record, _)| *record == name)
            .map(|(_, id)| page(id))
            .collect();
        Ok(ListResponse {
            results,
            has_more: false,
            next_cursor: None,
        })
    }

    async fn create_database(&self, _request: &CreateDatabase) -> NotionResult<Database> {
        unsupported()
    }

    async fn retrieve_page(&self, _page_id: &str) -> NotionResult<Page> {
        unsupported()
    }

    async fn create_page(&self, request: &CreatePage) -> NotionResult<Page> {
        if self.fail_creates {
            return Err(NotionError::Api {
                status: 400,
                code: "validation_error".into(),
                message: "Name is not a property that exists.".into(),
            });
        }
        let Parent::DatabaseId(database_id) = &request.parent else {
            return unsupported();
        };
        let Some(PropertyValue::Title(name)) = request.properties.get("Name") else {
            return unsupported();
        };

        let mut creates = self.creates.lock().unwrap();
        let id = format!("{database_id}-{}", creates.len() + 1);
        creates.push(name.clone());
        self.records
            .lock()
            .unwrap()
            .entry(database_id.clone())
            .or_default()
            .push((name.clone(), id.clone()));
        Ok(page(&id))
    }

    async fn search(&self, _request: &SearchRequest) -> NotionResult<ListResponse<Page>> {
        unsupported()
    }

    async fn block_children(&self, _block_id: &str) -> NotionResult<ListResponse<Block>> {
        unsupported()
    }

    async fn append_block_children(
        &self,
        _block_id: &str,
        _children: &[Value],
    ) -> NotionResult<ListResponse<Block>> {
        unsupported()
    }

    async fn update_block(&self, _block_id: &str, _body: &Value) -> NotionResult<Block> {
        unsupported()
    }
}

fn databases() -> DatabaseIds {
    let mut ids = DatabaseIds::default();
    ids.set(Collection::People, "people-db".into());
    ids.set(Collection::Organizations, "orgs-db".into());
    ids
}

fn resolver(api: Arc<InMemoryDocuments>) -> DocumentEntityResolver {
    DocumentEntityResolver::new(api, databases())
}

fn article(value: Value) -> ArticleSubmission {
    serde_json::from_value(value).unwrap()
}

fn article_schema(authors: PropertyKind) -> DatabaseSchema {
    DatabaseSchema::new()
        .with("Name", PropertyKind::Title)
        .with("Source URL", PropertyKind::Url)
        .with("Authors", authors)
        .with("People", PropertyKind::Relation)
        .with("Organizations", PropertyKind::Relation)
        .with("Published Date", PropertyKind::Date)
}

#[test]
fn test_url_is_written_as_submitted() {
    let submission = article(json!({"title": "A", "url": " http://x/a b ", "publishedDate": " "}));
    let mapping = plan(
        ARTICLE_RULES,
        &article_schema(PropertyKind::MultiSelect),
        &submission.to_input(),
    );

    assert_eq!(
        mapping.ready.get("Source URL"),
        Some(&PropertyValue::Url(" http://x/a b ".into()))
    );
    assert!(!mapping.ready.contains_key("Published Date"));
}

#[tokio::test]
async fn test_multi_select_authors_need_no_lookup() {
    let api = Arc::new(InMemoryDocuments::default());
    let submission = article(json!({"title": "A", "url": "http://x", "authors": ["Jo"]}));

    let properties = plan(
        ARTICLE_RULES,
        &article_schema(PropertyKind::MultiSelect),
        &submission.to_input(),
    )
    .resolve(&resolver(api.clone()))
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_value(&properties["Authors"]).unwrap(),
        json!({"multi_select": [{"name": "Jo"}]})
    );
    assert_eq!(
        properties.get("Name"),
        Some(&PropertyValue::Title("A".into()))
    );
    assert_eq!(
        properties.get("Source URL"),
        Some(&PropertyValue::Url("http://x".into()))
    );
    assert!(!properties.contains_key("Published Date"));
    assert_eq!(api.query_count(), 0);
}

#[tokio::test]
async fn test_relation_authors_are_created_in_people() {
    let api = Arc::new(InMemoryDocuments::default());
    let submission = article(json!({"title": "A", "url": "http://x", "authors": ["Jo"]}));

    let properties = plan(
        ARTICLE_RULES,
        &article_schema(PropertyKind::Relation),
        &submission.to_input(),
    )
    .resolve(&resolver(api.clone()))
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_value(&properties["Authors"]).unwrap(),
        json!({"relation": [{"id": "people-db-1"}]})
    );
    assert_eq!(api.created(), vec!["Jo".to_string()]);
    assert_eq!(
        api.queries.lock().unwrap().clone(),
        vec![("people-db".to_string(), "Jo".to_string())]
    );
}

#[tokio::test]
async fn test_existing_name_resolves_without_creating() {
    let api = Arc::new(InMemoryDocuments::default().with_record("people-db", "Jo", "jo-page"));
    let resolver = resolver(api.clone());

    let first = resolver.resolve(Collection::People, "Jo").await.unwrap();
    let second = resolver.resolve(Collection::People, "Jo").await.unwrap();

    assert_eq!(first, "jo-page");
    assert_eq!(second, "jo-page");
    assert!(api.created().is_empty());
}

#[tokio::test]
async fn test_shared_names_are_resolved_once() {
    let api = Arc::new(InMemoryDocuments::default());
    let mut submission = article(json!({"title": "A", "organizations": ["Acme"]}));
    submission.authors = Some(ListField::Many(vec!["Jo".into()]));
    submission.people = Some(ListField::Many(vec!["Jo".into(), "Al".into(), "Jo".into()]));

    let properties = plan(
        ARTICLE_RULES,
        &article_schema(PropertyKind::Relation),
        &submission.to_input(),
    )
    .resolve(&resolver(api.clone()))
    .await
    .unwrap();

    let mut created = api.created();
    created.sort();
    assert_eq!(created, vec!["Acme", "Al", "Jo"]);
    assert_eq!(api.query_count(), 3);

    let PropertyValue::Relation(authors) = &properties["Authors"] else {
        panic!("Authors should be a relation");
    };
    let PropertyValue::Relation(people) = &properties["People"] else {
        panic!("People should be a relation");
    };
    assert_eq!(authors.len(), 1);
    assert_eq!(people.len(), 2);
    assert_eq!(people[0], authors[0]);
    assert!(matches!(
        &properties["Organizations"],
        PropertyValue::Relation(ids) if ids.len() == 1 && ids[0].starts_with("orgs-db-")
    ));
}

#[tokio::test]
async fn test_unconfigured_collection_aborts_mapping() {
    let api = Arc::new(InMemoryDocuments::default());
    let submission = article(json!({"title": "A", "events": ["Summit"]}));
    let schema = DatabaseSchema::new()
        .with("Name", PropertyKind::Title)
        .with("Events", PropertyKind::Relation);

    let err = plan(ARTICLE_RULES, &schema, &submission.to_input())
        .resolve(&resolver(api))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MapError::CollectionNotConfigured(Collection::Events)
    ));
    assert_eq!(
        err.to_string(),
        "EVENTS database id is not configured"
    );
}

#[tokio::test]
async fn test_failed_create_aborts_mapping() {
    let api = Arc::new(InMemoryDocuments {
        fail_creates: true,
        ..Default::default()
    });
    let submission = article(json!({"people": ["Jo"]}));

    let err = plan(
        ARTICLE_RULES,
        &article_schema(PropertyKind::Relation),
        &submission.to_input(),
    )
    .resolve(&resolver(api))
    .await
    .unwrap_err();

    assert!(matches!(err, MapError::Document(NotionError::Api { status: 400, .. })));
}
