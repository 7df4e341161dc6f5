//! Submission payloads and the rule tables that map them onto linked
//! collections.

use serde::Deserialize;
use symbiotica_config::Collection;
use symbiotica_notion::PropertyKind;

use crate::mapper::{FieldRule, RecordInput, Transform};

/// A list field that callers sometimes send as a single string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListField {
    One(String),
    Many(Vec<String>),
}

impl ListField {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ListField::One(item) => vec![item],
            ListField::Many(items) => items,
        }
    }
}

fn list(field: Option<ListField>) -> Option<Vec<String>> {
    field.map(ListField::into_vec)
}

pub const ARTICLE_RULES: &[FieldRule] = &[
    FieldRule {
        field: "title",
        property: "Name",
        accepts: &[(
            PropertyKind::Title,
            Transform::Title {
                fallback: "Untitled Article",
            },
        )],
    },
    FieldRule {
        field: "url",
        property: "Source URL",
        accepts: &[(PropertyKind::Url, Transform::Url)],
    },
    FieldRule {
        field: "summary",
        property: "Summary",
        accepts: &[(PropertyKind::RichText, Transform::RichText)],
    },
    FieldRule {
        field: "authors",
        property: "Authors",
        accepts: &[
            (PropertyKind::MultiSelect, Transform::MultiSelect),
            (PropertyKind::Relation, Transform::Relation(Collection::People)),
        ],
    },
    FieldRule {
        field: "organizations",
        property: "Organizations",
        accepts: &[(
            PropertyKind::Relation,
            Transform::Relation(Collection::Organizations),
        )],
    },
    FieldRule {
        field: "people",
        property: "People",
        accepts: &[(PropertyKind::Relation, Transform::Relation(Collection::People))],
    },
    FieldRule {
        field: "events",
        property: "Events",
        accepts: &[(PropertyKind::Relation, Transform::Relation(Collection::Events))],
    },
    FieldRule {
        field: "type",
        property: "Type",
        accepts: &[(PropertyKind::Select, Transform::Select)],
    },
    FieldRule {
        field: "topics",
        property: "Topics",
        accepts: &[(PropertyKind::MultiSelect, Transform::MultiSelect)],
    },
    FieldRule {
        field: "publishedDate",
        property: "Published Date",
        accepts: &[(PropertyKind::Date, Transform::Date)],
    },
    FieldRule {
        field: "source",
        property: "Source",
        accepts: &[(PropertyKind::RichText, Transform::RichText)],
    },
];

pub const IDEA_RULES: &[FieldRule] = &[
    FieldRule {
        field: "title",
        property: "Name",
        accepts: &[(
            PropertyKind::Title,
            Transform::Title {
                fallback: "Untitled Idea",
            },
        )],
    },
    FieldRule {
        field: "description",
        property: "Description",
        accepts: &[(PropertyKind::RichText, Transform::RichText)],
    },
    FieldRule {
        field: "tags",
        property: "Tags",
        accepts: &[(PropertyKind::MultiSelect, Transform::MultiSelect)],
    },
    FieldRule {
        field: "status",
        property: "Status",
        accepts: &[(PropertyKind::Select, Transform::Select)],
    },
];

pub const HELP_LOG_RULES: &[FieldRule] = &[
    FieldRule {
        field: "question",
        property: "Name",
        accepts: &[(
            PropertyKind::Title,
            Transform::Title {
                fallback: "Untitled Question",
            },
        )],
    },
    FieldRule {
        field: "answer",
        property: "Answer",
        accepts: &[(PropertyKind::RichText, Transform::RichText)],
    },
    FieldRule {
        field: "category",
        property: "Category",
        accepts: &[(PropertyKind::Select, Transform::Select)],
    },
    FieldRule {
        field: "loggedAt",
        property: "Logged At",
        accepts: &[(PropertyKind::Date, Transform::Date)],
    },
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSubmission {
    pub title: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub authors: Option<ListField>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub topics: Option<ListField>,
    pub organizations: Option<ListField>,
    pub people: Option<ListField>,
    pub events: Option<ListField>,
    pub published_date: Option<String>,
    pub source: Option<String>,
}

impl ArticleSubmission {
    pub fn to_input(&self) -> RecordInput {
        let mut input = RecordInput::new();
        input.insert_text("title", self.title.as_deref());
        input.insert_text("url", self.url.as_deref());
        input.insert_text("summary", self.summary.as_deref());
        input.insert_list("authors", list(self.authors.clone()));
        input.insert_text("type", self.kind.as_deref());
        input.insert_list("topics", list(self.topics.clone()));
        input.insert_list("organizations", list(self.organizations.clone()));
        input.insert_list("people", list(self.people.clone()));
        input.insert_list("events", list(self.events.clone()));
        input.insert_text("publishedDate", self.published_date.as_deref());
        input.insert_text("source", self.source.as_deref());
        input
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaSubmission {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<ListField>,
    pub status: Option<String>,
}

impl IdeaSubmission {
    pub fn to_input(&self) -> RecordInput {
        let mut input = RecordInput::new();
        input.insert_text("title", self.title.as_deref());
        input.insert_text("description", self.description.as_deref());
        input.insert_list("tags", list(self.tags.clone()));
        input.insert_text("status", self.status.as_deref());
        input
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpLogEntry {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
}

impl HelpLogEntry {
    /// `logged_at` is an ISO date, normally today's UTC date.
    pub fn to_input(&self, logged_at: &str) -> RecordInput {
        let mut input = RecordInput::new();
        input.insert_text("question", self.question.as_deref());
        input.insert_text("answer", self.answer.as_deref());
        input.insert_text("category", self.category.as_deref());
        input.insert_text("loggedAt", Some(logged_at));
        input
    }
}
