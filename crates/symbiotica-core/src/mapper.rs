//! Schema-aware property mapping.
//!
//! Mapping is table driven: each [`FieldRule`] names an input field, the
//! database property it feeds, and for every property kind it accepts, the
//! [`Transform`] to apply. A field is written only when the target database
//! declares the property with one of those kinds; anything else is dropped
//! without error.
//!
//! Mapping runs in two stages. [`plan`] is pure and never touches the
//! network. [`MappingPlan::resolve`] turns pending relation names into page
//! ids through an [`EntityResolver`].

use futures::future::try_join_all;
use std::collections::{BTreeMap, HashMap, HashSet};
use symbiotica_config::Collection;
use symbiotica_notion::{DatabaseSchema, PropertyKind, PropertyMap, PropertyValue};
use tracing::debug;

use crate::resolver::{EntityResolver, MapError};

/// How an input value is reshaped for one declared kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Single run; `fallback` when the input is absent or empty.
    Title { fallback: &'static str },
    /// Single run; an empty run when the input is absent.
    RichText,
    Url,
    Select,
    MultiSelect,
    /// Get-or-create each name in `Collection`, reference by id.
    Relation(Collection),
    Date,
    Checkbox,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub property: &'static str,
    pub accepts: &'static [(PropertyKind, Transform)],
}

impl FieldRule {
    fn transform_for(&self, declared: PropertyKind) -> Option<Transform> {
        self.accepts
            .iter()
            .find(|(kind, _)| *kind == declared)
            .map(|(_, transform)| *transform)
    }
}

/// Loosely typed value supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl InputValue {
    /// The text as supplied. Blank text counts as absent.
    fn text(&self) -> Option<&str> {
        match self {
            InputValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Non-empty, trimmed, de-duplicated items in input order.
    fn items(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            InputValue::Text(s) => vec![s.as_str()],
            InputValue::List(items) => items.iter().map(String::as_str).collect(),
            InputValue::Flag(_) => Vec::new(),
        };

        let mut seen = HashSet::new();
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(*s))
            .map(str::to_string)
            .collect()
    }
}

/// Field name to caller-supplied value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordInput {
    fields: BTreeMap<String, InputValue>,
}

impl RecordInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, value: InputValue) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn insert_text(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.insert(field, InputValue::Text(value.to_string()));
        }
    }

    pub fn insert_list(&mut self, field: &str, value: Option<Vec<String>>) {
        if let Some(value) = value {
            self.insert(field, InputValue::List(value));
        }
    }

    pub fn get(&self, field: &str) -> Option<&InputValue> {
        self.fields.get(field)
    }
}

/// Relation names still waiting for ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRelation {
    pub property: String,
    pub collection: Collection,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingPlan {
    pub ready: PropertyMap,
    pub pending: Vec<PendingRelation>,
}

enum Planned {
    Ready(PropertyValue),
    Pending(Collection, Vec<String>),
}

/// Decide which properties to write and how, without any network call.
pub fn plan(rules: &[FieldRule], schema: &DatabaseSchema, input: &RecordInput) -> MappingPlan {
    let mut plan = MappingPlan::default();

    for rule in rules {
        let Some(declared) = schema.kind_of(rule.property) else {
            debug!(field = rule.field, property = rule.property, "property not declared, skipping");
            continue;
        };
        let Some(transform) = rule.transform_for(declared) else {
            debug!(
                field = rule.field,
                property = rule.property,
                %declared,
                "declared kind not accepted, skipping"
            );
            continue;
        };

        match apply(transform, input.get(rule.field)) {
            Some(Planned::Ready(value)) => {
                plan.ready.insert(rule.property.to_string(), value);
            }
            Some(Planned::Pending(collection, names)) => plan.pending.push(PendingRelation {
                property: rule.property.to_string(),
                collection,
                names,
            }),
            None => {}
        }
    }

    plan
}

fn apply(transform: Transform, value: Option<&InputValue>) -> Option<Planned> {
    let text = value.and_then(InputValue::text);
    let items = || value.map(InputValue::items).unwrap_or_default();

    match transform {
        Transform::Title { fallback } => Some(Planned::Ready(PropertyValue::Title(
            text.unwrap_or(fallback).to_string(),
        ))),
        Transform::RichText => Some(Planned::Ready(PropertyValue::RichText(
            text.unwrap_or_default().to_string(),
        ))),
        Transform::Url => text.map(|t| Planned::Ready(PropertyValue::Url(t.to_string()))),
        Transform::Select => text.map(|t| Planned::Ready(PropertyValue::Select(t.to_string()))),
        Transform::Date => text.map(|t| Planned::Ready(PropertyValue::date(t))),
        Transform::MultiSelect => {
            let items = items();
            (!items.is_empty()).then(|| Planned::Ready(PropertyValue::MultiSelect(items)))
        }
        Transform::Relation(collection) => {
            let items = items();
            (!items.is_empty()).then(|| Planned::Pending(collection, items))
        }
        Transform::Checkbox => match value? {
            InputValue::Flag(flag) => Some(Planned::Ready(PropertyValue::Checkbox(*flag))),
            InputValue::Text(s) => parse_flag(s).map(|f| Planned::Ready(PropertyValue::Checkbox(f))),
            InputValue::List(_) => None,
        },
    }
}

pub(crate) fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl MappingPlan {
    /// Resolve every pending relation and return the final properties.
    ///
    /// Each distinct `(collection, name)` is resolved once, all concurrently.
    /// The first failure aborts the whole mapping.
    pub async fn resolve(self, resolver: &dyn EntityResolver) -> Result<PropertyMap, MapError> {
        let MappingPlan { mut ready, pending } = self;
        if pending.is_empty() {
            return Ok(ready);
        }

        let mut seen = HashSet::new();
        let unique: Vec<(Collection, &str)> = pending
            .iter()
            .flat_map(|p| p.names.iter().map(move |name| (p.collection, name.as_str())))
            .filter(|key| seen.insert(*key))
            .collect();

        debug!(lookups = unique.len(), "resolving related entities");
        let ids = try_join_all(
            unique
                .iter()
                .map(|(collection, name)| resolver.resolve(*collection, name)),
        )
        .await?;

        let resolved: HashMap<(Collection, &str), String> = unique.into_iter().zip(ids).collect();

        for relation in &pending {
            let mut ids: Vec<String> = Vec::with_capacity(relation.names.len());
            for name in &relation.names {
                if let Some(id) = resolved.get(&(relation.collection, name.as_str())) {
                    if !ids.contains(id) {
                        ids.push(id.clone());
                    }
                }
            }
            ready.insert(relation.property.clone(), PropertyValue::Relation(ids));
        }

        Ok(ready)
    }
}
