use crate::{db::Record, model::EntityKey, value::Value};
use std::collections::BTreeMap;

///
/// VisibilityCondition
///
/// Attribute values a main record must carry, exactly, for a relation to be
/// browsable from it (e.g. `{is_agent: true}`).
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibilityCondition {
    attrs: BTreeMap<String, Value>,
}

impl VisibilityCondition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(attr.into(), value.into());
        self
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every attribute must be present on the record and equal to the
    /// required value.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.attrs
            .iter()
            .all(|(attr, want)| record.get(attr).is_some_and(|have| have.loose_eq(want)))
    }
}

///
/// RelationEntry
///
/// One navigable related collection. `query_path` is a dotted path from the
/// related entity back to the main entity, used to scope related queries.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RelationEntry {
    pub related: EntityKey,
    pub query_path: String,
    pub display_name: String,
    pub visibility: Option<VisibilityCondition>,
}

impl RelationEntry {
    #[must_use]
    pub fn new(
        related: impl Into<EntityKey>,
        query_path: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            related: related.into(),
            query_path: query_path.into(),
            display_name: display_name.into(),
            visibility: None,
        }
    }

    /// Attach (or extend) the visibility condition.
    #[must_use]
    pub fn visible_when(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        let condition = self.visibility.take().unwrap_or_default();
        self.visibility = Some(condition.with(attr, value));
        self
    }

    #[must_use]
    pub fn is_visible_for(&self, main: &Record) -> bool {
        self.visibility
            .as_ref()
            .is_none_or(|condition| condition.matches(main))
    }

    /// The query path's first segment: the related entity's own foreign key.
    #[must_use]
    pub fn foreign_key(&self) -> &str {
        self.query_path
            .split('.')
            .next()
            .unwrap_or(&self.query_path)
    }

    #[must_use]
    pub fn is_direct(&self) -> bool {
        !self.query_path.contains('.')
    }
}

///
/// RelationMap
/// Ordered relation entries of one main entity; order is display order.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelationMap {
    entries: Vec<RelationEntry>,
}

impl RelationMap {
    pub(crate) fn push(&mut self, entry: RelationEntry) {
        self.entries.retain(|e| e.related != entry.related);
        self.entries.push(entry);
    }

    #[must_use]
    pub fn get(&self, related: &str) -> Option<&RelationEntry> {
        self.entries.iter().find(|e| e.related.as_str() == related)
    }

    /// Look up a relation that is currently browsable from `main`.
    #[must_use]
    pub fn visible(&self, related: &str, main: &Record) -> Option<&RelationEntry> {
        self.get(related).filter(|e| e.is_visible_for(main))
    }

    pub fn visible_for<'a>(&'a self, main: &'a Record) -> impl Iterator<Item = &'a RelationEntry> {
        self.entries.iter().filter(move |e| e.is_visible_for(main))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
