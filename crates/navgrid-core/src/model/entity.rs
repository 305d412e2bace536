use crate::{
    db::Record,
    model::{
        DetailMapping, DetailSource, FieldModel, RelationEntry, RelationMap, SummaryProvider,
    },
    value::Value,
};
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, sync::Arc};

///
/// EntityKey
///
/// Stable, schema-qualified entity identifier (`app.model`, e.g. `case.subcase`).
/// Used for registry lookups, relation keys, and session keys.
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for EntityKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&Self> for EntityKey {
    fn from(key: &Self) -> Self {
        key.clone()
    }
}

///
/// FormBinding
/// Create-form handle bound to exactly one entity.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormBinding {
    pub form_key: String,
}

///
/// EntityModel
/// Runtime model for one entity: fields, relation map, and presentation hooks.
///

#[derive(Clone, Debug)]
pub struct EntityModel {
    pub key: EntityKey,
    /// Human-readable entity title.
    pub title: String,
    /// Primary key field name (points at an entry in `fields`).
    pub primary_key: String,
    /// Ordered field list (authoritative for path resolution).
    pub fields: Vec<FieldModel>,
    /// Boolean soft-delete flag backing the enabled-only view.
    pub enabled_field: Option<String>,
    pub relations: RelationMap,
    pub detail: DetailSource,
    pub form: Option<FormBinding>,
    /// Main-entity actions that stay valid with no relation selected.
    pub extra_actions: Vec<String>,
}

impl EntityModel {
    #[must_use]
    pub fn builder(key: impl Into<EntityKey>, title: impl Into<String>) -> EntityModelBuilder {
        EntityModelBuilder::new(key.into(), title.into())
    }

    /// Look up one local field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Return the primary key value of a record of this entity.
    #[must_use]
    pub fn key_of<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        record.get(&self.primary_key)
    }

    /// Evaluate the soft-delete flag; `None` when the entity has no flag.
    /// A record without a boolean flag value counts as enabled.
    #[must_use]
    pub fn is_enabled(&self, record: &Record) -> Option<bool> {
        let field = self.enabled_field.as_deref()?;

        Some(record.get(field).and_then(Value::as_bool).unwrap_or(true))
    }

    #[must_use]
    pub fn allows_extra_action(&self, action: &str) -> bool {
        self.extra_actions.iter().any(|a| a == action)
    }
}

///
/// EntityModelBuilder
///

#[derive(Debug)]
pub struct EntityModelBuilder {
    model: EntityModel,
}

impl EntityModelBuilder {
    fn new(key: EntityKey, title: String) -> Self {
        Self {
            model: EntityModel {
                key,
                title,
                primary_key: "id".to_string(),
                fields: Vec::new(),
                enabled_field: None,
                relations: RelationMap::default(),
                detail: DetailSource::default(),
                form: None,
                extra_actions: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.model.primary_key = name.into();
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldModel) -> Self {
        self.model.fields.push(field);
        self
    }

    /// Declare the boolean soft-delete flag, adding the field when absent.
    #[must_use]
    pub fn enabled_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.model.fields.iter().any(|f| f.name == name) {
            self.model.fields.push(FieldModel::boolean(name.clone()));
        }
        self.model.enabled_field = Some(name);
        self
    }

    #[must_use]
    pub fn relation(mut self, entry: RelationEntry) -> Self {
        self.model.relations.push(entry);
        self
    }

    #[must_use]
    pub fn detail(mut self, mapping: DetailMapping) -> Self {
        self.model.detail.mapping = Some(mapping);
        self
    }

    #[must_use]
    pub fn custom_detail(mut self, provider: Arc<dyn SummaryProvider>) -> Self {
        self.model.detail.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn form(mut self, form_key: impl Into<String>) -> Self {
        self.model.form = Some(FormBinding {
            form_key: form_key.into(),
        });
        self
    }

    #[must_use]
    pub fn extra_action(mut self, action: impl Into<String>) -> Self {
        self.model.extra_actions.push(action.into());
        self
    }

    /// Finish the model. An undeclared primary key is added as a leading
    /// numeric `ID` field.
    #[must_use]
    pub fn build(mut self) -> EntityModel {
        let pk = self.model.primary_key.clone();
        if !self.model.fields.iter().any(|f| f.name == pk) {
            self.model
                .fields
                .insert(0, FieldModel::number(pk).titled("ID"));
        }

        self.model
    }
}
