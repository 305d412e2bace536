use crate::{
    error::{ErrorOrigin, InternalError},
    model::{EntityKey, EntityModel, FieldModel},
    schema::{ResolvedPath, resolve, resolve_chain, validate},
};
use std::{collections::BTreeMap, sync::OnceLock};
use thiserror::Error as ThisError;

///
/// SchemaRegistryError
///

#[derive(Debug, ThisError)]
pub enum SchemaRegistryError {
    #[error("entity '{0}' not found")]
    EntityNotFound(String),

    #[error("entity '{0}' already registered")]
    EntityAlreadyRegistered(String),
}

impl From<SchemaRegistryError> for InternalError {
    fn from(err: SchemaRegistryError) -> Self {
        match err {
            SchemaRegistryError::EntityNotFound(_) => {
                Self::not_found(ErrorOrigin::Schema, err.to_string())
            }
            SchemaRegistryError::EntityAlreadyRegistered(_) => {
                Self::configuration(ErrorOrigin::Schema, err.to_string())
            }
        }
    }
}

///
/// SchemaRegistry
///
/// Stable string keys to entity models. Validated exactly once.
///

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entities: BTreeMap<EntityKey, EntityModel>,
    validated: OnceLock<()>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one entity model under its key.
    pub fn register(&mut self, model: EntityModel) -> Result<(), InternalError> {
        if self.entities.contains_key(&model.key) {
            return Err(SchemaRegistryError::EntityAlreadyRegistered(model.key.to_string()).into());
        }

        // any later registration invalidates a previous validation pass
        self.validated = OnceLock::new();
        self.entities.insert(model.key.clone(), model);

        Ok(())
    }

    /// Builder-style registration for startup code.
    pub fn with(mut self, model: EntityModel) -> Result<Self, InternalError> {
        self.register(model)?;

        Ok(self)
    }

    /// Look up an entity model; unknown keys are a typed miss.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EntityModel> {
        self.entities.get(key)
    }

    /// Look up an entity model, reporting unknown keys as `NotFound`.
    pub fn try_get(&self, key: &str) -> Result<&EntityModel, InternalError> {
        self.get(key)
            .ok_or_else(|| SchemaRegistryError::EntityNotFound(key.to_string()).into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityModel> {
        self.entities.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Resolve a dotted field path against one entity.
    #[must_use]
    pub fn resolve<'a>(&'a self, entity: &'a EntityModel, path: &str) -> Option<&'a FieldModel> {
        resolve(self, entity, path)
    }

    /// Resolve a dotted field path, keeping every traversed field.
    #[must_use]
    pub fn resolve_chain<'a>(
        &'a self,
        entity: &'a EntityModel,
        path: &str,
    ) -> Option<ResolvedPath<'a>> {
        resolve_chain(self, entity, path)
    }

    /// Validate every registered model, once per registry state.
    pub fn validate(&self) -> Result<(), InternalError> {
        if self.validated.get().is_some() {
            return Ok(());
        }

        validate::validate_registry(self)?;
        self.validated.set(()).ok();

        Ok(())
    }
}
