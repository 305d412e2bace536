use crate::{
    error::InternalError,
    model::EntityKey,
    schema::SchemaRegistry,
    table::{TableDeclaration, TableDescriptor, TableError},
};
use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

///
/// TableRegistry
///
/// One compiled descriptor per entity, compiled once for the process
/// lifetime. Re-registering an entity returns the existing descriptor.
///

#[derive(Debug)]
pub struct TableRegistry {
    schemas: Arc<SchemaRegistry>,
    tables: RwLock<BTreeMap<EntityKey, Arc<TableDescriptor>>>,
}

impl TableRegistry {
    #[must_use]
    pub fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            schemas,
            tables: RwLock::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn schemas(&self) -> &Arc<SchemaRegistry> {
        &self.schemas
    }

    /// Compile and store a declaration, or return the descriptor already
    /// compiled for its entity.
    pub fn register(&self, decl: &TableDeclaration) -> Result<Arc<TableDescriptor>, InternalError> {
        if let Some(existing) = self.get(decl.entity().as_str()) {
            tracing::debug!(entity = %decl.entity(), "table already compiled; reusing");
            return Ok(existing);
        }

        let compiled = Arc::new(TableDescriptor::compile(&self.schemas, decl)?);
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);

        // a concurrent registration may have won the race
        let stored = tables.entry(decl.entity().clone()).or_insert(compiled);

        Ok(Arc::clone(stored))
    }

    /// Builder-style registration for startup code.
    pub fn with(self, decl: &TableDeclaration) -> Result<Self, InternalError> {
        self.register(decl)?;

        Ok(self)
    }

    #[must_use]
    pub fn get(&self, entity: &str) -> Option<Arc<TableDescriptor>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity)
            .cloned()
    }

    /// Look up a descriptor; an entity browsed without one is a deployment
    /// defect.
    pub fn try_get(&self, entity: &str) -> Result<Arc<TableDescriptor>, InternalError> {
        self.get(entity)
            .ok_or_else(|| TableError::NotRegistered(entity.to_string()).into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
