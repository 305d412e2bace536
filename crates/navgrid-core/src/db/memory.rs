use crate::{
    db::{
        CollectionQuery, DataSource, Direction, Record, RecordView, Row, StoreError, path_value,
    },
    error::InternalError,
    model::{EntityKey, EntityModel},
    schema::SchemaRegistry,
    value::{Value, canonical_cmp},
};
use std::{collections::BTreeMap, sync::Arc};

///
/// MemoryStore
///
/// In-process `DataSource` over registered entity models.
/// Records keep insertion order; sorting is stable with the primary key as
/// tiebreaker.
///

#[derive(Debug)]
pub struct MemoryStore {
    schemas: Arc<SchemaRegistry>,
    records: BTreeMap<EntityKey, Vec<Record>>,
}

impl MemoryStore {
    #[must_use]
    pub const fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            schemas,
            records: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Insert one record. The entity must be registered and the record must
    /// carry its primary key.
    pub fn insert(&mut self, entity: &str, record: Record) -> Result<(), InternalError> {
        let model = self
            .schemas
            .get(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))?;
        if model.key_of(&record).is_none_or(Value::is_null) {
            return Err(StoreError::MissingPrimaryKey {
                entity: entity.to_string(),
                field: model.primary_key.clone(),
            }
            .into());
        }

        self.records
            .entry(model.key.clone())
            .or_default()
            .push(record);

        Ok(())
    }

    /// Builder-style insert for fixtures.
    pub fn with(mut self, entity: &str, record: Record) -> Result<Self, InternalError> {
        self.insert(entity, record)?;

        Ok(self)
    }

    fn model(&self, entity: &str) -> Result<&EntityModel, InternalError> {
        self.schemas
            .get(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()).into())
    }

    fn collection(&self, entity: &str) -> &[Record] {
        self.records.get(entity).map_or(&[][..], Vec::as_slice)
    }

    // view -> scope -> filter
    fn select(&self, query: &CollectionQuery) -> Result<Vec<&Record>, InternalError> {
        let model = self.model(query.entity.as_str())?;
        let mut matched = Vec::new();

        for record in self.collection(query.entity.as_str()) {
            if query.view == RecordView::EnabledOnly && model.is_enabled(record) == Some(false) {
                continue;
            }

            let mut value_of = |path: &str| path_value(&self.schemas, self, model, record, path);
            if query.scope.eval(&mut value_of)? && query.filter.eval(&mut value_of)? {
                matched.push(record);
            }
        }

        Ok(matched)
    }

    fn sort<'a>(
        &self,
        model: &EntityModel,
        records: Vec<&'a Record>,
        path: &str,
        direction: Direction,
    ) -> Result<Vec<&'a Record>, InternalError> {
        let mut keyed = records
            .into_iter()
            .map(|record| {
                path_value(&self.schemas, self, model, record, path).map(|value| (value, record))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let null = Value::Null;
        keyed.sort_by(|(a, ra), (b, rb)| {
            let primary = match direction {
                Direction::Asc => canonical_cmp(a, b),
                Direction::Desc => canonical_cmp(b, a),
            };
            primary.then_with(|| {
                let ka = model.key_of(ra).unwrap_or(&null);
                let kb = model.key_of(rb).unwrap_or(&null);
                canonical_cmp(ka, kb)
            })
        });

        Ok(keyed.into_iter().map(|(_, record)| record).collect())
    }
}

impl DataSource for MemoryStore {
    fn get(&self, entity: &str, key: &Value) -> Result<Option<Record>, InternalError> {
        let model = self.model(entity)?;

        Ok(self
            .collection(entity)
            .iter()
            .find(|record| model.key_of(record).is_some_and(|pk| pk.loose_eq(key)))
            .cloned())
    }

    fn count(&self, query: &CollectionQuery) -> Result<u64, InternalError> {
        let matched = self.select(query)?;

        Ok(matched.len() as u64)
    }

    fn fetch(&self, query: &CollectionQuery) -> Result<Vec<Row>, InternalError> {
        let model = self.model(query.entity.as_str())?;
        let mut records = self.select(query)?;

        if let Some(order) = &query.order {
            records = self.sort(model, records, &order.path, order.direction)?;
        }

        let windowed: Box<dyn Iterator<Item = &Record>> = match query.window {
            Some(window) => {
                let start = usize::try_from(window.start).unwrap_or(usize::MAX);
                let length = window
                    .length
                    .map_or(usize::MAX, |len| usize::try_from(len).unwrap_or(usize::MAX));
                Box::new(records.into_iter().skip(start).take(length))
            }
            None => Box::new(records.into_iter()),
        };

        windowed
            .map(|record| {
                query
                    .projection
                    .iter()
                    .map(|path| {
                        path_value(&self.schemas, self, model, record, path)
                            .map(|value| (path.clone(), value))
                    })
                    .collect::<Result<Row, _>>()
            })
            .collect()
    }
}
