use crate::{
    db::{CollectionQuery, Record, Row},
    error::InternalError,
    value::Value,
};

///
/// DataSource
///
/// Persistence collaborator. All operations are side-effect-free reads.
///

pub trait DataSource: Send + Sync {
    /// Fetch one record by primary key.
    fn get(&self, entity: &str, key: &Value) -> Result<Option<Record>, InternalError>;

    /// Count records matching view, scope, and filter.
    /// Sort, window, and projection are ignored.
    fn count(&self, query: &CollectionQuery) -> Result<u64, InternalError>;

    /// Fetch rows projected to exactly `query.projection`.
    /// A path that yields no value projects `null`.
    fn fetch(&self, query: &CollectionQuery) -> Result<Vec<Row>, InternalError>;
}
