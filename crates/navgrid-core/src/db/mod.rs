//! Persistence collaborator boundary.
//!
//! The engine never issues raw queries. It builds declarative
//! [`CollectionQuery`] values (scope, filter, sort, window, projection) and
//! hands them to a [`DataSource`]. [`MemoryStore`] is the in-process source
//! used by tests and embedders without a database.

pub mod aggregate;
mod direction;
mod lookup;
mod memory;
mod predicate;
mod query;
mod record;
mod source;


pub use direction::Direction;
pub use lookup::path_value;
pub use memory::MemoryStore;
pub use predicate::Predicate;
pub use query::{CollectionQuery, RecordView, SortKey, Window};
pub use record::{Record, Row};
pub use source::DataSource;

use crate::error::{ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("entity '{0}' is not registered with the store")]
    UnknownEntity(String),

    #[error("record for entity '{entity}' has no primary key '{field}'")]
    MissingPrimaryKey { entity: String, field: String },
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownEntity(_) => Self::configuration(ErrorOrigin::Store, err.to_string()),
            StoreError::MissingPrimaryKey { .. } => Self::store_internal(err.to_string()),
        }
    }
}
