//! Column and table descriptors.
//!
//! A `TableDeclaration` is compiled once into an immutable `TableDescriptor`:
//! declared columns and configured field paths are resolved against the
//! entity schema, unresolvable ones are dropped, and the result is frozen in
//! display order.

mod column;
mod descriptor;
mod registry;


pub use column::{Column, ColumnDecl};
pub use descriptor::{ColumnHeader, ProtocolConfig, TableDeclaration, TableDescriptor, TableHeader};
pub use registry::TableRegistry;

use crate::error::{ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// TableError
///

#[derive(Debug, ThisError)]
pub enum TableError {
    #[error("table declared for unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("entity '{entity}' detail url format '{format}' has no '{{}}' placeholder")]
    InvalidDetailUrl { entity: String, format: String },

    #[error("no table registered for entity '{0}'")]
    NotRegistered(String),
}

impl From<TableError> for InternalError {
    fn from(err: TableError) -> Self {
        Self::configuration(ErrorOrigin::Table, err.to_string())
    }
}
