//! Runtime of the navgrid entity browsing engine.
//!
//! Entity models and the schema registry describe what can be browsed;
//! table descriptors compile listing columns once; the listing handler serves
//! the paged grid protocol; the navigation engine pivots from a main record
//! to its related collections.

pub mod config;
pub mod db;
pub mod error;
pub mod listing;
pub mod model;
pub mod navigation;
pub mod obs;
pub mod schema;
pub mod table;
pub mod value;

#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Workspace version re-export for downstream tooling.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::EngineConfig,
        db::{CollectionQuery, DataSource, Direction, MemoryStore, Predicate, Record, RecordView},
        listing::{ListingHandler, ListingPayload, ListingRequest},
        model::{
            DetailMapping, EntityKey, EntityModel, FieldKind, FieldModel, RelationEntry,
        },
        navigation::{
            MainTarget, MemorySessionStore, NavigationEngine, NavigationOutcome, NavigationState,
            SessionStore,
        },
        schema::SchemaRegistry,
        table::{ColumnDecl, TableDeclaration, TableDescriptor, TableRegistry},
        value::Value,
    };
}
