//! ## Crate layout
//! - `core`: runtime model, schema registry, tables, listing protocol, and
//!   master-detail navigation.
//! - `error`: the public error type every fallible facade call returns.
//! - `Browser`: validated startup wiring over one data source.
//!
//! The `prelude` module mirrors what request handlers typically need.

pub use navgrid_core as core;

mod browser;
pub mod error;

pub use browser::{Browser, BrowserBuilder};
pub use error::Error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Browser, Error,
        core::{
            config::EngineConfig,
            db::{DataSource, MemoryStore, Record},
            listing::ListingPayload,
            model::{DetailMapping, EntityModel, FieldModel, RelationEntry},
            navigation::{
                MainTarget, MemorySessionStore, NavigationOutcome, NavigationState, SessionStore,
            },
            schema::SchemaRegistry,
            table::{ColumnDecl, TableDeclaration},
            value::Value,
        },
        error::{ErrorKind, ErrorOrigin},
    };
}
