//! Runtime data model definitions.
//!
//! This module contains the *runtime representations* of entity schemas as
//! supplied by the application at startup: entities, their fields, their
//! relation maps, and how a record of each entity is summarized.
//!
//! In general:
//! - `model` defines *what exists*
//! - `schema` registers and validates it once
//! - `table`, `listing`, and `navigation` define *what runs*
pub mod detail;
pub mod entity;
pub mod field;
pub mod relation;

pub use detail::{AttributeLookup, DetailMapping, DetailSource, DetailSummary, SummaryProvider};
pub use entity::{EntityKey, EntityModel, EntityModelBuilder, FormBinding};
pub use field::{FieldKind, FieldModel};
pub use relation::{RelationEntry, RelationMap, VisibilityCondition};
