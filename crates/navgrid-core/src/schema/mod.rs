//! Entity schema registry, field path resolution, and startup validation.
//!
//! The registry is populated once at startup with explicit `register` calls
//! and is read-only afterwards. Lookups by key return typed not-found results;
//! configuration defects surface from `validate` as `Configuration` errors.

mod registry;
mod resolve;
mod validate;


pub use registry::{SchemaRegistry, SchemaRegistryError};
pub use resolve::{ResolvedPath, resolve, resolve_chain};
pub use validate::SchemaError;
