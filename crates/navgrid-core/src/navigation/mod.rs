//! Master-detail navigation.
//!
//! A request against a main record either changes the persisted navigation
//! state (`clear`, `current`, `action`) and redirects, or renders the state
//! derived from the session. Stale or invisible relations degrade to the main
//! view; they are never errors.

pub mod detail;
mod engine;
mod params;
mod session;
mod state;

#[cfg(test)]
mod tests;

pub use engine::{
    CreateForm, MainTarget, NavigationContext, NavigationEngine, NavigationOutcome,
    RelationSummary, scoped_query,
};
pub use params::NavParams;
pub use session::{MemorySessionStore, SessionError, SessionStore};
pub use state::{NavigationState, StoredNavigation};

use crate::error::{ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// NavigationError
///

#[derive(Debug, ThisError)]
pub enum NavigationError {
    #[error("main entity '{0}' is not registered")]
    UnknownEntity(String),

    #[error("no '{entity}' record with key {key}")]
    MainRecordNotFound { entity: String, key: String },

    #[error("main record of '{0}' carries no primary key")]
    MainKeyMissing(String),
}

impl From<NavigationError> for InternalError {
    fn from(err: NavigationError) -> Self {
        match err {
            NavigationError::UnknownEntity(_) => {
                Self::configuration(ErrorOrigin::Navigation, err.to_string())
            }
            NavigationError::MainRecordNotFound { .. } => {
                Self::not_found(ErrorOrigin::Navigation, err.to_string())
            }
            NavigationError::MainKeyMissing(_) => {
                Self::invalid_input(ErrorOrigin::Navigation, err.to_string())
            }
        }
    }
}
