use crate::{
    error::InternalError,
    navigation::StoredNavigation,
};
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};
use thiserror::Error as ThisError;

///
/// SessionError
///

#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error("failed to encode navigation state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("session backend failure: {0}")]
    Backend(String),
}

impl From<SessionError> for InternalError {
    fn from(err: SessionError) -> Self {
        Self::session_internal(err.to_string())
    }
}

///
/// SessionStore
///
/// Key/value persistence scoped to one authenticated session.
/// Values are opaque strings; the engine stores JSON.
///

pub trait SessionStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, InternalError>;

    fn save(&self, key: &str, value: String) -> Result<(), InternalError>;

    fn remove(&self, key: &str) -> Result<(), InternalError>;
}

///
/// MemorySessionStore
///

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<Option<String>, InternalError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, value: String) -> Result<(), InternalError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), InternalError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        Ok(())
    }
}

/// Read stored navigation. Undecodable state is treated as absent.
pub(crate) fn load_navigation(
    session: &dyn SessionStore,
    key: &str,
) -> Result<Option<StoredNavigation>, InternalError> {
    let Some(raw) = session.load(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(stored) => Ok(Some(stored)),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding undecodable navigation state");
            Ok(None)
        }
    }
}

pub(crate) fn save_navigation(
    session: &dyn SessionStore,
    key: &str,
    stored: &StoredNavigation,
) -> Result<(), InternalError> {
    let raw = serde_json::to_string(stored).map_err(SessionError::from)?;

    session.save(key, raw)
}
