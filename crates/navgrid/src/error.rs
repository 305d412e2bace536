use derive_more::Display;
use navgrid_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(err.class.into(), err.origin.into(), err.message)
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and HTTP adapters.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Deployment defect: unknown entity, missing table, invalid config.
    Configuration,

    /// A keyed record does not exist.
    NotFound,

    /// The caller sent something unusable.
    InvalidInput,

    /// The caller cannot remediate this.
    Internal,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Configuration => Self::Configuration,
            ErrorClass::NotFound => Self::NotFound,
            ErrorClass::InvalidInput => Self::InvalidInput,
            ErrorClass::Internal => Self::Internal,
        }
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Schema,
    Table,
    Listing,
    Navigation,
    Store,
    Session,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Schema => Self::Schema,
            CoreErrorOrigin::Table => Self::Table,
            CoreErrorOrigin::Listing => Self::Listing,
            CoreErrorOrigin::Navigation => Self::Navigation,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Session => Self::Session,
        }
    }
}
