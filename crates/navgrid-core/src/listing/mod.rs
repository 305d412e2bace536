//! Listing wire protocol.
//!
//! Decodes grid requests (`draw`, `search[value]`, `order[0][column]`,
//! `start`, `length`, `show_disabled`), runs the fixed
//! scope → count → filter → count → sort → slice → project pipeline, and
//! encodes the payload. Malformed input never reaches the source.

mod handler;
mod request;
mod response;


pub use handler::ListingHandler;
pub use request::{ListingRequest, OrderSpec, QueryParams, SearchSpec};
pub use response::{ErrorPayload, FullPayload, ListingPage, ListingPayload, PagePayload};

use crate::error::{ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// ProtocolError
/// Caller input the listing protocol cannot serve.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ProtocolError {
    #[error("missing required parameter '{param}'")]
    Missing { param: &'static str },

    #[error("malformed parameter '{param}'")]
    Malformed { param: &'static str },

    #[error("order column {index} out of range ({columns} columns)")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("invalid search pattern: {0}")]
    InvalidRegex(String),
}

impl From<ProtocolError> for InternalError {
    fn from(err: ProtocolError) -> Self {
        Self::invalid_input(ErrorOrigin::Listing, err.to_string())
    }
}
