//! On-demand aggregates over a collection query.
//!
//! Derived figures (e.g. the sum of payments linked to a payable) are pure
//! functions over the source; nothing is cached on the record.

use crate::{
    db::{CollectionQuery, DataSource},
    error::InternalError,
    value::Value,
};
use rust_decimal::Decimal;

/// Sum a numeric path over every row the query selects.
///
/// Sort and window on `query` are honoured; projection is replaced by `path`.
/// Returns `None` when no selected row carries a numeric value.
pub fn sum(
    source: &dyn DataSource,
    query: &CollectionQuery,
    path: &str,
) -> Result<Option<Decimal>, InternalError> {
    let query = query.clone().project([path]);
    let rows = source.fetch(&query)?;

    Ok(rows
        .iter()
        .filter_map(|row| row.get(path).and_then(Value::to_decimal))
        .fold(None, |acc, next| Some(acc.unwrap_or_default() + next)))
}
