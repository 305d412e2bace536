use crate::{db::Direction, listing::ProtocolError};
use std::collections::BTreeMap;

const DRAW: &str = "draw";
const START: &str = "start";
const LENGTH: &str = "length";
const SEARCH_VALUE: &str = "search[value]";
const SEARCH_REGEX: &str = "search[regex]";
const ORDER_COLUMN: &str = "order[0][column]";
const ORDER_DIR: &str = "order[0][dir]";
const SHOW_DISABLED: &str = "show_disabled";

///
/// QueryParams
/// Decoded query-string pairs; a repeated key keeps its last value.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);

        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

///
/// SearchSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchSpec {
    pub value: String,
    pub regex: bool,
}

///
/// OrderSpec
/// Column index into the compiled column order, plus direction.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OrderSpec {
    pub column: usize,
    pub direction: Direction,
}

///
/// ListingRequest
///
/// One server-side listing request. `length` is `None` when the client asked
/// for every row (a negative length on the wire).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingRequest {
    pub draw: i64,
    pub start: u64,
    pub length: Option<u64>,
    pub search: Option<SearchSpec>,
    pub order: Option<OrderSpec>,
    pub show_disabled: bool,
}

impl ListingRequest {
    /// Decode a raw query string.
    pub fn parse(query: &str) -> Result<Self, ProtocolError> {
        Self::from_params(&QueryParams::parse(query))
    }

    /// Decode already-split parameters. `draw`, `start` and `length` are
    /// required integers.
    pub fn from_params(params: &QueryParams) -> Result<Self, ProtocolError> {
        let draw = required_int(params, DRAW)?;
        let start = u64::try_from(required_int(params, START)?)
            .map_err(|_| ProtocolError::Malformed { param: START })?;
        let length = u64::try_from(required_int(params, LENGTH)?).ok();

        Ok(Self {
            draw,
            start,
            length,
            search: parse_search(params)?,
            order: parse_order(params)?,
            show_disabled: parse_show_disabled(params)?,
        })
    }
}

fn required_int(params: &QueryParams, param: &'static str) -> Result<i64, ProtocolError> {
    let raw = params.get(param).ok_or(ProtocolError::Missing { param })?;

    raw.trim()
        .parse()
        .map_err(|_| ProtocolError::Malformed { param })
}

fn parse_search(params: &QueryParams) -> Result<Option<SearchSpec>, ProtocolError> {
    let regex = match params.get(SEARCH_REGEX) {
        None | Some("false") => false,
        Some("true") => true,
        Some(_) => {
            return Err(ProtocolError::Malformed {
                param: SEARCH_REGEX,
            });
        }
    };

    Ok(params
        .get(SEARCH_VALUE)
        .filter(|value| !value.is_empty())
        .map(|value| SearchSpec {
            value: value.to_string(),
            regex,
        }))
}

fn parse_order(params: &QueryParams) -> Result<Option<OrderSpec>, ProtocolError> {
    let Some(raw) = params.get(ORDER_COLUMN) else {
        return Ok(None);
    };
    let column = raw.trim().parse().map_err(|_| ProtocolError::Malformed {
        param: ORDER_COLUMN,
    })?;
    let direction = match params.get(ORDER_DIR) {
        None => Direction::default(),
        Some(token) => {
            Direction::parse(token).ok_or(ProtocolError::Malformed { param: ORDER_DIR })?
        }
    };

    Ok(Some(OrderSpec { column, direction }))
}

/// Read the `show_disabled` toggle (`"0"` default, `"1"` to include
/// soft-deleted records).
pub(crate) fn parse_show_disabled(params: &QueryParams) -> Result<bool, ProtocolError> {
    match params.get(SHOW_DISABLED) {
        None | Some("0" | "") => Ok(false),
        Some("1") => Ok(true),
        Some(_) => Err(ProtocolError::Malformed {
            param: SHOW_DISABLED,
        }),
    }
}
