use crate::{db::Row, table::TableHeader};
use serde::Serialize;

///
/// ListingPayload
///
/// Wire response of one listing request. Serializes untagged, so each
/// variant produces exactly the JSON shape the grid widget expects.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ListingPayload {
    Page(PagePayload),
    Full(FullPayload),
    Error(ErrorPayload),
}

impl ListingPayload {
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Page(page) => &page.data,
            Self::Full(full) => &full.data,
            Self::Error(_) => &[],
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

///
/// PagePayload
/// Server-side page: echoed draw token plus both counts.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePayload {
    pub draw: i64,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Vec<Row>,
}

///
/// FullPayload
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FullPayload {
    pub data: Vec<Row>,
}

///
/// ErrorPayload
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

///
/// ListingPage
///
/// Render context for the non-interactive page load: the grid header plus
/// the toggle state the page was requested with.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListingPage {
    pub table: TableHeader,
    pub titles: Vec<String>,
    pub show_disabled: bool,
}
