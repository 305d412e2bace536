use crate::{db::Record, value::Value};
use serde::Serialize;
use std::{fmt, sync::Arc};

///
/// DetailSummary
///
/// Title/subtitle/description block describing one record.
/// Missing attributes surface as `null`, never as an error.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetailSummary {
    pub title: Value,
    pub subtitle: Value,
    /// Ordered `(label, value)` pairs.
    pub desc: Vec<(String, Value)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

///
/// DetailMapping
///
/// Declarative summary: each entry names an attribute path evaluated
/// against the record (`subcase.case.name` follows references).
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DetailMapping {
    pub title: String,
    pub subtitle: Option<String>,
    pub desc: Vec<(String, String)>,
}

impl DetailMapping {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn subtitle(mut self, attr: impl Into<String>) -> Self {
        self.subtitle = Some(attr.into());
        self
    }

    #[must_use]
    pub fn desc(mut self, label: impl Into<String>, attr: impl Into<String>) -> Self {
        self.desc.push((label.into(), attr.into()));
        self
    }
}

///
/// AttributeLookup
/// Safe attribute access for summary providers; unknown paths yield `Null`.
///

pub trait AttributeLookup {
    fn lookup(&self, path: &str) -> Value;
}

///
/// SummaryProvider
///
/// Record-supplied summary logic. Returning `None` falls back to the
/// declarative mapping, then to the primary-key summary.
///

pub trait SummaryProvider: Send + Sync {
    fn summary(&self, record: &Record, lookup: &dyn AttributeLookup) -> Option<DetailSummary>;
}

///
/// DetailSource
///
/// Summary sources of one entity, consulted provider first, then mapping.
///

#[derive(Clone, Default)]
pub struct DetailSource {
    pub mapping: Option<DetailMapping>,
    pub provider: Option<Arc<dyn SummaryProvider>>,
}

impl fmt::Debug for DetailSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailSource")
            .field("mapping", &self.mapping)
            .field("provider", &self.provider.as_ref().map(|_| ".."))
            .finish()
    }
}
