use crate::{
    db::{DataSource, Record, path_value},
    model::{AttributeLookup, DetailMapping, DetailSummary, EntityModel},
    schema::SchemaRegistry,
    value::Value,
};

///
/// RecordLookup
/// Reference-following attribute access where every failure reads as `Null`.
///

pub(crate) struct RecordLookup<'a> {
    pub schemas: &'a SchemaRegistry,
    pub source: &'a dyn DataSource,
    pub model: &'a EntityModel,
    pub record: &'a Record,
}

impl AttributeLookup for RecordLookup<'_> {
    fn lookup(&self, path: &str) -> Value {
        path_value(self.schemas, self.source, self.model, self.record, path).unwrap_or_else(|err| {
            tracing::warn!(entity = %self.model.key, path, error = %err, "detail lookup failed");
            Value::Null
        })
    }
}

/// Describe one record: the entity's own summary logic when it yields one,
/// otherwise its declarative mapping, otherwise the primary key.
#[must_use]
pub fn summarize(
    schemas: &SchemaRegistry,
    source: &dyn DataSource,
    model: &EntityModel,
    record: &Record,
) -> DetailSummary {
    let lookup = RecordLookup {
        schemas,
        source,
        model,
        record,
    };

    if let Some(summary) = model
        .detail
        .provider
        .as_ref()
        .and_then(|provider| provider.summary(record, &lookup))
    {
        return summary;
    }

    match &model.detail.mapping {
        Some(mapping) => declarative(mapping, model, record, &lookup),
        None => key_summary(model, record),
    }
}

fn declarative(
    mapping: &DetailMapping,
    model: &EntityModel,
    record: &Record,
    lookup: &dyn AttributeLookup,
) -> DetailSummary {
    DetailSummary {
        title: lookup.lookup(&mapping.title),
        subtitle: mapping
            .subtitle
            .as_deref()
            .map_or(Value::Null, |attr| lookup.lookup(attr)),
        desc: mapping
            .desc
            .iter()
            .map(|(label, attr)| (label.clone(), lookup.lookup(attr)))
            .collect(),
        enabled: model.is_enabled(record),
    }
}

fn key_summary(model: &EntityModel, record: &Record) -> DetailSummary {
    DetailSummary {
        title: model.key_of(record).cloned().unwrap_or_default(),
        enabled: model.is_enabled(record),
        ..DetailSummary::default()
    }
}
