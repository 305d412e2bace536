use crate::{
    db::{DataSource, Record},
    error::InternalError,
    model::EntityModel,
    schema::SchemaRegistry,
    value::Value,
};
use std::borrow::Cow;

/// Read a dotted attribute path from one record, following reference fields
/// through `source` by primary key.
///
/// Any segment that cannot be followed (unknown field, non-reference
/// intermediate, dangling reference) yields `Value::Null`. Only source
/// failures are errors.
pub fn path_value(
    schemas: &SchemaRegistry,
    source: &dyn DataSource,
    entity: &EntityModel,
    record: &Record,
    path: &str,
) -> Result<Value, InternalError> {
    let mut model = entity;
    let mut current: Cow<'_, Record> = Cow::Borrowed(record);
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let Some(value) = current.get(segment).cloned() else {
            return Ok(Value::Null);
        };
        if segments.peek().is_none() {
            return Ok(value);
        }

        let Some(target) = model
            .field(segment)
            .and_then(|field| field.reference_target())
            .and_then(|target| schemas.get(target))
        else {
            return Ok(Value::Null);
        };
        if value.is_null() {
            return Ok(Value::Null);
        }

        let Some(next) = source.get(target.key.as_str(), &value)? else {
            return Ok(Value::Null);
        };
        model = target;
        current = Cow::Owned(next);
    }

    Ok(Value::Null)
}
