use crate::{
    error::{ErrorOrigin, InternalError},
    model::{EntityModel, FieldKind, FieldModel, RelationEntry},
    schema::SchemaRegistry,
};
use thiserror::Error as ThisError;

const KEY_SUFFIX: &str = "_id";

///
/// SchemaError
/// One configuration defect found while validating the registry.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("entity '{entity}' has no primary key field '{field}'")]
    MissingPrimaryKey { entity: String, field: String },

    #[error("entity '{entity}' enabled field '{field}' is missing or not boolean")]
    InvalidEnabledField { entity: String, field: String },

    #[error("entity '{entity}' field '{field}' references unknown entity '{target}'")]
    UnknownReferenceTarget {
        entity: String,
        field: String,
        target: String,
    },

    #[error("entity '{entity}' relation targets unknown entity '{related}'")]
    UnknownRelatedEntity { entity: String, related: String },

    #[error(
        "entity '{entity}' relation '{related}' query path '{path}' does not resolve back to '{entity}'"
    )]
    MalformedQueryPath {
        entity: String,
        related: String,
        path: String,
    },

    #[error(
        "entity '{entity}' relation '{related}' visibility attribute '{attr}' is not a field of '{entity}'"
    )]
    UnknownVisibilityAttribute {
        entity: String,
        related: String,
        attr: String,
    },
}

impl From<SchemaError> for InternalError {
    fn from(err: SchemaError) -> Self {
        Self::configuration(ErrorOrigin::Schema, err.to_string())
    }
}

// Validate every model, collecting all defects before failing.
pub(super) fn validate_registry(registry: &SchemaRegistry) -> Result<(), InternalError> {
    let mut errs = Vec::new();
    for entity in registry.iter() {
        validate_entity(registry, entity, &mut errs);
    }

    match errs.len() {
        0 => Ok(()),
        1 => Err(errs.remove(0).into()),
        n => {
            let joined = errs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");

            Err(InternalError::configuration(
                ErrorOrigin::Schema,
                format!("{n} schema errors: {joined}"),
            ))
        }
    }
}

fn validate_entity(registry: &SchemaRegistry, entity: &EntityModel, errs: &mut Vec<SchemaError>) {
    let name = entity.key.to_string();

    if entity.field(&entity.primary_key).is_none() {
        errs.push(SchemaError::MissingPrimaryKey {
            entity: name.clone(),
            field: entity.primary_key.clone(),
        });
    }

    if let Some(enabled) = &entity.enabled_field
        && !entity
            .field(enabled)
            .is_some_and(|f| f.kind == FieldKind::Boolean)
    {
        errs.push(SchemaError::InvalidEnabledField {
            entity: name.clone(),
            field: enabled.clone(),
        });
    }

    for field in &entity.fields {
        if let Some(target) = field.reference_target()
            && registry.get(target).is_none()
        {
            errs.push(SchemaError::UnknownReferenceTarget {
                entity: name.clone(),
                field: field.name.clone(),
                target: target.to_string(),
            });
        }
    }

    for relation in entity.relations.iter() {
        validate_relation(registry, entity, relation, errs);
    }
}

// A query path ends on a reference to the main entity, or on a raw
// numeric key column such as `client_id`.
fn points_at(terminal: &FieldModel, main: &EntityModel) -> bool {
    match terminal.reference_target() {
        Some(target) => *target == main.key,
        None => matches!(terminal.kind, FieldKind::Number) && terminal.name.ends_with(KEY_SUFFIX),
    }
}

fn validate_relation(
    registry: &SchemaRegistry,
    main: &EntityModel,
    relation: &RelationEntry,
    errs: &mut Vec<SchemaError>,
) {
    let entity = main.key.to_string();
    let related_key = relation.related.to_string();

    let Some(related) = registry.get(&relation.related) else {
        errs.push(SchemaError::UnknownRelatedEntity {
            entity,
            related: related_key,
        });
        return;
    };

    let points_back = registry
        .resolve(related, &relation.query_path)
        .is_some_and(|terminal| points_at(terminal, main));
    if !points_back {
        errs.push(SchemaError::MalformedQueryPath {
            entity: entity.clone(),
            related: related_key.clone(),
            path: relation.query_path.clone(),
        });
    }

    if let Some(condition) = &relation.visibility {
        for (attr, _) in condition.attrs() {
            if main.field(attr).is_none() {
                errs.push(SchemaError::UnknownVisibilityAttribute {
                    entity: entity.clone(),
                    related: related_key.clone(),
                    attr: attr.to_string(),
                });
            }
        }
    }
}
