use crate::{
    model::{EntityModel, FieldModel},
    schema::SchemaRegistry,
};

///
/// ResolvedPath
///
/// Every field traversed while resolving a dotted path, plus the entity that
/// owns each one. Both vectors are non-empty and the same length.
///

#[derive(Clone, Debug)]
pub struct ResolvedPath<'a> {
    pub fields: Vec<&'a FieldModel>,
    pub owners: Vec<&'a EntityModel>,
}

impl<'a> ResolvedPath<'a> {
    /// The field the path ends on.
    #[must_use]
    pub fn terminal(&self) -> &'a FieldModel {
        self.fields[self.fields.len() - 1]
    }

    /// The entity owning the terminal field.
    #[must_use]
    pub fn terminal_owner(&self) -> &'a EntityModel {
        self.owners[self.owners.len() - 1]
    }

    /// The first traversed field (a local field of the root entity).
    #[must_use]
    pub fn first(&self) -> &'a FieldModel {
        self.fields[0]
    }
}

/// Resolve a dotted path (`country.continent.name`) to its terminal field.
///
/// Returns `None` when any segment is missing, any intermediate segment is
/// not a reference, or a reference target is not registered. Callers treat
/// `None` as "drop this column/field".
#[must_use]
pub fn resolve<'a>(
    registry: &'a SchemaRegistry,
    entity: &'a EntityModel,
    path: &str,
) -> Option<&'a FieldModel> {
    resolve_chain(registry, entity, path).map(|resolved| resolved.terminal())
}

/// Resolve a dotted path, keeping the full chain of traversed fields.
#[must_use]
pub fn resolve_chain<'a>(
    registry: &'a SchemaRegistry,
    entity: &'a EntityModel,
    path: &str,
) -> Option<ResolvedPath<'a>> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    if head.is_empty() {
        return None;
    }

    let field = entity.field(head)?;
    let Some(rest) = rest else {
        return Some(ResolvedPath {
            fields: vec![field],
            owners: vec![entity],
        });
    };

    let target = registry.get(field.reference_target()?)?;
    let mut tail = resolve_chain(registry, target, rest)?;
    tail.fields.insert(0, field);
    tail.owners.insert(0, entity);

    Some(tail)
}
