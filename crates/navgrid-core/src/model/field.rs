use crate::model::EntityKey;
use convert_case::{Case, Casing};

///
/// FieldModel
/// Runtime field metadata used by path resolution, columns, and predicates.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Field name as used in paths, predicates, and projected rows.
    pub name: String,
    /// Human-readable title shown as a column header or detail label.
    pub title: String,
    pub kind: FieldKind,
}

impl FieldModel {
    /// Build a field whose title is derived from its name
    /// (`archive_no` becomes `Archive No`).
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let title = default_title(&name);

        Self { name, title, kind }
    }

    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    #[must_use]
    pub fn decimal(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Decimal)
    }

    #[must_use]
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    #[must_use]
    pub fn reference(name: impl Into<String>, target: impl Into<EntityKey>) -> Self {
        Self::new(
            name,
            FieldKind::Reference {
                target: target.into(),
            },
        )
    }

    /// Override the derived title.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Return the referenced entity when this field is a reference.
    #[must_use]
    pub const fn reference_target(&self) -> Option<&EntityKey> {
        match &self.kind {
            FieldKind::Reference { target } => Some(target),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self.kind, FieldKind::Reference { .. })
    }
}

fn default_title(name: &str) -> String {
    name.to_case(Case::Title)
}

///
/// FieldKind
///
/// Data kind of one attribute. Only `Reference` enables path chaining.
///

#[derive(Clone, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum FieldKind {
    Boolean,
    Date,
    Decimal,
    Number,
    Reference { target: EntityKey },
    Text,
}
