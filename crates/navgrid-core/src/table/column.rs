use crate::model::FieldModel;

///
/// ColumnDecl
///
/// Explicitly declared column. `name` is a dotted field path; a missing title
/// is filled from the resolved field's title when the column is bound.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnDecl {
    pub name: String,
    pub title: Option<String>,
    pub searchable: bool,
    pub orderable: bool,
}

impl ColumnDecl {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            searchable: true,
            orderable: true,
        }
    }

    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    #[must_use]
    pub const fn orderable(mut self, orderable: bool) -> Self {
        self.orderable = orderable;
        self
    }
}

///
/// Column
/// A bound column: always carries the field its path resolved to.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    pub name: String,
    pub title: String,
    pub searchable: bool,
    pub orderable: bool,
    pub field: FieldModel,
}

impl Column {
    pub(crate) fn bind(decl: &ColumnDecl, field: &FieldModel) -> Self {
        Self {
            name: decl.name.clone(),
            title: decl.title.clone().unwrap_or_else(|| field.title.clone()),
            searchable: decl.searchable,
            orderable: decl.orderable,
            field: field.clone(),
        }
    }

    /// Synthesize a column from a bare configured field path.
    pub(crate) fn synthesize(path: &str, field: &FieldModel) -> Self {
        Self::bind(&ColumnDecl::new(path), field)
    }
}
