use crate::{
    db::{Direction, Predicate},
    model::EntityKey,
};

///
/// RecordView
///
/// Which records a query sees. `EnabledOnly` is applied by the source as part
/// of the query, so counts always match what is fetchable.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RecordView {
    All,
    #[default]
    EnabledOnly,
}

impl RecordView {
    #[must_use]
    pub const fn from_show_disabled(show_disabled: bool) -> Self {
        if show_disabled {
            Self::All
        } else {
            Self::EnabledOnly
        }
    }
}

///
/// SortKey
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortKey {
    pub path: String,
    pub direction: Direction,
}

///
/// Window
/// Zero-based offset plus optional page size (`None` means unbounded).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    pub start: u64,
    pub length: Option<u64>,
}

///
/// CollectionQuery
///
/// Declarative request over one entity collection. Sources must apply the
/// parts in the order view/scope → filter → sort → window → projection.
///

#[derive(Clone, Debug)]
pub struct CollectionQuery {
    pub entity: EntityKey,
    pub view: RecordView,
    /// Relation/ownership restriction, applied before any counting.
    pub scope: Predicate,
    /// User search restriction, applied after the total count.
    pub filter: Predicate,
    pub order: Option<SortKey>,
    pub window: Option<Window>,
    /// Field paths to return; rows carry exactly these keys.
    pub projection: Vec<String>,
}

impl CollectionQuery {
    #[must_use]
    pub fn new(entity: impl Into<EntityKey>) -> Self {
        Self {
            entity: entity.into(),
            view: RecordView::default(),
            scope: Predicate::True,
            filter: Predicate::True,
            order: None,
            window: None,
            projection: Vec::new(),
        }
    }

    #[must_use]
    pub const fn view(mut self, view: RecordView) -> Self {
        self.view = view;
        self
    }

    /// Narrow the scope; scopes compose by conjunction.
    #[must_use]
    pub fn scope(mut self, predicate: Predicate) -> Self {
        self.scope = std::mem::replace(&mut self.scope, Predicate::True).and(predicate);
        self
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = std::mem::replace(&mut self.filter, Predicate::True).and(predicate);
        self
    }

    #[must_use]
    pub fn order_by(mut self, path: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(SortKey {
            path: path.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub const fn window(mut self, start: u64, length: Option<u64>) -> Self {
        self.window = Some(Window { start, length });
        self
    }

    #[must_use]
    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The same query with only view and scope kept (the "base" collection).
    #[must_use]
    pub fn base(&self) -> Self {
        Self {
            entity: self.entity.clone(),
            view: self.view,
            scope: self.scope.clone(),
            filter: Predicate::True,
            order: None,
            window: None,
            projection: Vec::new(),
        }
    }
}
