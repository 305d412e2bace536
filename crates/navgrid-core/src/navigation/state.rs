use crate::model::EntityKey;
use serde::{Deserialize, Serialize};

///
/// NavigationState
///
/// What the user is browsing for one main record. Derived fresh on every
/// request from the persisted `StoredNavigation`; never mutated in place.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(tag = "state", content = "target", rename_all = "snake_case")]
pub enum NavigationState {
    #[default]
    MainView,
    RelatedView(EntityKey),
    CreateRelated(EntityKey),
    /// A main-entity action valid without any relation (e.g. `balance`).
    ExtraAction(String),
}

impl NavigationState {
    /// The related entity being browsed or created, if any.
    #[must_use]
    pub const fn relation(&self) -> Option<&EntityKey> {
        match self {
            Self::RelatedView(key) | Self::CreateRelated(key) => Some(key),
            Self::MainView | Self::ExtraAction(_) => None,
        }
    }

    #[must_use]
    pub const fn is_main(&self) -> bool {
        matches!(self, Self::MainView | Self::ExtraAction(_))
    }
}

///
/// StoredNavigation
/// Session-persisted navigation record, encoded as JSON.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StoredNavigation {
    pub current: Option<EntityKey>,
    pub action: Option<String>,
}

impl StoredNavigation {
    #[must_use]
    pub fn related(current: impl Into<EntityKey>, action: impl Into<String>) -> Self {
        Self {
            current: Some(current.into()),
            action: Some(action.into()),
        }
    }
}
