use crate::error::{ErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SESSION_PREFIX: &str = "nav";
pub const DEFAULT_ACTION: &str = "list";
pub const CREATE_ACTION: &str = "create";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request arguments";

///
/// EngineConfig
///
/// Runtime knobs for the listing handler and navigation engine.
/// Every field has a default, so `{}` is a valid configuration.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Prefix of navigation session keys (`{prefix}:{entity}`).
    pub session_prefix: String,
    pub default_action: String,
    pub create_action: String,
    /// Message carried by the listing error payload.
    pub invalid_request_message: String,
    /// Upper bound applied to a requested page length.
    pub max_page_length: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_prefix: DEFAULT_SESSION_PREFIX.to_string(),
            default_action: DEFAULT_ACTION.to_string(),
            create_action: CREATE_ACTION.to_string(),
            invalid_request_message: INVALID_REQUEST_MESSAGE.to_string(),
            max_page_length: None,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, InternalError> {
        let config: Self = serde_json::from_str(json).map_err(|err| {
            InternalError::configuration(
                ErrorOrigin::Navigation,
                format!("invalid engine config: {err}"),
            )
        })?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), InternalError> {
        let blank = [
            ("session_prefix", &self.session_prefix),
            ("default_action", &self.default_action),
            ("create_action", &self.create_action),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((name, _)) = blank {
            return Err(InternalError::configuration(
                ErrorOrigin::Navigation,
                format!("engine config '{name}' must not be empty"),
            ));
        }
        if self.default_action == self.create_action {
            return Err(InternalError::configuration(
                ErrorOrigin::Navigation,
                "engine config 'default_action' and 'create_action' must differ",
            ));
        }
        if self.max_page_length == Some(0) {
            return Err(InternalError::configuration(
                ErrorOrigin::Listing,
                "engine config 'max_page_length' must be positive",
            ));
        }

        Ok(())
    }

    /// Session key for the navigation state of one main entity.
    #[must_use]
    pub fn session_key(&self, entity: &str) -> String {
        format!("{}:{entity}", self.session_prefix)
    }
}
