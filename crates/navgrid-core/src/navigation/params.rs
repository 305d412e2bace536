use crate::listing::QueryParams;

///
/// NavParams
///
/// Navigation parameters of one request. `clear` is a presence flag; its
/// value is ignored.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NavParams {
    pub current: Option<String>,
    pub action: Option<String>,
    pub clear: bool,
}

impl NavParams {
    #[must_use]
    pub fn parse(query: &str) -> Self {
        Self::from_params(&QueryParams::parse(query))
    }

    #[must_use]
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            current: params.get("current").map(str::to_string),
            action: params
                .get("action")
                .filter(|action| !action.is_empty())
                .map(str::to_string),
            clear: params.contains("clear"),
        }
    }

    /// Whether the request changes stored state (and so must redirect).
    #[must_use]
    pub const fn is_transition(&self) -> bool {
        self.clear || self.current.is_some() || self.action.is_some()
    }
}
