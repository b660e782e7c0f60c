use serde::{Deserialize, Serialize};

/// A `{title, url}` pair as sent by the host for favorites and history.
///
/// The host attaches extra bookkeeping (timestamps, visit counts); those
/// fields are ignored on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl LinkEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Caller-owned snapshot consumed by a single omnibox query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OmniboxContext {
    #[serde(default)]
    pub favorites: Vec<LinkEntry>,
    /// Most-recent first.
    #[serde(default)]
    pub history: Vec<LinkEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OmniboxRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub context: OmniboxContext,
}
