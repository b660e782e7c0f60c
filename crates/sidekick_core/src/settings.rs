use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[default]
    Google,
    Bing,
    DuckDuckGo,
}

impl SearchEngine {
    pub fn label(self) -> &'static str {
        match self {
            SearchEngine::Google => "Google",
            SearchEngine::Bing => "Bing",
            SearchEngine::DuckDuckGo => "DuckDuckGo",
        }
    }

    /// Base URL; the percent-encoded query is appended.
    pub fn query_base(self) -> &'static str {
        match self {
            SearchEngine::Google => "https://www.google.com/search?q=",
            SearchEngine::Bing => "https://www.bing.com/search?q=",
            SearchEngine::DuckDuckGo => "https://duckduckgo.com/?q=",
        }
    }
}

/// Keyword-triggered link to a browser-internal page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalShortcut {
    pub keywords: Vec<String>,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiFallback {
    /// Queries must be strictly longer than this many characters.
    pub min_query_chars: usize,
    pub url_base: String,
}

impl Default for AiFallback {
    fn default() -> Self {
        Self {
            min_query_chars: 5,
            url_base: "lumina-app://ai-chat?q=".to_string(),
        }
    }
}

/// Immutable knobs for [`crate::suggest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmniboxSettings {
    pub default_scheme: String,
    pub search_engine: SearchEngine,
    pub history_limit: usize,
    pub internal_shortcuts: Vec<InternalShortcut>,
    pub time_keywords: Vec<String>,
    pub date_keywords: Vec<String>,
    pub time_format: String,
    pub date_format: String,
    /// `None` disables the "Ask AI" suggestion.
    pub ai_fallback: Option<AiFallback>,
}

impl Default for OmniboxSettings {
    fn default() -> Self {
        Self {
            default_scheme: "http://".to_string(),
            search_engine: SearchEngine::Google,
            history_limit: 3,
            internal_shortcuts: vec![InternalShortcut {
                keywords: vec!["settings".to_string(), "ayarlar".to_string()],
                title: "Lumina Settings".to_string(),
                url: "lumina://settings".to_string(),
            }],
            time_keywords: vec!["time".to_string(), "saat".to_string()],
            date_keywords: vec!["date".to_string(), "tarih".to_string()],
            time_format: "%H:%M:%S".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            ai_fallback: None,
        }
    }
}
