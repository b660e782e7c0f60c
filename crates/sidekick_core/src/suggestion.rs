use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Navigation,
    Favorite,
    History,
    Search,
    Internal,
    Calculation,
    Info,
    AiQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Globe,
    Star,
    History,
    Search,
    Settings,
    Calculator,
    Clock,
    Calendar,
    Cpu,
}

/// One omnibox completion. Position in the output list is its display rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    /// Empty for informational entries.
    pub url: String,
    pub icon: Icon,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    /// Only set on calculation suggestions.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_result"
    )]
    pub result: Option<f64>,
}

impl Suggestion {
    pub fn new(
        kind: SuggestionKind,
        icon: Icon,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            icon,
            kind,
            result: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SuggestionEnvelope {
    pub suggestions: Vec<Suggestion>,
}

/// Render a calculation result the way a person would type it: `7`, not `7.0`.
pub fn format_number(value: f64) -> String {
    if let Some(int) = as_exact_integer(value) {
        int.to_string()
    } else {
        value.to_string()
    }
}

fn as_exact_integer(value: f64) -> Option<i64> {
    // 2^53: beyond this not every integer is representable.
    const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= EXACT_LIMIT {
        Some(value as i64)
    } else {
        None
    }
}

fn serialize_result<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => match as_exact_integer(*v) {
            Some(int) => serializer.serialize_i64(int),
            None => serializer.serialize_f64(*v),
        },
        None => serializer.serialize_none(),
    }
}
