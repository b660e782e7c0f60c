use std::fmt::Write;

use chrono::NaiveDateTime;
use sidekick_logging::sidekick_trace;
use url::form_urlencoded;

use crate::calc::evaluate;
use crate::suggestion::format_number;
use crate::{Icon, LinkEntry, OmniboxContext, OmniboxSettings, Suggestion, SuggestionKind};

const CALC_OPERATORS: &[char] = &['+', '-', '*', '/'];

/// Build the ordered suggestion list for one omnibox query.
///
/// Pure: the result depends only on the arguments. Rules are applied in a
/// fixed order and their output is appended, never re-sorted.
pub fn suggest(
    query: &str,
    context: &OmniboxContext,
    settings: &OmniboxSettings,
    now: NaiveDateTime,
) -> Vec<Suggestion> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let lowered = query.to_lowercase();

    let mut out = Vec::new();
    push_navigation(&mut out, query, settings);
    push_favorites(&mut out, &lowered, context);
    push_history(&mut out, context, settings.history_limit);
    push_search(&mut out, query, settings);
    push_internal(&mut out, &lowered, settings);
    push_calculation(&mut out, query);
    push_time_date(&mut out, &lowered, settings, now);
    push_ai_fallback(&mut out, query, settings);

    sidekick_trace!("omnibox query_len={} suggestions={}", query.len(), out.len());
    out
}

/// Only arithmetic characters, with at least one operator.
pub fn is_calculation_candidate(query: &str) -> bool {
    let allowed = |c: char| c.is_ascii_digit() || CALC_OPERATORS.contains(&c) || ".() ".contains(c);
    query.chars().all(allowed) && query.contains(CALC_OPERATORS)
}

fn push_navigation(out: &mut Vec<Suggestion>, query: &str, settings: &OmniboxSettings) {
    if !query.contains('.') || query.contains(char::is_whitespace) {
        return;
    }
    let url = if query.contains("://") {
        query.to_string()
    } else {
        format!("{}{}", settings.default_scheme, query)
    };
    out.push(Suggestion::new(
        SuggestionKind::Navigation,
        Icon::Globe,
        format!("Go to {query}"),
        url,
    ));
}

fn push_favorites(out: &mut Vec<Suggestion>, lowered: &str, context: &OmniboxContext) {
    let matches = context.favorites.iter().filter(|fav| {
        fav.title.to_lowercase().contains(lowered) || fav.url.to_lowercase().contains(lowered)
    });
    for fav in matches {
        out.push(link_suggestion(SuggestionKind::Favorite, Icon::Star, fav));
    }
}

fn push_history(out: &mut Vec<Suggestion>, context: &OmniboxContext, limit: usize) {
    let is_favorite = |entry: &LinkEntry| context.favorites.iter().any(|fav| fav.url == entry.url);
    // `take` stops the walk once the cap is reached.
    let entries = context
        .history
        .iter()
        .filter(|entry| !is_favorite(entry))
        .take(limit);
    for entry in entries {
        out.push(link_suggestion(SuggestionKind::History, Icon::History, entry));
    }
}

fn push_search(out: &mut Vec<Suggestion>, query: &str, settings: &OmniboxSettings) {
    let engine = settings.search_engine;
    out.push(Suggestion::new(
        SuggestionKind::Search,
        Icon::Search,
        format!("{} Search: {query}", engine.label()),
        format!("{}{}", engine.query_base(), encode(query)),
    ));
}

fn push_internal(out: &mut Vec<Suggestion>, lowered: &str, settings: &OmniboxSettings) {
    let hit = settings.internal_shortcuts.iter().find(|shortcut| {
        shortcut
            .keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()))
    });
    if let Some(shortcut) = hit {
        out.push(Suggestion::new(
            SuggestionKind::Internal,
            Icon::Settings,
            shortcut.title.clone(),
            shortcut.url.clone(),
        ));
    }
}

fn push_calculation(out: &mut Vec<Suggestion>, query: &str) {
    if !is_calculation_candidate(query) {
        return;
    }
    match evaluate(query) {
        Ok(value) => {
            let mut suggestion = Suggestion::new(
                SuggestionKind::Calculation,
                Icon::Calculator,
                format!("{query} = {}", format_number(value)),
                "",
            );
            suggestion.result = Some(value);
            out.push(suggestion);
        }
        Err(err) => sidekick_trace!("calculation skipped: {}", err),
    }
}

fn push_time_date(
    out: &mut Vec<Suggestion>,
    lowered: &str,
    settings: &OmniboxSettings,
    now: NaiveDateTime,
) {
    let is_keyword = settings
        .time_keywords
        .iter()
        .chain(settings.date_keywords.iter())
        .any(|keyword| keyword.to_lowercase() == lowered);
    if !is_keyword {
        return;
    }
    let (Some(time), Some(date)) = (
        format_timestamp(now, &settings.time_format),
        format_timestamp(now, &settings.date_format),
    ) else {
        return;
    };
    out.push(Suggestion::new(
        SuggestionKind::Info,
        Icon::Clock,
        format!("Time: {time}"),
        "",
    ));
    out.push(Suggestion::new(
        SuggestionKind::Info,
        Icon::Calendar,
        format!("Date: {date}"),
        "",
    ));
}

fn push_ai_fallback(out: &mut Vec<Suggestion>, query: &str, settings: &OmniboxSettings) {
    let Some(fallback) = &settings.ai_fallback else {
        return;
    };
    if query.chars().count() <= fallback.min_query_chars {
        return;
    }
    out.push(Suggestion::new(
        SuggestionKind::AiQuery,
        Icon::Cpu,
        format!("Ask AI: {query}"),
        format!("{}{}", fallback.url_base, encode(query)),
    ));
}

fn link_suggestion(kind: SuggestionKind, icon: Icon, entry: &LinkEntry) -> Suggestion {
    let title = if entry.title.is_empty() {
        entry.url.clone()
    } else {
        entry.title.clone()
    };
    Suggestion::new(kind, icon, title, entry.url.clone())
}

fn encode(query: &str) -> String {
    form_urlencoded::byte_serialize(query.as_bytes()).collect()
}

/// `None` when the configured pattern is not a valid strftime string.
fn format_timestamp(now: NaiveDateTime, pattern: &str) -> Option<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", now.format(pattern)).ok()?;
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculation_candidates_need_an_operator() {
        assert!(is_calculation_candidate("3+4"));
        assert!(is_calculation_candidate("(1.5 * 2) / 3"));
        assert!(!is_calculation_candidate("42"));
        assert!(!is_calculation_candidate("3 + x"));
        assert!(!is_calculation_candidate("2^8"));
    }

    #[test]
    fn invalid_time_pattern_skips_rule() {
        let settings = OmniboxSettings {
            time_format: "%Q".to_string(),
            ..OmniboxSettings::default()
        };
        let now = chrono::NaiveDate::from_ymd_opt(2026, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap();
        let out = suggest("time", &OmniboxContext::default(), &settings, now);
        assert!(out.iter().all(|s| s.kind != SuggestionKind::Info));
    }
}
