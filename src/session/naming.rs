use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Longest sanitised title kept in a file name.
pub const MAX_TITLE_CHARS: usize = 80;

const FALLBACK_STEM: &str = "aftermovie";

/// `<sanitised title or "aftermovie">_<YYYY-MM-DD>.<extension>`.
///
/// Sanitising lowercases, collapses every run of non-word characters into one `_` and keeps at
/// most [`MAX_TITLE_CHARS`] characters.
pub fn suggested_file_name(title: Option<&str>, date: NaiveDate, extension: &str) -> String {
    static NON_WORD_RE: OnceLock<Regex> = OnceLock::new();
    let non_word =
        NON_WORD_RE.get_or_init(|| Regex::new(r"\W+").expect("non-word regex should compile"));

    let stem = title
        .map(|t| {
            let lower = t.trim().to_lowercase();
            let collapsed = non_word.replace_all(&lower, "_");
            collapsed
                .trim_matches('_')
                .chars()
                .take(MAX_TITLE_CHARS)
                .collect::<String>()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());
    format!(
        "{stem}_{}.{}",
        date.format("%Y-%m-%d"),
        extension.trim_start_matches('.')
    )
}

#[cfg(test)]
#[path = "../../tests/unit/session/naming.rs"]
mod tests;
