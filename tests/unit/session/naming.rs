use super::*;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[test]
fn title_is_lowercased_and_collapsed() {
    assert_eq!(
        suggested_file_name(Some("Summer Party -- 2024!"), day(), "mp4"),
        "summer_party_2024_2024-06-01.mp4"
    );
}

#[test]
fn missing_or_symbol_only_title_falls_back() {
    assert_eq!(
        suggested_file_name(None, day(), "webm"),
        "aftermovie_2024-06-01.webm"
    );
    assert_eq!(
        suggested_file_name(Some(" !!! "), day(), ".webm"),
        "aftermovie_2024-06-01.webm"
    );
}

#[test]
fn long_titles_are_truncated() {
    let title = "a".repeat(200);
    let name = suggested_file_name(Some(&title), day(), "mp4");
    assert_eq!(name, format!("{}_2024-06-01.mp4", "a".repeat(MAX_TITLE_CHARS)));
}

#[test]
fn unicode_word_characters_survive() {
    assert_eq!(
        suggested_file_name(Some("Fête à Zürich"), day(), "mp4"),
        "fête_à_zürich_2024-06-01.mp4"
    );
}
