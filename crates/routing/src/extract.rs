use std::sync::LazyLock;

use regex::Regex;

/// `Bot <name> has successfully ...`, with the name optionally in `**bold**`.
#[allow(clippy::expect_used)]
static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Bot\s+(?:\*\*)?([^\s*]+)(?:\*\*)?\s+has successfully")
        .expect("identifier pattern is a valid regex")
});

/// Find the bot name announced in `text`.
///
/// Returns the first match with its original casing. The name is a single
/// run of characters without whitespace or `*`, so bold markers around it are
/// never part of the result.
pub fn extract(text: &str) -> Option<&str> {
    if text.is_empty() {
        return None;
    }
    PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First name found across ordered text fragments.
pub fn find_token<'a>(fragments: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    fragments.into_iter().find_map(extract)
}
