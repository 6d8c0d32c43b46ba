//! Keyword matching against inbound message text.
//!
//! Matching is case-insensitive substring search ("cat" matches
//! "concatenate"), and at most one keyword matches per message: the first
//! entry of the keyword list, in list order, that occurs in the text. Later
//! keywords that also occur are deliberately ignored so a single message can
//! never produce more than one alert.

/// Characters of message text kept in the stored alert record.
pub const STORED_MESSAGE_CHARS: usize = 200;

/// Characters of message text included in the outbound alert notification.
pub const NOTIFIED_MESSAGE_CHARS: usize = 100;

/// Return the first keyword (in list order) that occurs in `text` as a
/// case-insensitive substring, or `None` when nothing matches.
///
/// Empty keywords never match.
pub fn first_match<'a>(keywords: &'a [String], text: &str) -> Option<&'a str> {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .find(|kw| !kw.is_empty() && lowered.contains(&kw.to_lowercase()))
        .map(String::as_str)
}

/// Truncate `text` to at most `max_chars` characters, respecting character
/// boundaries. Message text may be any UTF-8 (Arabic keywords and messages
/// are common), so byte slicing is never safe here.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
