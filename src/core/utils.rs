//! Small text and size helpers shared by the downloader and the Telegram layer.

/// Truncates a string to at most `max_chars` characters.
///
/// Counts `char`s, not bytes, so titles in any script are cut on a
/// character boundary.
///
/// # Example
///
/// ```
/// use clipferry::core::utils::truncate_chars;
///
/// assert_eq!(truncate_chars("Demo video", 4), "Demo");
/// assert_eq!(truncate_chars("مقطع", 10), "مقطع");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Whole mebibytes, rounded down (used in "file too large" replies).
pub fn whole_megabytes(bytes: u64) -> u64 {
    bytes / 1024 / 1024
}
