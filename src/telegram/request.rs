//! Turns free-form message text into a `DownloadRequest`.

use lazy_regex::{regex_find, regex_is_match};
use thiserror::Error;

use crate::core::config;
use crate::download::DownloadRequest;

/// Malformed input, reported back to the user verbatim
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestParseError {
    #[error("❌ Send me the link of the clip")]
    Empty,

    #[error("❌ Send a valid link after the word '{}'", config::telegram::AUDIO_KEYWORD)]
    MissingAudioUrl,

    #[error("❌ The link must start with http:// or https://")]
    MissingScheme,
}

/// Parses a user message.
///
/// A message starting with the audio keyword asks for audio only; the URL is
/// the first `http(s)://` token after it. Any other message is taken whole as
/// the URL.
///
/// # Example
///
/// ```
/// use clipferry::telegram::request::parse_request;
///
/// let request = parse_request("صوت https://youtu.be/abc123").unwrap();
/// assert!(request.audio_only);
/// assert_eq!(request.url, "https://youtu.be/abc123");
/// ```
pub fn parse_request(text: &str) -> Result<DownloadRequest, RequestParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RequestParseError::Empty);
    }

    let audio_only = text.starts_with(config::telegram::AUDIO_KEYWORD);
    let url = if audio_only {
        regex_find!(r"(?i)https?://\S+", text).ok_or(RequestParseError::MissingAudioUrl)?
    } else {
        text
    };

    if !regex_is_match!(r"^https?://"i, url) {
        return Err(RequestParseError::MissingScheme);
    }

    Ok(DownloadRequest::new(url, audio_only))
}
