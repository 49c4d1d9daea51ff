use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration constants for the bot
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Root directory for per-request scratch directories
/// Read from TEMP_FILES_DIR environment variable
/// Defaults to the system temp directory
pub static TEMP_FILES_DIR: Lazy<PathBuf> = Lazy::new(|| {
    env::var("TEMP_FILES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
});

/// Base URL of the TikTok mirror API used as a fallback
/// Read from MIRROR_API_URL environment variable
pub static MIRROR_API_URL: Lazy<String> =
    Lazy::new(|| env::var("MIRROR_API_URL").unwrap_or_else(|_| mirror::DEFAULT_BASE_URL.to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Custom Bot API server (optional)
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok().filter(|s| !s.is_empty()));

/// Reads the bot token from BOT_TOKEN or TELOXIDE_TOKEN.
///
/// The token is the only mandatory setting: the bot refuses to start without it.
pub fn bot_token() -> Option<String> {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .ok()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Platforms accepted by the downloader (matched as case-insensitive substrings)
pub mod platforms {
    pub const SUPPORTED: &[&str] = &[
        "youtube.com",
        "youtu.be",
        "tiktok.com",
        "instagram.com",
        "x.com",
        "twitter.com",
        "facebook.com",
        "fb.watch",
        "reddit.com",
        "pinterest.com",
        "twitch.tv",
        "dailymotion.com",
        "vimeo.com",
        "rumble.com",
        "bilibili.com",
        "likee.com",
    ];

    /// The one platform that gets spoofed headers and the mirror fallback
    pub const TIKTOK: &str = "tiktok.com";
}

/// Download configuration
pub mod download {
    /// Maximum characters kept from an extracted title
    pub const MAX_TITLE_CHARS: usize = 100;

    /// Retry count for connection, fragment and extractor phases of yt-dlp
    pub const YTDLP_RETRIES: u32 = 3;

    /// yt-dlp socket timeout (in seconds)
    pub const SOCKET_TIMEOUT_SECS: u64 = 30;

    /// Codec and bitrate for audio-only requests
    pub const AUDIO_CODEC: &str = "mp3";
    pub const AUDIO_QUALITY_KBPS: u32 = 192;

    /// Prefix of every scratch directory
    pub const SCRATCH_PREFIX: &str = "download_";
}

/// Mirror API configuration
pub mod mirror {
    use super::Duration;

    pub const DEFAULT_BASE_URL: &str = "https://www.tikwm.com";

    /// Connect and per-read timeout for the mirror requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// File name written into the scratch directory
    pub const OUTPUT_FILE_NAME: &str = "tiktok_video.mp4";

    /// Title reported for mirror downloads
    pub const TITLE: &str = "TikTok Video";

    /// Write buffer size for the streamed body
    pub const CHUNK_SIZE: usize = 8192;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Telegram upload configuration
pub mod telegram {
    /// Largest file the bot will upload (49 MiB)
    pub const UPLOAD_LIMIT_BYTES: u64 = 49 * 1024 * 1024;

    /// Caption limit for videos
    pub const VIDEO_CAPTION_LIMIT: usize = 1024;

    /// Title limit for audio
    pub const AUDIO_TITLE_LIMIT: usize = 64;

    /// Diagnostic text limit in error replies
    pub const ERROR_TEXT_LIMIT: usize = 200;

    /// Keyword that turns a message into an audio-only request
    pub const AUDIO_KEYWORD: &str = "صوت";
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Uploads of files close to the ceiling need a generous timeout
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
