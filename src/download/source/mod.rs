//! Download source abstraction layer.
//!
//! Provides the `DownloadSource` trait for pluggable download backends.
//! The facade runs one primary source for every supported URL and, when it
//! fails, the fallback sources that claim the URL.
//!
//! Built-in backends:
//! - `YtDlpSource`: every supported platform via yt-dlp
//! - `MirrorSource`: TikTok through the tikwm mirror API

pub mod mirror;
pub mod ytdlp;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::download::error::DownloadError;

pub use mirror::MirrorSource;
pub use ytdlp::YtDlpSource;

/// Request parameters for a download operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// URL exactly as the user sent it
    pub url: String,
    /// Extract and transcode the audio track only
    pub audio_only: bool,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, audio_only: bool) -> Self {
        Self {
            url: url.into(),
            audio_only,
        }
    }
}

/// A file a source wrote into the scratch directory.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub path: PathBuf,
    pub title: String,
}

/// Trait for download source implementations.
#[async_trait]
pub trait DownloadSource: Send + Sync {
    /// Human-readable name of this source (e.g., "yt-dlp", "mirror")
    fn name(&self) -> &str;

    /// Whether this source can handle the given URL.
    fn supports_url(&self, url: &str) -> bool;

    /// Download into `scratch_dir` and return the produced file.
    async fn fetch(&self, request: &DownloadRequest, scratch_dir: &Path) -> Result<FetchedMedia, DownloadError>;
}

/// Case-insensitive substring match of `domain` inside `url`.
pub fn url_mentions(url: &str, domain: &str) -> bool {
    url.to_lowercase().contains(&domain.to_lowercase())
}
