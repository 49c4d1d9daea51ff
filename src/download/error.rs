use thiserror::Error;

/// Structured error type for download operations.
///
/// Every failure the facade can report carries its own variant, so callers
/// never have to guess whether a string is a title or a diagnostic.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The URL does not belong to any supported platform
    #[error("Unsupported link: {0}")]
    Unsupported(String),

    /// yt-dlp could not be started or exited with an error
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// yt-dlp exited cleanly but left no non-empty file behind
    #[error("Download produced no file")]
    NoMediaProduced,

    /// Mirror API transport or payload failure
    #[error("Mirror download failed: {0}")]
    Mirror(String),

    /// Mirror API or media host answered with a non-success status
    #[error("Mirror download failed with HTTP {0}")]
    MirrorStatus(reqwest::StatusCode),

    /// Scratch directory or file system failure
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// The spawned download task panicked or was aborted
    #[error("Download task failed: {0}")]
    TaskJoin(String),
}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::Unsupported(_) => "unsupported",
            DownloadError::Extraction(_) => "extraction",
            DownloadError::NoMediaProduced => "no_media",
            DownloadError::Mirror(_) | DownloadError::MirrorStatus(_) => "mirror",
            DownloadError::Io(_) => "io",
            DownloadError::TaskJoin(_) => "task_join",
        }
    }
}

impl From<tokio::task::JoinError> for DownloadError {
    fn from(err: tokio::task::JoinError) -> Self {
        DownloadError::TaskJoin(err.to_string())
    }
}
