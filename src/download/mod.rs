//! Download management: facade, sources, scratch directories

pub mod downloader;
pub mod error;
pub mod scratch;
pub mod source;

// Re-exports for convenience
pub use downloader::{DownloadedMedia, DownloaderSettings, MediaDownloader};
pub use error::DownloadError;
pub use scratch::ScratchDir;
pub use source::{DownloadRequest, DownloadSource, FetchedMedia, MirrorSource, YtDlpSource};
