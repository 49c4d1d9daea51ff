//! Downloader facade.
//!
//! `MediaDownloader` checks a URL against the platform allow-list, gives the
//! request its own scratch directory, runs the primary source and, when it
//! fails, every fallback source that claims the URL. The caller receives
//! either the produced file (which still owns its scratch directory) or a
//! `DownloadError`; on error the scratch directory is already gone.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::config;
use crate::core::error::AppError;
use crate::download::error::DownloadError;
use crate::download::scratch::ScratchDir;
use crate::download::source::{url_mentions, DownloadRequest, DownloadSource, FetchedMedia, MirrorSource, YtDlpSource};

/// Immutable settings injected into the facade.
#[derive(Debug, Clone)]
pub struct DownloaderSettings {
    /// Domains accepted as case-insensitive substrings of the URL
    pub supported_platforms: Vec<String>,
    /// Directory that receives the per-request scratch directories
    pub scratch_root: PathBuf,
}

impl DownloaderSettings {
    pub fn from_config() -> Self {
        Self {
            supported_platforms: config::platforms::SUPPORTED.iter().map(|p| p.to_string()).collect(),
            scratch_root: config::TEMP_FILES_DIR.clone(),
        }
    }

    /// Same allow-list as `from_config`, scratch directories under `scratch_root`.
    pub fn with_scratch_root(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
            ..Self::from_config()
        }
    }

    pub fn is_supported(&self, url: &str) -> bool {
        self.supported_platforms.iter().any(|platform| url_mentions(url, platform))
    }
}

/// A successfully downloaded file together with the directory that holds it.
#[derive(Debug)]
pub struct DownloadedMedia {
    pub path: PathBuf,
    pub title: String,
    /// Name of the source that produced the file
    pub source: String,
    scratch: ScratchDir,
}

impl DownloadedMedia {
    fn new(fetched: FetchedMedia, source: &str, scratch: ScratchDir) -> Self {
        Self {
            path: fetched.path,
            title: fetched.title,
            source: source.to_string(),
            scratch,
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "media".to_string())
    }

    pub fn file_size(&self) -> io::Result<u64> {
        Ok(fs_err::metadata(&self.path)?.len())
    }

    /// Removes the file and its scratch directory (best-effort, logged).
    pub fn cleanup(self) {
        self.scratch.cleanup();
    }
}

/// Chooses and runs download strategies for a request.
pub struct MediaDownloader {
    settings: DownloaderSettings,
    primary: Arc<dyn DownloadSource>,
    fallbacks: Vec<Arc<dyn DownloadSource>>,
}

impl MediaDownloader {
    pub fn new(settings: DownloaderSettings, primary: Arc<dyn DownloadSource>) -> Self {
        Self {
            settings,
            primary,
            fallbacks: Vec::new(),
        }
    }

    /// Registers a fallback. Fallbacks run in registration order, each at most once.
    pub fn with_fallback(mut self, source: Arc<dyn DownloadSource>) -> Self {
        self.fallbacks.push(source);
        self
    }

    /// yt-dlp as primary, the TikTok mirror as fallback.
    pub fn from_config() -> Result<Self, AppError> {
        let mirror = MirrorSource::from_config()?;
        Ok(Self::new(DownloaderSettings::from_config(), Arc::new(YtDlpSource::new())).with_fallback(Arc::new(mirror)))
    }

    pub fn settings(&self) -> &DownloaderSettings {
        &self.settings
    }

    pub fn is_supported(&self, url: &str) -> bool {
        self.settings.is_supported(url)
    }

    /// Downloads `request` into a fresh scratch directory.
    ///
    /// Unsupported URLs fail before any directory is created.
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadedMedia, DownloadError> {
        if !self.is_supported(&request.url) {
            log::info!("Rejected unsupported URL: {}", request.url);
            return Err(DownloadError::Unsupported(request.url.clone()));
        }

        let scratch = ScratchDir::create_in(&self.settings.scratch_root)?;

        let primary_error = if self.primary.supports_url(&request.url) {
            match self.primary.fetch(request, scratch.path()).await {
                Ok(fetched) if scratch.contains(&fetched.path) => {
                    return Ok(DownloadedMedia::new(fetched, self.primary.name(), scratch))
                }
                Ok(fetched) => escaped_scratch(self.primary.name(), &fetched),
                Err(e) => e,
            }
        } else {
            DownloadError::Unsupported(request.url.clone())
        };

        log::warn!(
            "{} failed for {} [{}]: {}",
            self.primary.name(),
            request.url,
            primary_error.subcategory(),
            primary_error
        );

        let mut last_error = primary_error;
        for fallback in self.fallbacks.iter().filter(|s| s.supports_url(&request.url)) {
            log::info!("Trying fallback source {} for {}", fallback.name(), request.url);
            match fallback.fetch(request, scratch.path()).await {
                Ok(fetched) if scratch.contains(&fetched.path) => {
                    log::info!("Fallback source {} succeeded for {}", fallback.name(), request.url);
                    return Ok(DownloadedMedia::new(fetched, fallback.name(), scratch));
                }
                Ok(fetched) => last_error = escaped_scratch(fallback.name(), &fetched),
                Err(e) => {
                    log::error!("Fallback source {} failed for {}: {}", fallback.name(), request.url, e);
                    last_error = e;
                }
            }
        }

        scratch.cleanup();
        Err(last_error)
    }
}

/// A reported file outside the scratch directory would escape cleanup.
fn escaped_scratch(source: &str, fetched: &FetchedMedia) -> DownloadError {
    log::error!(
        "{} reported {} outside its scratch directory",
        source,
        fetched.path.display()
    );
    DownloadError::NoMediaProduced
}
