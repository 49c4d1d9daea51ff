//! MirrorSource: TikTok fallback through the tikwm mirror API.
//!
//! Two requests: the API call resolves a direct media URL, the second GET
//! streams that URL into the scratch directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::core::config;
use crate::download::error::DownloadError;
use crate::download::source::{url_mentions, DownloadRequest, DownloadSource, FetchedMedia};

/// Body of `GET /api/?url=...`
#[derive(Debug, Deserialize)]
struct MirrorResponse {
    code: Option<i64>,
    msg: Option<String>,
    data: Option<MirrorData>,
}

#[derive(Debug, Deserialize)]
struct MirrorData {
    play: Option<String>,
}

impl MirrorResponse {
    /// The direct media URL, present only when `code == 0`.
    fn play_url(&self) -> Option<&str> {
        if self.code != Some(0) {
            return None;
        }
        self.data
            .as_ref()
            .and_then(|d| d.play.as_deref())
            .map(str::trim)
            .filter(|play| !play.is_empty())
    }
}

/// Download source for TikTok links resolved through the mirror API.
pub struct MirrorSource {
    client: Client,
    base_url: String,
}

impl MirrorSource {
    /// Uses the base URL configured through `MIRROR_API_URL`.
    pub fn from_config() -> Result<Self, reqwest::Error> {
        Self::new(config::MIRROR_API_URL.as_str())
    }

    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, config::mirror::timeout())
    }

    /// `timeout` bounds connecting and each read, not the whole transfer,
    /// so a slow but steady media stream runs to completion.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Asks the mirror for a direct media URL.
    async fn resolve_play_url(&self, url: &str) -> Result<String, DownloadError> {
        let api_url = format!("{}/api/", self.base_url);

        let response = self
            .client
            .get(&api_url)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| DownloadError::Mirror(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DownloadError::MirrorStatus(response.status()));
        }

        let body: MirrorResponse = response
            .json()
            .await
            .map_err(|e| DownloadError::Mirror(format!("unexpected API response: {}", e)))?;

        let play = body.play_url().ok_or_else(|| {
            DownloadError::Mirror(format!(
                "no media URL in API response (code {:?}, msg {:?})",
                body.code, body.msg
            ))
        })?;

        // The API sometimes answers with a path on its own host
        if play.starts_with('/') {
            Ok(format!("{}{}", self.base_url, play))
        } else {
            Ok(play.to_string())
        }
    }

    /// Streams `media_url` into `output_path`, returning the byte count.
    async fn stream_to_file(&self, media_url: &str, output_path: &Path) -> Result<u64, DownloadError> {
        let response = self
            .client
            .get(media_url)
            .send()
            .await
            .map_err(|e| DownloadError::Mirror(format!("media request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DownloadError::MirrorStatus(response.status()));
        }

        let file = fs_err::tokio::File::create(output_path).await?;
        let mut writer = BufWriter::with_capacity(config::mirror::CHUNK_SIZE, file);
        let mut written: u64 = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::Mirror(format!("Error reading chunk: {}", e)))?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl DownloadSource for MirrorSource {
    fn name(&self) -> &str {
        "mirror"
    }

    fn supports_url(&self, url: &str) -> bool {
        url_mentions(url, config::platforms::TIKTOK)
    }

    /// `request.audio_only` is not honored: the mirror only serves the mp4.
    async fn fetch(&self, request: &DownloadRequest, scratch_dir: &Path) -> Result<FetchedMedia, DownloadError> {
        log::info!("📥 Mirror download: {}", request.url);

        let play_url = self.resolve_play_url(&request.url).await?;
        let path: PathBuf = scratch_dir.join(config::mirror::OUTPUT_FILE_NAME);
        let written = self.stream_to_file(&play_url, &path).await?;

        if written == 0 {
            return Err(DownloadError::Mirror("media response was empty".to_string()));
        }

        log::info!(
            "✅ Mirror download complete: {} ({:.2} MB)",
            path.display(),
            written as f64 / (1024.0 * 1024.0)
        );

        Ok(FetchedMedia {
            path,
            title: config::mirror::TITLE.to_string(),
        })
    }
}
