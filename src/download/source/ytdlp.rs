//! YtDlpSource: the primary download backend, powered by yt-dlp.
//!
//! Builds the option set for a request (mode, retries, timeouts, TikTok
//! spoofing), runs the yt-dlp binary on a blocking worker, and picks the
//! produced file out of the scratch directory.

use std::path::Path;
use std::process::{Command, Stdio};

use async_trait::async_trait;

use crate::core::config;
use crate::core::utils::truncate_chars;
use crate::download::error::DownloadError;
use crate::download::scratch::first_media_file_in;
use crate::download::source::{url_mentions, DownloadRequest, DownloadSource, FetchedMedia};

/// Headers that make yt-dlp look like a desktop browser to TikTok
const TIKTOK_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    ),
    ("Referer", "https://www.tiktok.com/"),
    ("Accept", "*/*"),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Accept-Encoding", "gzip, deflate, br"),
];

/// Pinned TikTok app client pair
const TIKTOK_EXTRACTOR_ARGS: &str = "tiktok:app_version=20.9.3;manifest_app_version=209303";

const VIDEO_FORMAT: &str = "best[height<=1080]/best[height<=720]/best";
const TIKTOK_VIDEO_FORMAT: &str = "best[ext=mp4]/best[height<=1080]/best[height<=720]/best";
const AUDIO_FORMAT: &str = "bestaudio/best";

/// Title used when yt-dlp does not print one
const DEFAULT_TITLE: &str = "media";

/// Audio transcode requested from yt-dlp's ffmpeg post-processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTranscode {
    pub codec: &'static str,
    pub quality_kbps: u32,
}

/// Options passed to a single yt-dlp run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtDlpOptions {
    pub output_template: String,
    pub format: String,
    pub retries: u32,
    pub socket_timeout_secs: u64,
    pub audio_transcode: Option<AudioTranscode>,
    pub http_headers: Vec<(String, String)>,
    pub extractor_args: Option<String>,
}

impl YtDlpOptions {
    /// Builds the option set for `request`, writing into `scratch_dir`.
    pub fn for_request(request: &DownloadRequest, scratch_dir: &Path) -> Self {
        let is_tiktok = url_mentions(&request.url, config::platforms::TIKTOK);

        let output_template = scratch_dir
            .join(format!("%(title).{}s.%(ext)s", config::download::MAX_TITLE_CHARS))
            .to_string_lossy()
            .to_string();

        let (format, audio_transcode) = if request.audio_only {
            (
                AUDIO_FORMAT.to_string(),
                Some(AudioTranscode {
                    codec: config::download::AUDIO_CODEC,
                    quality_kbps: config::download::AUDIO_QUALITY_KBPS,
                }),
            )
        } else if is_tiktok {
            (TIKTOK_VIDEO_FORMAT.to_string(), None)
        } else {
            (VIDEO_FORMAT.to_string(), None)
        };

        let (http_headers, extractor_args) = if is_tiktok {
            (
                TIKTOK_HEADERS
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
                Some(TIKTOK_EXTRACTOR_ARGS.to_string()),
            )
        } else {
            (Vec::new(), None)
        };

        Self {
            output_template,
            format,
            retries: config::download::YTDLP_RETRIES,
            socket_timeout_secs: config::download::SOCKET_TIMEOUT_SECS,
            audio_transcode,
            http_headers,
            extractor_args,
        }
    }

    /// Renders the options as yt-dlp command-line arguments for `url`.
    pub fn to_args(&self, url: &str) -> Vec<String> {
        let retries = self.retries.to_string();
        let timeout = self.socket_timeout_secs.to_string();
        let mut args: Vec<String> = [
            "--quiet",
            "--no-warnings",
            "--no-progress",
            "--no-playlist",
            "--restrict-filenames",
            "--no-overwrites",
            "--socket-timeout",
            timeout.as_str(),
            "--retries",
            retries.as_str(),
            "--fragment-retries",
            retries.as_str(),
            "--extractor-retries",
            retries.as_str(),
            "-o",
            self.output_template.as_str(),
            "-f",
            self.format.as_str(),
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(transcode) = &self.audio_transcode {
            args.extend([
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                transcode.codec.to_string(),
                "--audio-quality".to_string(),
                format!("{}K", transcode.quality_kbps),
            ]);
        }

        for (name, value) in &self.http_headers {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }

        if let Some(extractor_args) = &self.extractor_args {
            args.push("--extractor-args".to_string());
            args.push(extractor_args.clone());
        }

        // Print the final title once the file is in place
        args.extend([
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:%(title)s".to_string(),
            "--".to_string(),
            url.to_string(),
        ]);

        args
    }
}

/// Download source powered by yt-dlp for extracting media from supported sites.
pub struct YtDlpSource {
    binary: String,
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpSource {
    /// Uses the binary configured through `YTDL_BIN`.
    pub fn new() -> Self {
        Self::with_binary(config::YTDL_BIN.as_str())
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

#[async_trait]
impl DownloadSource for YtDlpSource {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn supports_url(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }

    async fn fetch(&self, request: &DownloadRequest, scratch_dir: &Path) -> Result<FetchedMedia, DownloadError> {
        let args = YtDlpOptions::for_request(request, scratch_dir).to_args(&request.url);
        let binary = self.binary.clone();

        log::info!(
            "📥 yt-dlp {} download: {}",
            if request.audio_only { "audio" } else { "video" },
            request.url
        );

        let stdout = tokio::task::spawn_blocking(move || run_ytdlp(&binary, &args)).await??;

        let path = first_media_file_in(scratch_dir)?.ok_or(DownloadError::NoMediaProduced)?;
        let title = parse_title(&stdout);

        log::info!("✅ yt-dlp produced {}", path.display());

        Ok(FetchedMedia { path, title })
    }
}

/// Runs yt-dlp to completion and returns its stdout.
fn run_ytdlp(binary: &str, args: &[String]) -> Result<String, DownloadError> {
    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| DownloadError::Extraction(format!("Failed to spawn {}: {}", binary, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::error!("yt-dlp failed ({}): {}", output.status, stderr.trim());
        return Err(DownloadError::Extraction(summarize_stderr(&stderr, output.status.code())));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Picks the most useful line out of yt-dlp's stderr.
///
/// Prefers the last `ERROR:` line, then the last non-empty line.
fn summarize_stderr(stderr: &str, exit_code: Option<i32>) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| match exit_code {
            Some(code) => format!("yt-dlp exited with status {}", code),
            None => "yt-dlp was terminated by a signal".to_string(),
        })
}

/// Last non-empty stdout line, truncated to the title limit.
fn parse_title(stdout: &str) -> String {
    let title = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "NA")
        .last()
        .unwrap_or(DEFAULT_TITLE);

    truncate_chars(title, config::download::MAX_TITLE_CHARS)
}
