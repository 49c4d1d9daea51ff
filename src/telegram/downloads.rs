//! Per-message download flow: parse, download, check size, upload, clean up.

use std::sync::Arc;

use teloxide::types::MessageId;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::utils::{truncate_chars, whole_megabytes};
use crate::download::{DownloadError, DownloadRequest, DownloadedMedia, MediaDownloader};
use crate::telegram::replier::ChatReplier;
use crate::telegram::request::parse_request;

pub const DOWNLOADING_TEXT: &str = "⏳ Downloading...";
pub const UNSUPPORTED_TEXT: &str = "❌ This link is not supported yet";

/// Handles one text message from start to finish.
///
/// Input problems are answered with a plain reply. Once the status message is
/// posted, every outcome is reported by editing it. The scratch directory is
/// removed on every path after the download returns.
pub async fn handle_download_message<R>(replier: &R, downloader: Arc<MediaDownloader>, text: &str) -> AppResult<()>
where
    R: ChatReplier + ?Sized,
{
    let request = match parse_request(text) {
        Ok(request) => request,
        Err(e) => {
            log::info!("Rejected message: {:?}", e);
            replier.send_text(&e.to_string()).await?;
            return Ok(());
        }
    };

    if !downloader.is_supported(&request.url) {
        log::info!("Unsupported link: {}", request.url);
        replier.send_text(UNSUPPORTED_TEXT).await?;
        return Ok(());
    }

    let status = replier.send_text(DOWNLOADING_TEXT).await?;

    let media = match run_download(downloader, request.clone()).await {
        Ok(media) => media,
        Err(e) => {
            log::error!("Download failed for {} [{}]: {}", request.url, e.subcategory(), e);
            replier.edit_text(status, &download_failure_text(&e)).await?;
            return Ok(());
        }
    };

    log::info!(
        "Downloaded {} via {} into {}",
        request.url,
        media.source,
        media.scratch_dir().display()
    );

    let delivery = deliver(replier, status, &media, request.audio_only).await;
    media.cleanup();

    if let Err(e) = delivery {
        log::error!("Failed to deliver {}: {}", request.url, e);
        replier.edit_text(status, &error_text(&e)).await?;
    }

    Ok(())
}

/// Runs the facade on its own task so the dispatcher keeps serving other chats.
async fn run_download(downloader: Arc<MediaDownloader>, request: DownloadRequest) -> Result<DownloadedMedia, DownloadError> {
    tokio::spawn(async move { downloader.download(&request).await }).await?
}

/// Uploads the file, or reports it as too large without uploading.
async fn deliver<R>(replier: &R, status: MessageId, media: &DownloadedMedia, audio_only: bool) -> AppResult<()>
where
    R: ChatReplier + ?Sized,
{
    let size = media.file_size()?;
    if size > config::telegram::UPLOAD_LIMIT_BYTES {
        log::warn!("{} is {} bytes, over the upload limit", media.path.display(), size);
        replier.edit_text(status, &oversize_text(size)).await?;
        return Ok(());
    }

    let file_name = media.file_name();
    if audio_only {
        let title = truncate_chars(&media.title, config::telegram::AUDIO_TITLE_LIMIT);
        replier.send_audio(&media.path, &file_name, &title).await?;
    } else {
        let caption = truncate_chars(&media.title, config::telegram::VIDEO_CAPTION_LIMIT);
        replier.send_video(&media.path, &file_name, &caption).await?;
    }

    replier.delete(status).await?;
    Ok(())
}

pub fn oversize_text(size: u64) -> String {
    format!(
        "❌ The file is too large ({}MB) - the limit is {}MB",
        whole_megabytes(size),
        whole_megabytes(config::telegram::UPLOAD_LIMIT_BYTES)
    )
}

pub fn download_failure_text(err: &DownloadError) -> String {
    format!(
        "❌ Download failed: {}",
        truncate_chars(&err.to_string(), config::telegram::ERROR_TEXT_LIMIT)
    )
}

pub fn error_text(err: &AppError) -> String {
    format!(
        "❌ Something went wrong: {}",
        truncate_chars(&err.to_string(), config::telegram::ERROR_TEXT_LIMIT)
    )
}
