use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;

use clipferry::cli::{Cli, Commands};
use clipferry::core::{config, init_logger, log_download_configuration};
use clipferry::download::{DownloadRequest, MediaDownloader};
use clipferry::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, missing token, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present, before any config is read
    let _ = dotenv();

    // Log panics instead of losing them in a spawned task
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) => run_bot().await,
        Some(Commands::Download { url, audio, output }) => run_cli_download(url, audio, output).await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

/// Starts the bot with long polling until Ctrl+C.
async fn run_bot() -> Result<()> {
    let token = config::bot_token().ok_or_else(|| anyhow::anyhow!("BOT_TOKEN (or TELOXIDE_TOKEN) is not set"))?;

    log::info!("Starting bot...");
    log_download_configuration();

    let bot = create_bot(&token)?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let downloader = Arc::new(MediaDownloader::from_config()?);
    let handler = schema(HandlerDeps::new(downloader));

    log::info!("Bot is running, waiting for messages");

    Dispatcher::builder(bot, handler)
        .error_handler(LoggingErrorHandler::with_custom_text("An error has occurred in the dispatcher"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Downloads a single link into a local directory.
async fn run_cli_download(url: String, audio: bool, output: Option<PathBuf>) -> Result<()> {
    println!("🎬 Clipferry CLI Download");
    println!("=========================");
    println!("URL: {}", url);
    println!("Mode: {}", if audio { "audio" } else { "video" });

    let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
    let downloader = MediaDownloader::from_config()?;

    if !downloader.is_supported(&url) {
        return Err(anyhow::anyhow!("Unsupported link: {}", url));
    }

    let media = downloader.download(&DownloadRequest::new(url, audio)).await?;

    let target = output_dir.join(media.file_name());
    let copied = async {
        fs_err::tokio::create_dir_all(&output_dir).await?;
        fs_err::tokio::copy(&media.path, &target).await
    }
    .await;
    let source = media.source.clone();
    let title = media.title.clone();
    media.cleanup();
    let bytes = copied?;

    println!();
    println!("✅ Downloaded via {}", source);
    println!("Title: {}", title);
    println!("File: {} ({} bytes)", target.display(), bytes);
    Ok(())
}
