//! Clipferry - Telegram bot that relays clips from social media platforms
//!
//! Send it a link and it downloads the media with yt-dlp (falling back to a
//! mirror API for TikTok) and uploads the file back to the chat.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and small utilities
//! - `download`: Download facade, sources and scratch directories
//! - `telegram`: Telegram bot integration and handlers
//! - `cli`: Command-line interface

pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use download::{DownloadError, DownloadRequest, DownloadedMedia, MediaDownloader};
pub use telegram::{handle_download_message, schema, HandlerDeps};
