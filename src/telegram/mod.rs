//! Telegram bot integration and handlers

pub mod bot;
pub mod downloads;
pub mod handlers;
pub mod replier;
pub mod request;

/// Bot type used across the crate
pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command, HELP_TEXT};
pub use downloads::handle_download_message;
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use replier::{ChatReplier, TelegramReplier};
pub use request::{parse_request, RequestParseError};
