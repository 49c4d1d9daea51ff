//! Bot initialization and command definitions
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Help text

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config;
use crate::telegram::Bot;

/// Static help text for /start and /help
pub const HELP_TEXT: &str = "\
🎬 Social media clip downloader

📥 How to use:
- Send the link of a clip to download the video
- Write \"صوت\" before the link to get the audio only

📱 Supported platforms:
YouTube, TikTok, Instagram, X/Twitter, Facebook, Reddit, Pinterest, Twitch, \
Dailymotion, Vimeo, Rumble, Bilibili, Likee

Files larger than 49MB cannot be sent.";

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "show how to use the bot")]
    Start,
    #[command(description = "show how to use the bot")]
    Help,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Arguments
/// * `token` - Bot API token
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, client build failure)
pub fn create_bot(token: &str) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    // Check if local Bot API server is configured
    match config::BOT_API_URL.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(vec![
        BotCommand::new("start", "show how to use the bot"),
        BotCommand::new("help", "show how to use the bot"),
    ])
    .await?;

    Ok(())
}
