//! Command handler implementations (/start, /help)

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::HandlerError;
use crate::telegram::bot::HELP_TEXT;
use crate::telegram::Bot;

/// Handle /start and /help: reply with the static help text
pub(super) async fn handle_help_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, HELP_TEXT).await?;
    Ok(())
}
