//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::handle_help_command;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::downloads::handle_download_message;
use crate::telegram::replier::TelegramReplier;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched first; every other text message goes to the
/// download flow.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps))
}

/// Handler for /start and /help
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

            match cmd {
                Command::Start | Command::Help => handle_help_command(&bot, &msg).await?,
            }
            Ok(())
        },
    ))
}

/// Handler for links sent as plain text
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !text.starts_with('/')))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default().to_string();
                let replier = TelegramReplier::new(bot, msg.chat.id);

                // A failed message must never stop the dispatcher
                if let Err(e) = handle_download_message(&replier, deps.downloader.clone(), &text).await {
                    log::error!("❌ Download handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}
