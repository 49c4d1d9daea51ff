//! Outbound chat operations used by the download flow.
//!
//! The flow talks to `ChatReplier` instead of `Bot` directly so it can run
//! against a recording implementation in tests.

use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};

use crate::core::error::AppResult;
use crate::telegram::Bot;

#[async_trait]
pub trait ChatReplier: Send + Sync {
    /// Sends a text message and returns its id.
    async fn send_text(&self, text: &str) -> AppResult<MessageId>;

    async fn edit_text(&self, message_id: MessageId, text: &str) -> AppResult<()>;

    async fn delete(&self, message_id: MessageId) -> AppResult<()>;

    async fn send_video(&self, path: &Path, file_name: &str, caption: &str) -> AppResult<()>;

    async fn send_audio(&self, path: &Path, file_name: &str, title: &str) -> AppResult<()>;
}

/// `ChatReplier` for one Telegram chat.
#[derive(Clone)]
pub struct TelegramReplier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramReplier {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ChatReplier for TelegramReplier {
    async fn send_text(&self, text: &str) -> AppResult<MessageId> {
        let message = self.bot.send_message(self.chat_id, text).await?;
        Ok(message.id)
    }

    async fn edit_text(&self, message_id: MessageId, text: &str) -> AppResult<()> {
        self.bot.edit_message_text(self.chat_id, message_id, text).await?;
        Ok(())
    }

    async fn delete(&self, message_id: MessageId) -> AppResult<()> {
        self.bot.delete_message(self.chat_id, message_id).await?;
        Ok(())
    }

    async fn send_video(&self, path: &Path, file_name: &str, caption: &str) -> AppResult<()> {
        let input_file = InputFile::file(path.to_path_buf()).file_name(file_name.to_string());
        self.bot
            .send_video(self.chat_id, input_file)
            .caption(caption)
            .supports_streaming(true)
            .await?;
        Ok(())
    }

    async fn send_audio(&self, path: &Path, file_name: &str, title: &str) -> AppResult<()> {
        let input_file = InputFile::file(path.to_path_buf()).file_name(file_name.to_string());
        self.bot.send_audio(self.chat_id, input_file).title(title).await?;
        Ok(())
    }
}
