//! Rendering engine replies into Telegram API calls.

use async_trait::async_trait;

use cadenza_core::engine::{Button, Keyboard, Reply, TextMarkup};
use cadenza_core::error::Result;
use cadenza_core::session::MediaKind;
use cadenza_core::transport::{ChatId, ReplySink};

use crate::api::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::client::TelegramClient;

/// Builds the inline keyboard for a prompt, or `None` when it has no
/// buttons.
pub(crate) fn keyboard_markup(keyboard: &Keyboard) -> Option<InlineKeyboardMarkup> {
    if keyboard.is_empty() {
        return None;
    }
    Some(InlineKeyboardMarkup {
        inline_keyboard: keyboard
            .iter()
            .map(|row| row.iter().map(inline_button).collect())
            .collect(),
    })
}

fn inline_button(button: &Button) -> InlineKeyboardButton {
    InlineKeyboardButton {
        text: button.label.clone(),
        callback_data: button.token.clone(),
    }
}

#[async_trait]
impl ReplySink for TelegramClient {
    async fn deliver(&self, chat: ChatId, reply: &Reply) -> Result<()> {
        match reply {
            Reply::Prompt {
                text,
                markup,
                keyboard,
            } => {
                let parse_mode = match markup {
                    TextMarkup::Plain => None,
                    TextMarkup::Markdown => Some("Markdown"),
                };
                self.send_message(chat.0, text, parse_mode, keyboard_markup(keyboard))
                    .await?;
            }
            // Audio travels as a playable document, video as a clip.
            Reply::Media { path, kind } => {
                match kind {
                    MediaKind::Audio => self.send_document(chat.0, path).await?,
                    MediaKind::Video => self.send_video(chat.0, path).await?,
                };
            }
        }
        Ok(())
    }

    async fn ack(&self, callback_id: &str) -> Result<()> {
        self.answer_callback_query(callback_id).await?;
        Ok(())
    }
}
