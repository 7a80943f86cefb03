//! Minimal Telegram Bot API client.
//!
//! Plain HTTPS JSON calls plus multipart uploads for media delivery; no
//! webhook support, the bot long-polls `getUpdates`.

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

use cadenza_core::error::{CadenzaError, Result};

use crate::api::{ApiResponse, InlineKeyboardMarkup, Message, Update};

const API_BASE: &str = "https://api.telegram.org";

/// A client bound to one bot token.
pub struct TelegramClient {
    http: Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self::with_base(API_BASE, token)
    }

    /// Points the client at a different API host (local Bot API server,
    /// tests).
    pub fn with_base(base: &str, token: &str) -> Self {
        Self {
            http: Client::new(),
            base: format!("{base}/bot{token}"),
        }
    }

    /// Long-polls for updates with ids at or above `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        #[derive(Serialize)]
        struct GetUpdates {
            offset: i64,
            timeout: u64,
        }
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: timeout_secs,
            },
        )
        .await
    }

    /// Sends a text message, optionally with a parse mode and an inline
    /// keyboard.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<Message> {
        #[derive(Serialize)]
        struct SendMessage<'a> {
            chat_id: i64,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            parse_mode: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            reply_markup: Option<InlineKeyboardMarkup>,
        }
        self.call(
            "sendMessage",
            &SendMessage {
                chat_id,
                text,
                parse_mode,
                reply_markup,
            },
        )
        .await
    }

    /// Uploads a file as a plain document (used for audio downloads).
    pub async fn send_document(&self, chat_id: i64, path: &Path) -> Result<Message> {
        self.send_file("sendDocument", "document", chat_id, path).await
    }

    /// Uploads a file as a streamable video.
    pub async fn send_video(&self, chat_id: i64, path: &Path) -> Result<Message> {
        self.send_file("sendVideo", "video", chat_id, path).await
    }

    /// Acknowledges a callback query so the client stops its progress
    /// indicator.
    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<bool> {
        #[derive(Serialize)]
        struct Answer<'a> {
            callback_query_id: &'a str,
        }
        self.call(
            "answerCallbackQuery",
            &Answer {
                callback_query_id: callback_id,
            },
        )
        .await
    }

    async fn call<T, R>(&self, method: &str, payload: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(method, "telegram api call");
        let response = self
            .http
            .post(format!("{}/{method}", self.base))
            .json(payload)
            .send()
            .await
            .map_err(|err| CadenzaError::transport(format!("{method} request failed: {err}")))?;
        Self::unwrap_response(method, response).await
    }

    async fn send_file(
        &self,
        method: &str,
        field: &'static str,
        chat_id: i64,
        path: &Path,
    ) -> Result<Message> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            CadenzaError::transport(format!("cannot read {}: {err}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part(field, Part::bytes(bytes).file_name(file_name));

        debug!(method, path = %path.display(), "telegram file upload");
        let response = self
            .http
            .post(format!("{}/{method}", self.base))
            .multipart(form)
            .send()
            .await
            .map_err(|err| CadenzaError::transport(format!("{method} upload failed: {err}")))?;
        Self::unwrap_response(method, response).await
    }

    async fn unwrap_response<R: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<R> {
        let envelope: ApiResponse<R> = response
            .json()
            .await
            .map_err(|err| CadenzaError::transport(format!("{method} response unreadable: {err}")))?;
        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "no description".to_string());
            return Err(CadenzaError::transport(format!(
                "{method} rejected: {description}"
            )));
        }
        envelope
            .result
            .ok_or_else(|| CadenzaError::transport(format!("{method} returned an empty result")))
    }
}
