//! Telegram Bot API client.

pub mod api;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ChannelError, ChannelResult};
use crate::traits::Channel;
use crate::types::{ChatId, DocumentRef, MessageId, OutgoingDocument, PinnedMessage};

pub use api::{Update, User};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Grace period on top of the long-poll timeout before the HTTP request
/// itself is abandoned.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// [`Channel`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramChannel {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TelegramChannel {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_API_BASE)
    }

    /// Create a client against a non-default API server (e.g. a local Bot API server).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.base_url, self.token, file_path)
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> ChannelResult<R>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        tracing::debug!(method, "bot api call");
        let response = self
            .http
            .post(self.method_url(method))
            .json(params)
            .send()
            .await?;
        decode_response(method, response).await
    }

    /// Identify the bot behind the configured token.
    pub async fn get_me(&self) -> ChannelResult<User> {
        self.call("getMe", &api::NoParams {}).await
    }

    /// Long-poll for new message updates.
    ///
    /// `offset` should be one past the last update id already handled; the
    /// server then forgets everything before it.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> ChannelResult<Vec<Update>> {
        let params = api::GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: &["message"],
        };
        let response = self
            .http
            .post(self.method_url("getUpdates"))
            .timeout(timeout + POLL_GRACE)
            .json(&params)
            .send()
            .await?;
        decode_response("getUpdates", response).await
    }
}

async fn decode_response<R: DeserializeOwned>(
    method: &str,
    response: reqwest::Response,
) -> ChannelResult<R> {
    let status = response.status();
    let body = response.bytes().await?;
    // Error statuses still carry the JSON envelope with the API's description.
    match serde_json::from_slice::<api::ApiResponse<R>>(&body) {
        Ok(envelope) => envelope.into_result(),
        Err(e) if status.is_success() => Err(ChannelError::Decode(format!("{method}: {e}"))),
        Err(_) => Err(ChannelError::Transport(format!("{method}: http status {status}"))),
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    async fn pinned_message(&self, chat: ChatId) -> ChannelResult<Option<PinnedMessage>> {
        let chat: api::Chat = self.call("getChat", &api::GetChat { chat_id: chat }).await?;
        Ok(chat.pinned_message.map(|m| PinnedMessage::from(*m)))
    }

    async fn download(&self, document: &DocumentRef) -> ChannelResult<Bytes> {
        let file: api::File = self
            .call(
                "getFile",
                &api::GetFile {
                    file_id: &document.file_id,
                },
            )
            .await?;
        let path = file
            .file_path
            .ok_or_else(|| ChannelError::FileNotFound(file.file_id.clone()))?;

        let response = self.http.get(self.file_url(&path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Transport(format!("file download: http status {status}")));
        }
        let content = response.bytes().await?;
        tracing::debug!(file_id = %document.file_id, bytes = content.len(), "downloaded file");
        Ok(content)
    }

    async fn send_document(
        &self,
        chat: ChatId,
        document: OutgoingDocument,
    ) -> ChannelResult<MessageId> {
        let part = Part::bytes(document.content.to_vec())
            .file_name(document.file_name)
            .mime_str("text/plain")?;
        let mut form = Form::new()
            .text("chat_id", chat.0.to_string())
            .part("document", part);
        if let Some(caption) = document.caption {
            form = form.text("caption", caption);
        }

        let response = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let message: api::Message = decode_response("sendDocument", response).await?;
        Ok(message.message_id)
    }

    async fn pin_message(&self, chat: ChatId, message: MessageId) -> ChannelResult<()> {
        let _: bool = self
            .call(
                "pinChatMessage",
                &api::PinChatMessage {
                    chat_id: chat,
                    message_id: message,
                    disable_notification: true,
                },
            )
            .await?;
        Ok(())
    }

    async fn send_text(&self, chat: ChatId, text: &str) -> ChannelResult<MessageId> {
        let message: api::Message = self
            .call("sendMessage", &api::SendMessage { chat_id: chat, text })
            .await?;
        Ok(message.message_id)
    }

    async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> ChannelResult<()> {
        // Returns the edited Message, which is not needed here.
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &api::EditMessageText {
                    chat_id: chat,
                    message_id: message,
                    text,
                },
            )
            .await?;
        Ok(())
    }
}
