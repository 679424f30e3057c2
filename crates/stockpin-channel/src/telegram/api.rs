//! Telegram Bot API wire types.
//!
//! Only the fields stockpin reads are modelled; everything else in a
//! response is ignored by `serde`.

use serde::{Deserialize, Serialize};

use crate::error::{ChannelError, ChannelResult};
use crate::types::{ChatId, DocumentRef, MessageId, PinnedMessage, UserId};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> ChannelResult<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(ChannelError::Decode("ok response without result".into())),
            (false, _) => Err(ChannelError::Api {
                code: self.error_code.unwrap_or_default(),
                description: self
                    .description
                    .unwrap_or_else(|| "no description".into()),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatRef {
    pub id: ChatId,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub pinned_message: Option<Box<Message>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
}

impl From<Document> for DocumentRef {
    fn from(doc: Document) -> Self {
        DocumentRef {
            file_id: doc.file_id,
            file_name: doc.file_name,
            mime_type: doc.mime_type,
            file_size: doc.file_size,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub chat: ChatRef,
    pub from: Option<User>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub document: Option<Document>,
}

impl From<Message> for PinnedMessage {
    fn from(message: Message) -> Self {
        PinnedMessage {
            message_id: message.message_id,
            document: message.document.map(DocumentRef::from),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

// ---- request parameters ----

#[derive(Debug, Serialize)]
pub struct GetChat {
    pub chat_id: ChatId,
}

#[derive(Debug, Serialize)]
pub struct GetFile<'a> {
    pub file_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PinChatMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub disable_notification: bool,
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: ChatId,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EditMessageText<'a> {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub struct NoParams {}
