use thiserror::Error;

use crate::types::{ChatId, MessageId};

/// Errors from channel operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The Bot API answered with `ok: false`.
    #[error("telegram api error {code}: {description}")]
    Api { code: i64, description: String },

    /// The request never produced an API answer (connect, TLS, timeout, HTTP status).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    #[error("message {message} not found in chat {chat}")]
    MessageNotFound { chat: ChatId, message: MessageId },

    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Failure injected by [`crate::InMemoryChannel`].
    #[error("injected failure: {0}")]
    Injected(String),
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs embed the bot token.
        let err = err.without_url();
        if err.is_decode() {
            ChannelError::Decode(err.to_string())
        } else {
            ChannelError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChannelError {
    fn from(err: serde_json::Error) -> Self {
        ChannelError::Decode(err.to_string())
    }
}

pub type ChannelResult<T> = Result<T, ChannelError>;
