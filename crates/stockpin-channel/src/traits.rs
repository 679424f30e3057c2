//! The [`Channel`] trait: what stockpin needs from a messaging channel.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ChannelResult;
use crate::types::{ChatId, DocumentRef, MessageId, OutgoingDocument, PinnedMessage};

/// A messaging channel that can hold a pinned document.
///
/// Every call is a network round trip in production and a suspension point
/// for the caller. Implementations give no atomicity across calls: sending a
/// document and pinning it are two separate operations.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Read the message currently pinned in `chat`.
    ///
    /// Returns `Ok(None)` if nothing is pinned.
    async fn pinned_message(&self, chat: ChatId) -> ChannelResult<Option<PinnedMessage>>;

    /// Download the full content of a document into memory.
    async fn download(&self, document: &DocumentRef) -> ChannelResult<Bytes>;

    /// Send a document to `chat` and return the new message's id.
    async fn send_document(
        &self,
        chat: ChatId,
        document: OutgoingDocument,
    ) -> ChannelResult<MessageId>;

    /// Make `message` the pinned message of `chat`, replacing any previous pin.
    async fn pin_message(&self, chat: ChatId, message: MessageId) -> ChannelResult<()>;

    /// Send a text message and return its id.
    async fn send_text(&self, chat: ChatId, text: &str) -> ChannelResult<MessageId>;

    /// Replace the text of a message previously sent by this bot.
    async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> ChannelResult<()>;
}

#[async_trait]
impl<C: Channel + ?Sized> Channel for Arc<C> {
    async fn pinned_message(&self, chat: ChatId) -> ChannelResult<Option<PinnedMessage>> {
        (**self).pinned_message(chat).await
    }

    async fn download(&self, document: &DocumentRef) -> ChannelResult<Bytes> {
        (**self).download(document).await
    }

    async fn send_document(
        &self,
        chat: ChatId,
        document: OutgoingDocument,
    ) -> ChannelResult<MessageId> {
        (**self).send_document(chat, document).await
    }

    async fn pin_message(&self, chat: ChatId, message: MessageId) -> ChannelResult<()> {
        (**self).pin_message(chat, message).await
    }

    async fn send_text(&self, chat: ChatId, text: &str) -> ChannelResult<MessageId> {
        (**self).send_text(chat, text).await
    }

    async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> ChannelResult<()> {
        (**self).edit_text(chat, message, text).await
    }
}
