use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Identifier of a chat or channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Identifier of a message, unique within its chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Identifier of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file attached to a message, addressable for download.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
}

impl DocumentRef {
    /// Whether the sender declared the document as plain text.
    pub fn is_plain_text(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("text/plain"))
    }
}

/// The message currently pinned in a chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinnedMessage {
    pub message_id: MessageId,
    /// `None` when the pinned message carries no file.
    pub document: Option<DocumentRef>,
}

/// A document to upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingDocument {
    pub file_name: String,
    pub content: Bytes,
    pub caption: Option<String>,
}

impl OutgoingDocument {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_detection() {
        let mut doc = DocumentRef {
            file_id: "f".into(),
            file_name: Some("stock.txt".into()),
            mime_type: Some("text/plain".into()),
            file_size: None,
        };
        assert!(doc.is_plain_text());
        doc.mime_type = Some("Text/Plain".into());
        assert!(doc.is_plain_text());
        doc.mime_type = Some("application/pdf".into());
        assert!(!doc.is_plain_text());
        doc.mime_type = None;
        assert!(!doc.is_plain_text());
    }

    #[test]
    fn outgoing_document_builder() {
        let doc = OutgoingDocument::new("database.txt", b"a\nb".to_vec()).with_caption("2 left");
        assert_eq!(doc.file_name, "database.txt");
        assert_eq!(doc.content.as_ref(), b"a\nb");
        assert_eq!(doc.caption.as_deref(), Some("2 left"));
    }

    #[test]
    fn ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&ChatId(-1001)).unwrap(), "-1001");
        assert_eq!(MessageId(7).to_string(), "#7");
    }
}
