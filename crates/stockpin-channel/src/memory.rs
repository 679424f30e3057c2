//! In-memory channel for tests.
//!
//! [`InMemoryChannel`] keeps every chat's message history, pin slot and file
//! contents in a `Mutex`-protected state shared by all clones. Every call is
//! recorded as a [`ChannelCall`], and any operation can be made to fail once
//! through [`InMemoryChannel::fail_next`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{ChannelError, ChannelResult};
use crate::traits::Channel;
use crate::types::{ChatId, DocumentRef, MessageId, OutgoingDocument, PinnedMessage};

/// Recorded channel call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelCall {
    PinnedMessage { chat: ChatId },
    Download { file_id: String },
    SendDocument { chat: ChatId, file_name: String },
    PinMessage { chat: ChatId, message: MessageId },
    SendText { chat: ChatId, text: String },
    EditText { chat: ChatId, message: MessageId, text: String },
}

impl ChannelCall {
    /// Whether this call reads or writes the pin slot or its documents.
    pub fn touches_store(&self) -> bool {
        matches!(
            self,
            ChannelCall::PinnedMessage { .. }
                | ChannelCall::Download { .. }
                | ChannelCall::SendDocument { .. }
                | ChannelCall::PinMessage { .. }
        )
    }
}

/// Operation that can be made to fail once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailPoint {
    PinnedMessage,
    Download,
    SendDocument,
    PinMessage,
    SendText,
    EditText,
}

/// A message held by the in-memory channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredMessage {
    pub message_id: MessageId,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub document: Option<DocumentRef>,
}

#[derive(Default)]
struct ChannelState {
    last_message_id: i64,
    last_file_id: u64,
    messages: BTreeMap<ChatId, Vec<StoredMessage>>,
    pins: HashMap<ChatId, MessageId>,
    files: HashMap<String, Bytes>,
    failures: HashSet<FailPoint>,
    calls: Vec<ChannelCall>,
}

impl ChannelState {
    fn next_message_id(&mut self) -> MessageId {
        self.last_message_id += 1;
        MessageId(self.last_message_id)
    }

    fn store_file(&mut self, file_name: &str, content: Bytes) -> DocumentRef {
        self.last_file_id += 1;
        let file_id = format!("file-{}", self.last_file_id);
        let file_size = content.len() as u64;
        self.files.insert(file_id.clone(), content);
        DocumentRef {
            file_id,
            file_name: Some(file_name.to_string()),
            mime_type: Some("text/plain".into()),
            file_size: Some(file_size),
        }
    }

    fn push_message(&mut self, chat: ChatId, mut message: StoredMessage) -> MessageId {
        let id = self.next_message_id();
        message.message_id = id;
        self.messages.entry(chat).or_default().push(message);
        id
    }

    fn find_message(&mut self, chat: ChatId, message: MessageId) -> Option<&mut StoredMessage> {
        self.messages
            .get_mut(&chat)?
            .iter_mut()
            .find(|m| m.message_id == message)
    }

    fn check(&mut self, point: FailPoint) -> ChannelResult<()> {
        if self.failures.remove(&point) {
            return Err(ChannelError::Injected(format!("{point:?}")));
        }
        Ok(())
    }
}

/// An in-memory implementation of [`Channel`].
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect another.
#[derive(Clone, Default)]
pub struct InMemoryChannel {
    state: Arc<Mutex<ChannelState>>,
}

impl InMemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the next call of `point` fail with [`ChannelError::Injected`].
    pub fn fail_next(&self, point: FailPoint) {
        self.lock().failures.insert(point);
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<ChannelCall> {
        self.lock().calls.clone()
    }

    /// Message history of `chat`, oldest first.
    pub fn messages(&self, chat: ChatId) -> Vec<StoredMessage> {
        self.lock().messages.get(&chat).cloned().unwrap_or_default()
    }

    /// Id of the message currently pinned in `chat`.
    pub fn pinned(&self, chat: ChatId) -> Option<MessageId> {
        self.lock().pins.get(&chat).copied()
    }

    /// Raw content of the document attached to `message`, if any.
    pub fn document_content(&self, chat: ChatId, message: MessageId) -> Option<Bytes> {
        let mut state = self.lock();
        let file_id = state.find_message(chat, message)?.document.clone()?.file_id;
        state.files.get(&file_id).cloned()
    }

    /// Content of the currently pinned document of `chat`, lossily decoded.
    pub fn pinned_text(&self, chat: ChatId) -> Option<String> {
        let message = self.pinned(chat)?;
        let content = self.document_content(chat, message)?;
        Some(String::from_utf8_lossy(&content).into_owned())
    }

    /// Register a file as if a user had uploaded it, without posting it anywhere.
    pub fn upload(&self, file_name: &str, content: impl Into<Bytes>) -> DocumentRef {
        self.lock().store_file(file_name, content.into())
    }

    /// Post a document to `chat` and pin it, bypassing call recording.
    pub fn seed_pinned_document(
        &self,
        chat: ChatId,
        file_name: &str,
        content: impl Into<Bytes>,
    ) -> MessageId {
        let mut state = self.lock();
        let document = state.store_file(file_name, content.into());
        let id = state.push_message(
            chat,
            StoredMessage {
                message_id: MessageId(0),
                text: None,
                caption: None,
                document: Some(document),
            },
        );
        state.pins.insert(chat, id);
        id
    }

    /// Post a text message to `chat` and pin it, bypassing call recording.
    pub fn seed_pinned_text(&self, chat: ChatId, text: &str) -> MessageId {
        let mut state = self.lock();
        let id = state.push_message(
            chat,
            StoredMessage {
                message_id: MessageId(0),
                text: Some(text.to_string()),
                caption: None,
                document: None,
            },
        );
        state.pins.insert(chat, id);
        id
    }
}

#[async_trait]
impl Channel for InMemoryChannel {
    async fn pinned_message(&self, chat: ChatId) -> ChannelResult<Option<PinnedMessage>> {
        let mut state = self.lock();
        state.calls.push(ChannelCall::PinnedMessage { chat });
        state.check(FailPoint::PinnedMessage)?;

        let Some(message_id) = state.pins.get(&chat).copied() else {
            return Ok(None);
        };
        let document = state
            .find_message(chat, message_id)
            .ok_or(ChannelError::MessageNotFound {
                chat,
                message: message_id,
            })?
            .document
            .clone();
        Ok(Some(PinnedMessage {
            message_id,
            document,
        }))
    }

    async fn download(&self, document: &DocumentRef) -> ChannelResult<Bytes> {
        let mut state = self.lock();
        state.calls.push(ChannelCall::Download {
            file_id: document.file_id.clone(),
        });
        state.check(FailPoint::Download)?;
        state
            .files
            .get(&document.file_id)
            .cloned()
            .ok_or_else(|| ChannelError::FileNotFound(document.file_id.clone()))
    }

    async fn send_document(
        &self,
        chat: ChatId,
        document: OutgoingDocument,
    ) -> ChannelResult<MessageId> {
        let mut state = self.lock();
        state.calls.push(ChannelCall::SendDocument {
            chat,
            file_name: document.file_name.clone(),
        });
        state.check(FailPoint::SendDocument)?;
        // Same rule as the Bot API.
        if document.content.is_empty() {
            return Err(ChannelError::Api {
                code: 400,
                description: "Bad Request: file must be non-empty".into(),
            });
        }

        let stored = state.store_file(&document.file_name, document.content);
        Ok(state.push_message(
            chat,
            StoredMessage {
                message_id: MessageId(0),
                text: None,
                caption: document.caption,
                document: Some(stored),
            },
        ))
    }

    async fn pin_message(&self, chat: ChatId, message: MessageId) -> ChannelResult<()> {
        let mut state = self.lock();
        state.calls.push(ChannelCall::PinMessage { chat, message });
        state.check(FailPoint::PinMessage)?;

        if state.find_message(chat, message).is_none() {
            return Err(ChannelError::MessageNotFound { chat, message });
        }
        state.pins.insert(chat, message);
        Ok(())
    }

    async fn send_text(&self, chat: ChatId, text: &str) -> ChannelResult<MessageId> {
        let mut state = self.lock();
        state.calls.push(ChannelCall::SendText {
            chat,
            text: text.to_string(),
        });
        state.check(FailPoint::SendText)?;

        Ok(state.push_message(
            chat,
            StoredMessage {
                message_id: MessageId(0),
                text: Some(text.to_string()),
                caption: None,
                document: None,
            },
        ))
    }

    async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> ChannelResult<()> {
        let mut state = self.lock();
        state.calls.push(ChannelCall::EditText {
            chat,
            message,
            text: text.to_string(),
        });
        state.check(FailPoint::EditText)?;

        let stored = state
            .find_message(chat, message)
            .ok_or(ChannelError::MessageNotFound { chat, message })?;
        stored.text = Some(text.to_string());
        Ok(())
    }
}
