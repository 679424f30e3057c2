//! Routing of inbound messages to the dispensing workflows.

use stockpin_channel::telegram::api::Message;
use stockpin_channel::{Channel, ChannelResult, ChatId, DocumentRef, UserId};
use stockpin_dispense::{Dispenser, FulfillOutcome, Reply};
use stockpin_ledger::LedgerStore;

/// Who sent an inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub first_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundKind {
    Text(String),
    Document(DocumentRef),
}

/// A message addressed to the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inbound {
    pub chat: ChatId,
    pub sender: Option<Sender>,
    pub kind: InboundKind,
}

impl Inbound {
    /// Convert a Bot API message. Messages with neither text nor a document
    /// are dropped.
    pub fn from_message(message: Message) -> Option<Self> {
        let kind = match (message.document, message.text) {
            (Some(document), _) => InboundKind::Document(document.into()),
            (None, Some(text)) => InboundKind::Text(text),
            (None, None) => return None,
        };
        Some(Self {
            chat: message.chat.id,
            sender: message.from.map(|u| Sender {
                id: u.id,
                first_name: u.first_name,
            }),
            kind,
        })
    }
}

/// What to do with an inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Greet { first_name: String },
    Upload { sender: UserId, document: DocumentRef },
    Request { text: String },
    Ignore,
}

pub fn route(inbound: &Inbound) -> Route {
    match &inbound.kind {
        InboundKind::Text(text) => match command_name(text) {
            Some("start") => Route::Greet {
                first_name: inbound
                    .sender
                    .as_ref()
                    .map(|s| s.first_name.clone())
                    .unwrap_or_else(|| "there".into()),
            },
            Some(_) => Route::Ignore,
            None => Route::Request { text: text.clone() },
        },
        InboundKind::Document(document) if document.is_plain_text() => match &inbound.sender {
            Some(sender) => Route::Upload {
                sender: sender.id,
                document: document.clone(),
            },
            None => Route::Ignore,
        },
        InboundKind::Document(_) => Route::Ignore,
    }
}

/// `"/start@my_bot arg"` -> `Some("start")`; non-commands -> `None`.
fn command_name(text: &str) -> Option<&str> {
    let command = text.trim_start().strip_prefix('/')?;
    let word = command.split_whitespace().next().unwrap_or("");
    Some(word.split('@').next().unwrap_or(word))
}

/// Handles one inbound message at a time: routes it, runs the workflow, and
/// sends the reply.
pub struct Handler<C, L> {
    channel: C,
    dispenser: Dispenser<L>,
}

impl<C: Channel, L: LedgerStore> Handler<C, L> {
    pub fn new(channel: C, dispenser: Dispenser<L>) -> Self {
        Self { channel, dispenser }
    }

    /// Errors are failures to reply; workflow failures are already turned
    /// into replies.
    pub async fn handle(&self, inbound: Inbound) -> ChannelResult<()> {
        let chat = inbound.chat;
        match route(&inbound) {
            Route::Greet { first_name } => self.reply(chat, Reply::Greeting { first_name }).await,
            Route::Request { text } => self.request(chat, &text).await,
            Route::Upload { sender, document } => self.upload(chat, sender, &document).await,
            Route::Ignore => {
                tracing::debug!(%chat, "ignoring message");
                Ok(())
            }
        }
    }

    async fn reply(&self, chat: ChatId, reply: Reply) -> ChannelResult<()> {
        self.channel.send_text(chat, &reply.to_string()).await?;
        Ok(())
    }

    async fn request(&self, chat: ChatId, text: &str) -> ChannelResult<()> {
        match self.dispenser.request(text).await {
            Err(invalid) => self.reply(chat, invalid.into()).await,
            Ok(FulfillOutcome::Delivered(delivery)) => {
                let count = delivery.count();
                // The records are already gone from the ledger; losing this
                // send loses them.
                if let Err(e) = self.channel.send_document(chat, delivery.into_document()).await {
                    tracing::error!(error = %e, %chat, count, "committed order could not be delivered");
                    return Err(e);
                }
                Ok(())
            }
            Ok(outcome) => match outcome.reply() {
                Some(reply) => self.reply(chat, reply).await,
                None => Ok(()),
            },
        }
    }

    async fn upload(
        &self,
        chat: ChatId,
        sender: UserId,
        document: &DocumentRef,
    ) -> ChannelResult<()> {
        // Checked before downloading so strangers cost nothing.
        if !self.dispenser.is_admin(sender) {
            tracing::warn!(%sender, "upload from non-administrator");
            return self.reply(chat, Reply::Unauthorized).await;
        }

        let content = match self.channel.download(document).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(error = %e, file_id = %document.file_id, "upload download failed");
                return self.reply(chat, Reply::DownloadFailed).await;
            }
        };

        let batch = match self.dispenser.prepare_restock(sender, &content) {
            Ok(batch) => batch,
            Err(rejection) => return self.reply(chat, rejection.into()).await,
        };

        let progress = match self.channel.send_text(chat, &Reply::Syncing.to_string()).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "could not post progress message");
                None
            }
        };

        let result = self.dispenser.apply_restock(batch).await.reply().to_string();
        match progress {
            Some(message) => self.channel.edit_text(chat, message, &result).await,
            None => self.channel.send_text(chat, &result).await.map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpin_channel::{ChannelCall, FailPoint, InMemoryChannel};
    use stockpin_ledger::{ChannelLedger, LedgerConfig};

    const LEDGER: ChatId = ChatId(-100_555);
    const USER_CHAT: ChatId = ChatId(900);
    const ADMIN: UserId = UserId(1);
    const STRANGER: UserId = UserId(2);

    type TestHandler = Handler<InMemoryChannel, ChannelLedger<InMemoryChannel>>;

    fn handler(channel: &InMemoryChannel) -> TestHandler {
        let ledger = ChannelLedger::new(channel.clone(), LedgerConfig::new(LEDGER));
        Handler::new(channel.clone(), Dispenser::new(ledger, ADMIN))
    }

    fn text(from: UserId, body: &str) -> Inbound {
        Inbound {
            chat: USER_CHAT,
            sender: Some(Sender {
                id: from,
                first_name: "Ada".into(),
            }),
            kind: InboundKind::Text(body.into()),
        }
    }

    fn upload(channel: &InMemoryChannel, from: UserId, content: &'static str) -> Inbound {
        Inbound {
            chat: USER_CHAT,
            sender: Some(Sender {
                id: from,
                first_name: "Ada".into(),
            }),
            kind: InboundKind::Document(channel.upload("new.txt", content)),
        }
    }

    fn replies(channel: &InMemoryChannel) -> Vec<String> {
        channel
            .messages(USER_CHAT)
            .into_iter()
            .filter_map(|m| m.text)
            .collect()
    }

    #[test]
    fn routes() {
        let greet = route(&text(ADMIN, "/start"));
        assert_eq!(
            greet,
            Route::Greet {
                first_name: "Ada".into()
            }
        );
        assert!(matches!(route(&text(ADMIN, "/start@stock_bot hi")), Route::Greet { .. }));
        assert_eq!(route(&text(ADMIN, "/help")), Route::Ignore);
        assert_eq!(
            route(&text(ADMIN, "12")),
            Route::Request { text: "12".into() }
        );
        assert_eq!(
            route(&text(ADMIN, "hello")),
            Route::Request {
                text: "hello".into()
            }
        );
    }

    #[test]
    fn only_plain_text_documents_are_uploads() {
        let channel = InMemoryChannel::new();
        let mut inbound = upload(&channel, ADMIN, "x");
        assert!(matches!(route(&inbound), Route::Upload { .. }));

        if let InboundKind::Document(doc) = &mut inbound.kind {
            doc.mime_type = Some("application/pdf".into());
        }
        assert_eq!(route(&inbound), Route::Ignore);
    }

    #[test]
    fn anonymous_upload_is_ignored() {
        let channel = InMemoryChannel::new();
        let mut inbound = upload(&channel, ADMIN, "x");
        inbound.sender = None;
        assert_eq!(route(&inbound), Route::Ignore);
    }

    #[tokio::test]
    async fn greet_replies_with_help() {
        let channel = InMemoryChannel::new();
        handler(&channel).handle(text(STRANGER, "/start")).await.unwrap();
        let replies = replies(&channel);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("Hello Ada!"));
        assert!(channel.calls().iter().all(|c| !c.touches_store()));
    }

    #[tokio::test]
    async fn request_delivers_file() {
        let channel = InMemoryChannel::new();
        channel.seed_pinned_document(LEDGER, "database.txt", "a\nb\nc");

        handler(&channel).handle(text(STRANGER, "2")).await.unwrap();

        let sent = channel.messages(USER_CHAT);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].caption.as_deref(), Some("✅ Here are your 2 records."));
        let content = channel.document_content(USER_CHAT, sent[0].message_id).unwrap();
        assert_eq!(content.as_ref(), b"a\nb");
        assert_eq!(channel.pinned_text(LEDGER).as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn invalid_requests_reply_without_store_access() {
        let channel = InMemoryChannel::new();
        let handler = handler(&channel);
        for body in ["0", "-5", "abc"] {
            handler.handle(text(STRANGER, body)).await.unwrap();
        }
        assert_eq!(
            replies(&channel),
            vec![
                "Number must be greater than 0.",
                "Please enter a valid number.",
                "Please enter a valid number."
            ]
        );
        assert!(channel.calls().iter().all(|c| !c.touches_store()));
    }

    #[tokio::test]
    async fn low_stock_reply() {
        let channel = InMemoryChannel::new();
        channel.seed_pinned_document(LEDGER, "database.txt", "a");
        handler(&channel).handle(text(STRANGER, "5")).await.unwrap();
        assert_eq!(replies(&channel), vec!["⚠️ Low Stock. Only 1 available."]);
    }

    #[tokio::test]
    async fn admin_upload_restocks_with_progress_message() {
        let channel = InMemoryChannel::new();
        channel.seed_pinned_document(LEDGER, "database.txt", "a");
        let inbound = upload(&channel, ADMIN, "b\nc\n");

        handler(&channel).handle(inbound).await.unwrap();

        assert_eq!(channel.pinned_text(LEDGER).as_deref(), Some("a\nb\nc"));
        // The progress message is edited in place into the result.
        assert_eq!(
            replies(&channel),
            vec!["✅ Success! Added 2 records.\nTotal Stock: 3"]
        );
        assert!(channel
            .calls()
            .iter()
            .any(|c| matches!(c, ChannelCall::EditText { .. })));
    }

    #[tokio::test]
    async fn stranger_upload_is_not_downloaded() {
        let channel = InMemoryChannel::new();
        channel.seed_pinned_document(LEDGER, "database.txt", "a");
        let inbound = upload(&channel, STRANGER, "evil");

        handler(&channel).handle(inbound).await.unwrap();

        assert_eq!(replies(&channel), vec!["⛔ Authorization Failed."]);
        assert!(channel.calls().iter().all(|c| !c.touches_store()));
        assert_eq!(channel.pinned_text(LEDGER).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn empty_upload_is_reported() {
        let channel = InMemoryChannel::new();
        let inbound = upload(&channel, ADMIN, "\n  \n");
        handler(&channel).handle(inbound).await.unwrap();
        assert_eq!(replies(&channel), vec!["⚠️ File appears empty."]);
        assert!(channel.pinned(LEDGER).is_none());
    }

    #[tokio::test]
    async fn failed_upload_download_is_reported() {
        let channel = InMemoryChannel::new();
        let inbound = upload(&channel, ADMIN, "x");
        channel.fail_next(FailPoint::Download);

        handler(&channel).handle(inbound).await.unwrap();
        assert_eq!(
            replies(&channel),
            vec!["❌ Could not download your file. Please try again."]
        );
        assert!(channel.pinned(LEDGER).is_none());
    }

    #[tokio::test]
    async fn restock_result_is_sent_when_progress_fails() {
        let channel = InMemoryChannel::new();
        let inbound = upload(&channel, ADMIN, "x");
        channel.fail_next(FailPoint::SendText);

        handler(&channel).handle(inbound).await.unwrap();
        assert_eq!(
            replies(&channel),
            vec!["✅ Success! Added 1 records.\nTotal Stock: 1"]
        );
    }

    #[tokio::test]
    async fn failed_commit_reports_system_error() {
        let channel = InMemoryChannel::new();
        channel.seed_pinned_document(LEDGER, "database.txt", "a\nb");
        channel.fail_next(FailPoint::PinMessage);

        handler(&channel).handle(text(STRANGER, "1")).await.unwrap();
        assert_eq!(
            replies(&channel),
            vec!["❌ System Error: Could not update database."]
        );
        assert_eq!(channel.pinned_text(LEDGER).as_deref(), Some("a\nb"));
    }
}
