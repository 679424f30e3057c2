//! Long-polling event loop.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use stockpin_channel::telegram::Update;
use stockpin_channel::{Channel, ChannelResult, TelegramChannel};
use stockpin_ledger::LedgerStore;

use crate::dispatch::{Handler, Inbound};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Long-poll timeout passed to the server.
    pub timeout: Duration,
    /// Pause after a failed poll.
    pub retry_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Where updates come from.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Wait up to `timeout` for updates with id >= `offset`.
    async fn next_batch(&self, offset: Option<i64>, timeout: Duration)
        -> ChannelResult<Vec<Update>>;
}

#[async_trait]
impl UpdateSource for TelegramChannel {
    async fn next_batch(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> ChannelResult<Vec<Update>> {
        self.get_updates(offset, timeout).await
    }
}

/// Poll `source` and feed every message to `handler` until `shutdown`
/// resolves.
///
/// Updates are handled one at a time in arrival order. An update is
/// acknowledged (by advancing the offset) whether or not handling it
/// succeeded, so a message that cannot be answered is not retried forever.
pub async fn run<S, C, L, F>(
    source: &S,
    handler: &Handler<C, L>,
    config: &PollConfig,
    shutdown: F,
) where
    S: UpdateSource + ?Sized,
    C: Channel,
    L: LedgerStore,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut offset: Option<i64> = None;
    tracing::info!(timeout = ?config.timeout, "polling for updates");

    loop {
        let batch = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            batch = source.next_batch(offset, config.timeout) => batch,
        };

        let updates = match batch {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, retry_in = ?config.retry_delay, "poll failed");
                tokio::select! {
                    biased;
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(config.retry_delay) => continue,
                }
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            let Some(inbound) = update.message.and_then(Inbound::from_message) else {
                continue;
            };
            let chat = inbound.chat;
            if let Err(e) = handler.handle(inbound).await {
                tracing::error!(error = %e, %chat, update = update.update_id, "reply failed");
            }
        }
    }

    tracing::info!("polling stopped");
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use stockpin_channel::telegram::api::{ChatRef, Message, User};
    use stockpin_channel::{ChannelError, ChatId, InMemoryChannel, MessageId, UserId};
    use stockpin_dispense::Dispenser;
    use stockpin_ledger::{ChannelLedger, LedgerConfig};
    use tokio::sync::oneshot;

    use super::*;

    const LEDGER: ChatId = ChatId(-1001);
    const CHAT: ChatId = ChatId(77);

    /// Replays a fixed script of poll results, then asks the loop to stop.
    struct Scripted {
        script: Mutex<VecDeque<ChannelResult<Vec<Update>>>>,
        offsets: Mutex<Vec<Option<i64>>>,
        stop: Mutex<Option<oneshot::Sender<()>>>,
    }

    impl Scripted {
        fn new(script: Vec<ChannelResult<Vec<Update>>>) -> (Self, impl Future<Output = ()>) {
            let (tx, rx) = oneshot::channel();
            let source = Self {
                script: Mutex::new(script.into()),
                offsets: Mutex::new(Vec::new()),
                stop: Mutex::new(Some(tx)),
            };
            (source, async move {
                let _ = rx.await;
            })
        }

        fn offsets(&self) -> Vec<Option<i64>> {
            self.offsets.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpdateSource for Scripted {
        async fn next_batch(
            &self,
            offset: Option<i64>,
            _timeout: Duration,
        ) -> ChannelResult<Vec<Update>> {
            self.offsets.lock().unwrap().push(offset);
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => {
                    if let Some(stop) = self.stop.lock().unwrap().take() {
                        let _ = stop.send(());
                    }
                    Ok(Vec::new())
                }
            }
        }
    }

    fn text_update(update_id: i64, text: &str) -> Update {
        Update {
            update_id,
            message: Some(Message {
                message_id: MessageId(update_id),
                chat: ChatRef { id: CHAT },
                from: Some(User {
                    id: UserId(5),
                    is_bot: false,
                    first_name: "Lin".into(),
                    username: None,
                }),
                text: Some(text.into()),
                caption: None,
                document: None,
            }),
        }
    }

    fn handler(
        channel: &InMemoryChannel,
    ) -> Handler<InMemoryChannel, ChannelLedger<InMemoryChannel>> {
        let ledger = ChannelLedger::new(channel.clone(), LedgerConfig::new(LEDGER));
        Handler::new(channel.clone(), Dispenser::new(ledger, UserId(1)))
    }

    fn fast() -> PollConfig {
        PollConfig {
            timeout: Duration::from_secs(1),
            retry_delay: Duration::from_millis(1),
        }
    }

    fn replies(channel: &InMemoryChannel) -> Vec<String> {
        channel
            .messages(CHAT)
            .into_iter()
            .filter_map(|m| m.text)
            .collect()
    }

    #[tokio::test]
    async fn handles_updates_in_order_and_advances_offset() {
        let channel = InMemoryChannel::new();
        let (source, shutdown) = Scripted::new(vec![
            Ok(vec![text_update(10, "/start"), text_update(11, "0")]),
            Ok(vec![text_update(12, "abc")]),
        ]);

        run(&source, &handler(&channel), &fast(), shutdown).await;

        let replies = replies(&channel);
        assert_eq!(replies.len(), 3);
        assert!(replies[0].starts_with("Hello Lin!"));
        assert_eq!(replies[1], "Number must be greater than 0.");
        assert_eq!(replies[2], "Please enter a valid number.");
        assert_eq!(source.offsets(), vec![None, Some(12), Some(13)]);
    }

    #[tokio::test]
    async fn poll_errors_are_retried_with_same_offset() {
        let channel = InMemoryChannel::new();
        let (source, shutdown) = Scripted::new(vec![
            Ok(vec![text_update(1, "/start")]),
            Err(ChannelError::Transport("connection reset".into())),
            Ok(vec![text_update(2, "/start")]),
        ]);

        run(&source, &handler(&channel), &fast(), shutdown).await;

        assert_eq!(replies(&channel).len(), 2);
        assert_eq!(source.offsets(), vec![None, Some(2), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn updates_without_messages_are_acknowledged() {
        let channel = InMemoryChannel::new();
        let (source, shutdown) = Scripted::new(vec![Ok(vec![Update {
            update_id: 40,
            message: None,
        }])]);

        run(&source, &handler(&channel), &fast(), shutdown).await;

        assert!(channel.calls().is_empty());
        assert_eq!(source.offsets(), vec![None, Some(41)]);
    }

    #[tokio::test]
    async fn reply_failures_do_not_stop_the_loop() {
        let channel = InMemoryChannel::new();
        channel.fail_next(stockpin_channel::FailPoint::SendText);
        let (source, shutdown) = Scripted::new(vec![Ok(vec![
            text_update(1, "/start"),
            text_update(2, "/start"),
        ])]);

        run(&source, &handler(&channel), &fast(), shutdown).await;

        assert_eq!(replies(&channel).len(), 1);
    }

    #[tokio::test]
    async fn stops_immediately_when_shutdown_is_ready() {
        let channel = InMemoryChannel::new();
        let (source, _) = Scripted::new(vec![Ok(vec![text_update(1, "/start")])]);

        run(&source, &handler(&channel), &fast(), async {}).await;

        assert!(source.offsets().is_empty());
        assert!(channel.calls().is_empty());
    }
}
