//! [`LedgerStore`] over a messaging channel's pin slot.

use async_trait::async_trait;
use stockpin_channel::{Channel, ChannelError, MessageId, OutgoingDocument};
use stockpin_codec::{decode, encode, Stock};

use crate::config::{LedgerConfig, ReadPolicy};
use crate::error::{LedgerError, LedgerResult};
use crate::traits::{CommitReceipt, LedgerStore, Snapshot};

/// Caption attached to every snapshot document. Informational only.
pub fn snapshot_caption(record_count: usize) -> String {
    format!("Database Updated.\nRecords remaining: {record_count}")
}

/// Stored in place of an empty stock. The Bot API refuses zero-byte
/// uploads, and this decodes to no records.
const EMPTY_SNAPSHOT: &[u8] = b"\n";

/// Encode `stock` for upload, never as an empty blob.
fn snapshot_content(stock: &Stock) -> Vec<u8> {
    let content = encode(stock);
    if content.is_empty() {
        EMPTY_SNAPSHOT.to_vec()
    } else {
        content
    }
}

/// Ledger whose current stock is the pinned document of one channel.
pub struct ChannelLedger<C> {
    channel: C,
    config: LedgerConfig,
}

impl<C: Channel> ChannelLedger<C> {
    pub fn new(channel: C, config: LedgerConfig) -> Self {
        Self { channel, config }
    }

    async fn current_pin(&self) -> Result<Option<MessageId>, ChannelError> {
        Ok(self
            .channel
            .pinned_message(self.config.channel)
            .await?
            .map(|p| p.message_id))
    }

    async fn read_snapshot(&self) -> Result<Snapshot, ChannelError> {
        let Some(pinned) = self.channel.pinned_message(self.config.channel).await? else {
            tracing::debug!(channel = %self.config.channel, "no pinned message; ledger is empty");
            return Ok(Snapshot::default());
        };
        let Some(document) = pinned.document else {
            tracing::debug!(
                channel = %self.config.channel,
                message = %pinned.message_id,
                "pinned message has no document; ledger is empty"
            );
            return Ok(Snapshot::new(Some(pinned.message_id), Stock::new()));
        };

        let content = self.channel.download(&document).await?;
        Ok(Snapshot::new(Some(pinned.message_id), decode(&content)))
    }
}

#[async_trait]
impl<C: Channel> LedgerStore for ChannelLedger<C> {
    async fn fetch(&self) -> LedgerResult<Snapshot> {
        match self.read_snapshot().await {
            Ok(snapshot) => {
                tracing::debug!(
                    pinned = ?snapshot.pinned,
                    records = snapshot.stock.len(),
                    "ledger read"
                );
                Ok(snapshot)
            }
            Err(e) => match self.config.read_policy {
                ReadPolicy::Strict => {
                    tracing::error!(error = %e, channel = %self.config.channel, "ledger read failed");
                    Err(LedgerError::Unavailable(e))
                }
                ReadPolicy::DegradeToEmpty => {
                    tracing::error!(
                        error = %e,
                        channel = %self.config.channel,
                        "ledger read failed; treating stock as empty"
                    );
                    Ok(Snapshot::default())
                }
            },
        }
    }

    async fn commit(
        &self,
        expected: Option<MessageId>,
        stock: &Stock,
    ) -> LedgerResult<CommitReceipt> {
        let chat = self.config.channel;

        if self.config.check_conflicts {
            let found = self.current_pin().await.map_err(|e| {
                tracing::error!(error = %e, "could not re-read pin before commit");
                LedgerError::Unavailable(e)
            })?;
            if found != expected {
                tracing::warn!(?expected, ?found, "ledger pin moved since read; commit aborted");
                return Err(LedgerError::Conflict { expected, found });
            }
        }

        let content = snapshot_content(stock);
        let document = OutgoingDocument::new(self.config.file_name.clone(), content)
            .with_caption(snapshot_caption(stock.len()));
        let message_id = self
            .channel
            .send_document(chat, document)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "snapshot upload failed");
                LedgerError::Upload(e)
            })?;

        if let Err(e) = self.channel.pin_message(chat, message_id).await {
            tracing::warn!(
                error = %e,
                stray = %message_id,
                "snapshot sent but not pinned; previous snapshot stays current"
            );
            return Err(LedgerError::PartialCommit {
                stray: message_id,
                source: e,
            });
        }

        tracing::info!(message = %message_id, records = stock.len(), "ledger committed");
        Ok(CommitReceipt {
            message_id,
            record_count: stock.len(),
        })
    }
}
