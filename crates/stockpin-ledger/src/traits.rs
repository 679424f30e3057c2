use async_trait::async_trait;
use stockpin_channel::MessageId;
use stockpin_codec::Stock;

use crate::error::LedgerResult;

/// The stock as read from the ledger, tagged with where it was read from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// The pinned message the stock was read from. `None` when nothing was
    /// pinned. Serves as the version tag for [`LedgerStore::commit`].
    pub pinned: Option<MessageId>,
    pub stock: Stock,
}

impl Snapshot {
    pub fn new(pinned: Option<MessageId>, stock: Stock) -> Self {
        Self { pinned, stock }
    }
}

/// A successful commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    /// The message now pinned as the current snapshot.
    pub message_id: MessageId,
    pub record_count: usize,
}

/// Single-slot store for the current stock.
///
/// Implementations provide last-writer-wins semantics at the slot. Callers
/// that read, modify and write back must serialize those sequences
/// themselves; the store can only detect, not prevent, a concurrent writer.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Read the current stock.
    async fn fetch(&self) -> LedgerResult<Snapshot>;

    /// Replace the current stock with `stock`.
    ///
    /// `expected` is the [`Snapshot::pinned`] value the new stock was derived
    /// from. On error the previous snapshot is still current.
    async fn commit(
        &self,
        expected: Option<MessageId>,
        stock: &Stock,
    ) -> LedgerResult<CommitReceipt>;
}
