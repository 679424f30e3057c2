//! Restock: append an administrator's upload to the stock.

use stockpin_channel::UserId;
use stockpin_codec::{decode, Stock};
use stockpin_ledger::{LedgerError, LedgerStore};

use crate::dispenser::Dispenser;
use crate::error::RestockRejection;
use crate::reply::Reply;

/// An authorized, non-empty batch of new records.
///
/// Only [`Dispenser::prepare_restock`] builds one, so holding a batch means
/// the sender passed the admin check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestockBatch {
    sender: UserId,
    records: Stock,
}

impl RestockBatch {
    pub fn sender(&self) -> UserId {
        self.sender
    }

    pub fn records(&self) -> &Stock {
        &self.records
    }
}

/// Terminal state of one restock.
#[derive(Debug)]
pub enum RestockOutcome {
    Restocked { added: usize, total: usize },
    /// The current stock could not be read, so nothing was committed.
    ReadFailed(LedgerError),
    CommitFailed(LedgerError),
}

impl RestockOutcome {
    pub fn reply(&self) -> Reply {
        match self {
            RestockOutcome::Restocked { added, total } => Reply::Restocked {
                added: *added,
                total: *total,
            },
            RestockOutcome::ReadFailed(_) => Reply::ReadFailed,
            RestockOutcome::CommitFailed(e) if e.is_conflict() => Reply::Conflict,
            RestockOutcome::CommitFailed(_) => Reply::SaveFailed,
        }
    }
}

impl From<RestockRejection> for Reply {
    fn from(rejection: RestockRejection) -> Self {
        match rejection {
            RestockRejection::Unauthorized => Reply::Unauthorized,
            RestockRejection::EmptyUpload => Reply::EmptyFile,
        }
    }
}

impl<L: LedgerStore> Dispenser<L> {
    /// Check the sender and decode the upload. Never touches the ledger.
    pub fn prepare_restock(
        &self,
        sender: UserId,
        upload: &[u8],
    ) -> Result<RestockBatch, RestockRejection> {
        if !self.gate.permits(sender) {
            tracing::warn!(%sender, "restock rejected: not the administrator");
            return Err(RestockRejection::Unauthorized);
        }
        let records = decode(upload);
        if records.is_empty() {
            return Err(RestockRejection::EmptyUpload);
        }
        Ok(RestockBatch { sender, records })
    }

    /// Append `batch` to the current stock and commit the result.
    pub async fn apply_restock(&self, batch: RestockBatch) -> RestockOutcome {
        let _guard = self.guard.lock().await;

        let snapshot = match self.ledger.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => return RestockOutcome::ReadFailed(e),
        };

        let added = batch.records.len();
        let mut combined = snapshot.stock;
        combined.append(batch.records);
        let total = combined.len();

        if let Err(e) = self.ledger.commit(snapshot.pinned, &combined).await {
            tracing::error!(error = %e, added, "restock not committed");
            return RestockOutcome::CommitFailed(e);
        }

        tracing::info!(sender = %batch.sender, added, total, "restocked");
        RestockOutcome::Restocked { added, total }
    }

    /// [`Self::prepare_restock`] followed by [`Self::apply_restock`].
    pub async fn restock(
        &self,
        sender: UserId,
        upload: &[u8],
    ) -> Result<RestockOutcome, RestockRejection> {
        let batch = self.prepare_restock(sender, upload)?;
        Ok(self.apply_restock(batch).await)
    }
}
