//! Order fulfillment.
//!
//! ```text
//! START -> FETCHED -> INSUFFICIENT
//!                  -> COMMITTED -> DELIVERED
//!       -> READ_FAILED
//!                  -> COMMIT_FAILED
//! ```
//!
//! The remainder is committed before anything is delivered, so a record is
//! never handed out while it is still in the current snapshot.

use std::num::NonZeroUsize;

use stockpin_ledger::{LedgerError, LedgerStore};

use crate::dispenser::Dispenser;
use crate::error::QuantityError;
use crate::quantity::parse_quantity;
use crate::reply::{Delivery, Reply};

/// Terminal state of one order.
#[derive(Debug)]
pub enum FulfillOutcome {
    /// The remainder was committed; these records now belong to the requester.
    Delivered(Delivery),
    /// Not enough stock. Nothing changed.
    Insufficient { available: usize },
    /// The ledger could not be read. Nothing changed.
    ReadFailed(LedgerError),
    /// The remainder could not be committed. Nothing was consumed.
    CommitFailed(LedgerError),
}

impl FulfillOutcome {
    /// Text reply for outcomes that do not deliver a file.
    pub fn reply(&self) -> Option<Reply> {
        match self {
            FulfillOutcome::Delivered(_) => None,
            FulfillOutcome::Insufficient { available } => Some(Reply::LowStock {
                available: *available,
            }),
            FulfillOutcome::ReadFailed(_) => Some(Reply::ReadFailed),
            FulfillOutcome::CommitFailed(e) if e.is_conflict() => Some(Reply::Conflict),
            FulfillOutcome::CommitFailed(_) => Some(Reply::UpdateFailed),
        }
    }
}

impl From<QuantityError> for Reply {
    fn from(err: QuantityError) -> Self {
        match err {
            QuantityError::NotANumber => Reply::InvalidNumber,
            QuantityError::NotPositive => Reply::NotPositive,
        }
    }
}

impl<L: LedgerStore> Dispenser<L> {
    /// Validate a quantity request and fulfill it.
    ///
    /// Invalid input is rejected before the ledger is touched.
    pub async fn request(&self, text: &str) -> Result<FulfillOutcome, QuantityError> {
        let quantity = parse_quantity(text)?;
        Ok(self.fulfill(quantity).await)
    }

    /// Remove `quantity` records from the head of the stock and deliver them.
    pub async fn fulfill(&self, quantity: NonZeroUsize) -> FulfillOutcome {
        let _guard = self.guard.lock().await;

        let snapshot = match self.ledger.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => return FulfillOutcome::ReadFailed(e),
        };
        let available = snapshot.stock.len();

        let Some((deliverable, remaining)) = snapshot.stock.split_head(quantity.get()) else {
            tracing::info!(requested = quantity.get(), available, "insufficient stock");
            return FulfillOutcome::Insufficient { available };
        };

        if let Err(e) = self.ledger.commit(snapshot.pinned, &remaining).await {
            tracing::error!(error = %e, requested = quantity.get(), "order not committed");
            return FulfillOutcome::CommitFailed(e);
        }

        tracing::info!(
            delivered = deliverable.len(),
            remaining = remaining.len(),
            "order fulfilled"
        );
        FulfillOutcome::Delivered(Delivery::new(deliverable))
    }
}
