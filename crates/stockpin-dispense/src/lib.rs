//! Dispensing workflows for stockpin.
//!
//! A [`Dispenser`] owns the ledger store and runs the two read-modify-write
//! workflows against it:
//!
//! - **Order fulfillment** removes `n` records from the head of the stock,
//!   commits the remainder, and only then hands the removed records out.
//! - **Restock** appends an administrator's uploaded batch to the stock.
//!
//! Both hold the dispenser's guard from fetch to commit, so sequences started
//! from the same process never interleave. Writers in other processes are
//! caught by the ledger's pin check instead.

pub mod auth;
pub mod dispenser;
pub mod error;
pub mod order;
pub mod quantity;
pub mod reply;
pub mod restock;

#[cfg(test)]
mod testing;

pub use auth::AdminGate;
pub use dispenser::Dispenser;
pub use error::{QuantityError, RestockRejection};
pub use order::FulfillOutcome;
pub use quantity::parse_quantity;
pub use reply::{Delivery, Reply};
pub use restock::{RestockBatch, RestockOutcome};
