//! Channel-backed ledger store for stockpin.
//!
//! The authoritative stock is the document attached to the pinned message of
//! one configured channel. Reading the ledger means resolving that pin and
//! decoding its document; committing means uploading a new document and
//! pinning it, which retires the previous snapshot. Old snapshot messages
//! stay in the channel's history and are never read again.
//!
//! # Design Rules
//!
//! 1. Stock is re-read from the channel for every operation. Nothing is cached.
//! 2. The pinned message id read by [`LedgerStore::fetch`] is the snapshot's
//!    version. [`LedgerStore::commit`] can refuse to write when the pin moved.
//! 3. Upload-then-pin is two calls. A failed pin leaves a stray unpinned
//!    document and the old snapshot stays current.
//! 4. Read failures are surfaced as [`LedgerError::Unavailable`] unless the
//!    store is configured with [`ReadPolicy::DegradeToEmpty`].

pub mod channel;
pub mod config;
pub mod error;
pub mod traits;

pub use channel::{snapshot_caption, ChannelLedger};
pub use config::{LedgerConfig, ReadPolicy, DEFAULT_FILE_NAME};
pub use error::{LedgerError, LedgerResult};
pub use traits::{CommitReceipt, LedgerStore, Snapshot};
