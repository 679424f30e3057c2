use stockpin_channel::{ChannelError, MessageId};
use thiserror::Error;

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The channel could not be read.
    #[error("ledger unavailable: {0}")]
    Unavailable(#[source] ChannelError),

    /// The pin moved between the read and the commit.
    #[error("ledger changed since it was read: expected pin {expected:?}, found {found:?}")]
    Conflict {
        expected: Option<MessageId>,
        found: Option<MessageId>,
    },

    /// The new snapshot document could not be sent. Nothing changed.
    #[error("snapshot upload failed: {0}")]
    Upload(#[source] ChannelError),

    /// The new snapshot was sent but could not be pinned. The previous
    /// snapshot is still current; `stray` is left behind unpinned.
    #[error("snapshot {stray} was sent but could not be pinned: {source}")]
    PartialCommit {
        stray: MessageId,
        #[source]
        source: ChannelError,
    },
}

impl LedgerError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::Conflict { .. })
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
