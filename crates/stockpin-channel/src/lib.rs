//! Messaging channel collaborator for stockpin.
//!
//! The ledger keeps its stock as a document pinned in a channel. This crate
//! defines the narrow interface the rest of the system needs from that
//! channel and provides two implementations:
//!
//! - [`TelegramChannel`] talks to the Telegram Bot API over HTTPS.
//! - [`InMemoryChannel`] keeps everything in process and records each call,
//!   for tests.
//!
//! # Modules
//!
//! - [`error`]: [`ChannelError`] and the [`ChannelResult`] alias
//! - [`types`]: identifiers and document descriptors
//! - [`traits`]: the [`Channel`] trait
//! - [`memory`]: [`InMemoryChannel`]
//! - [`telegram`]: [`TelegramChannel`] and Bot API wire types

pub mod error;
pub mod memory;
pub mod telegram;
pub mod traits;
pub mod types;

pub use error::{ChannelError, ChannelResult};
pub use memory::{ChannelCall, FailPoint, InMemoryChannel, StoredMessage};
pub use telegram::TelegramChannel;
pub use traits::Channel;
pub use types::{ChatId, DocumentRef, MessageId, OutgoingDocument, PinnedMessage, UserId};
