//! Shared fixtures for workflow tests.

use async_trait::async_trait;
use stockpin_channel::{ChannelCall, ChatId, InMemoryChannel, MessageId, UserId};
use stockpin_codec::{decode, encode, Record, Stock};
use stockpin_ledger::{
    ChannelLedger, CommitReceipt, LedgerConfig, LedgerResult, LedgerStore, Snapshot,
};

use crate::dispenser::Dispenser;

pub const LEDGER: ChatId = ChatId(-100_200_300);
pub const ADMIN: UserId = UserId(42);
pub const STRANGER: UserId = UserId(7);

pub type TestDispenser = Dispenser<ChannelLedger<InMemoryChannel>>;

pub fn stock(items: &[&str]) -> Stock {
    items.iter().filter_map(Record::new).collect()
}

pub fn dispenser(channel: &InMemoryChannel) -> TestDispenser {
    Dispenser::new(
        ChannelLedger::new(channel.clone(), LedgerConfig::new(LEDGER)),
        ADMIN,
    )
}

/// A channel whose ledger already holds `items`, plus a dispenser over it.
pub fn seeded(items: &[&str]) -> (InMemoryChannel, TestDispenser) {
    let channel = InMemoryChannel::new();
    if !items.is_empty() {
        channel.seed_pinned_document(LEDGER, "database.txt", items.join("\n"));
    }
    let dispenser = dispenser(&channel);
    (channel, dispenser)
}

/// Current stock of the ledger, one record per line.
pub fn ledger_text(channel: &InMemoryChannel) -> String {
    let text = channel.pinned_text(LEDGER).unwrap_or_default();
    String::from_utf8_lossy(&encode(&decode(text.as_bytes()))).into_owned()
}

/// Ledger where another writer pins `rival` right after every fetch.
pub struct RacedLedger {
    inner: ChannelLedger<InMemoryChannel>,
    channel: InMemoryChannel,
    rival: &'static str,
}

#[async_trait]
impl LedgerStore for RacedLedger {
    async fn fetch(&self) -> LedgerResult<Snapshot> {
        let snapshot = self.inner.fetch().await;
        self.channel.seed_pinned_document(LEDGER, "database.txt", self.rival);
        snapshot
    }

    async fn commit(
        &self,
        expected: Option<MessageId>,
        stock: &Stock,
    ) -> LedgerResult<CommitReceipt> {
        self.inner.commit(expected, stock).await
    }
}

/// Like [`seeded`], but every fetch loses a race against a writer of `rival`.
pub fn raced(items: &[&str], rival: &'static str) -> (InMemoryChannel, Dispenser<RacedLedger>) {
    let (channel, _) = seeded(items);
    let ledger = RacedLedger {
        inner: ChannelLedger::new(channel.clone(), LedgerConfig::new(LEDGER)),
        channel: channel.clone(),
        rival,
    };
    (channel, Dispenser::new(ledger, ADMIN))
}

pub fn store_calls(channel: &InMemoryChannel) -> Vec<ChannelCall> {
    channel
        .calls()
        .into_iter()
        .filter(ChannelCall::touches_store)
        .collect()
}
