use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stockpin_channel::ChatId;

pub const DEFAULT_FILE_NAME: &str = "database.txt";

/// What [`crate::LedgerStore::fetch`] does when the channel cannot be read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadPolicy {
    /// Fail with [`crate::LedgerError::Unavailable`].
    #[default]
    Strict,
    /// Log the failure and report an empty stock. A transient outage is then
    /// indistinguishable from an empty ledger.
    DegradeToEmpty,
}

impl fmt::Display for ReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadPolicy::Strict => f.write_str("strict"),
            ReadPolicy::DegradeToEmpty => f.write_str("degrade-to-empty"),
        }
    }
}

impl FromStr for ReadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ReadPolicy::Strict),
            "degrade-to-empty" | "degrade" => Ok(ReadPolicy::DegradeToEmpty),
            other => Err(format!(
                "unknown read policy {other:?} (expected \"strict\" or \"degrade-to-empty\")"
            )),
        }
    }
}

/// Ledger store configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Channel whose pinned document holds the stock.
    pub channel: ChatId,
    /// File name given to every uploaded snapshot.
    pub file_name: String,
    pub read_policy: ReadPolicy,
    /// Re-read the pin before committing and abort if it moved.
    pub check_conflicts: bool,
}

impl LedgerConfig {
    pub fn new(channel: ChatId) -> Self {
        Self {
            channel,
            file_name: DEFAULT_FILE_NAME.into(),
            read_policy: ReadPolicy::default(),
            check_conflicts: true,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    pub fn with_conflict_check(mut self, enabled: bool) -> Self {
        self.check_conflicts = enabled;
        self
    }
}
