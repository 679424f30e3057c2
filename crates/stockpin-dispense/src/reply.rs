//! Human-readable replies and file deliveries.

use std::fmt;

use bytes::Bytes;
use stockpin_channel::OutgoingDocument;
use stockpin_codec::{encode, Stock};

/// A text reply to the requester.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Greeting { first_name: String },
    InvalidNumber,
    NotPositive,
    LowStock { available: usize },
    ReadFailed,
    UpdateFailed,
    SaveFailed,
    Conflict,
    Unauthorized,
    EmptyFile,
    DownloadFailed,
    Syncing,
    Restocked { added: usize, total: usize },
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Greeting { first_name } => write!(
                f,
                "Hello {first_name}!\nType a number (e.g., '10') to extract that many records."
            ),
            Reply::InvalidNumber => f.write_str("Please enter a valid number."),
            Reply::NotPositive => f.write_str("Number must be greater than 0."),
            Reply::LowStock { available } => {
                write!(f, "⚠️ Low Stock. Only {available} available.")
            }
            Reply::ReadFailed => {
                f.write_str("❌ System Error: Could not read database. Please try again.")
            }
            Reply::UpdateFailed => f.write_str("❌ System Error: Could not update database."),
            Reply::SaveFailed => f.write_str("❌ Error saving to channel. Check permissions."),
            Reply::Conflict => f.write_str(
                "⚠️ Stock changed while your request was processed. Please try again.",
            ),
            Reply::Unauthorized => f.write_str("⛔ Authorization Failed."),
            Reply::EmptyFile => f.write_str("⚠️ File appears empty."),
            Reply::DownloadFailed => {
                f.write_str("❌ Could not download your file. Please try again.")
            }
            Reply::Syncing => f.write_str("⏳ Syncing with database..."),
            Reply::Restocked { added, total } => {
                write!(f, "✅ Success! Added {added} records.\nTotal Stock: {total}")
            }
        }
    }
}

/// Records handed out by a successful order, packaged as a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    records: Stock,
}

impl Delivery {
    pub fn new(records: Stock) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &Stock {
        &self.records
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn file_name(&self) -> String {
        format!("records_{}.txt", self.count())
    }

    pub fn caption(&self) -> String {
        format!("✅ Here are your {} records.", self.count())
    }

    pub fn content(&self) -> Bytes {
        Bytes::from(encode(&self.records))
    }

    pub fn into_document(self) -> OutgoingDocument {
        OutgoingDocument::new(self.file_name(), self.content()).with_caption(self.caption())
    }
}
