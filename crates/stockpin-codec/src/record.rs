use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters that end a line in a stock file.
///
/// Besides `\n` and `\r` these are the vertical tab, form feed, the file,
/// group and record separators, NEL and the Unicode line and paragraph
/// separators.
pub const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}',
    '\u{2029}',
];

/// One dispensable unit: a single trimmed, non-empty line of text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Record(String);

impl Record {
    /// Build a record from a line of text.
    ///
    /// Surrounding whitespace is trimmed. Returns `None` if nothing is left,
    /// or if the text spans more than one line.
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() || trimmed.contains(LINE_BREAKS) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Record {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Record {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Record::new(&value).ok_or_else(|| format!("not a valid record: {value:?}"))
    }
}

impl From<Record> for String {
    fn from(record: Record) -> Self {
        record.0
    }
}

/// The ordered sequence of records available for dispensing.
///
/// Order is significant and duplicates are allowed. Consumption is strict
/// FIFO: [`Stock::split_head`] always takes from the front.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stock {
    records: Vec<Record>,
}

impl Stock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Split off the first `n` records.
    ///
    /// Returns `(head, tail)` where `head` holds records `[0, n)` and `tail`
    /// holds `[n, len)`, both in original order. Returns `None` without
    /// touching the stock when `n` exceeds the number of records.
    pub fn split_head(self, n: usize) -> Option<(Stock, Stock)> {
        if n > self.records.len() {
            return None;
        }
        let mut head = self.records;
        let tail = head.split_off(n);
        Some((Stock { records: head }, Stock { records: tail }))
    }

    /// Append `other` after the existing records. No deduplication.
    pub fn append(&mut self, other: Stock) {
        self.records.extend(other.records);
    }
}

impl From<Vec<Record>> for Stock {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for Stock {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Stock {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Stock {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
