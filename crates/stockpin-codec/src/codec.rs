use crate::record::{Record, Stock, LINE_BREAKS};

/// Decode a stored blob into stock.
///
/// Invalid UTF-8 sequences are dropped. Lines are split on any of
/// [`LINE_BREAKS`] (so `\r\n` yields an empty line, which is discarded with
/// the other blank lines); each line is trimmed. Order is preserved. Never
/// fails.
pub fn decode(blob: &[u8]) -> Stock {
    let text = lossy_utf8(blob);
    text.split(LINE_BREAKS).filter_map(Record::new).collect()
}

/// Encode stock as a newline-joined UTF-8 blob with no trailing newline.
pub fn encode(stock: &Stock) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, record) in stock.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(record.as_str().as_bytes());
    }
    out
}

fn lossy_utf8(blob: &[u8]) -> String {
    let mut text = String::with_capacity(blob.len());
    for chunk in blob.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
