//! Transaction stream parsing and result serialization (part of C7).
//!
//! Input is a single JSON array of transactions, each a list of
//! `[attribute_id, value_id]` pairs. Output is a JSON array of
//! `[subset, score]` pairs, `subset` sorted ascending.

use std::io::{BufRead, Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{MinerError, Result};
use crate::partition::{PartitionBuilder, Partitions};
use crate::topk::Entry;

#[derive(Deserialize)]
struct RawTransaction(Vec<(u16, u8)>);

/// Excerpt ~20 characters of `text` starting at `serde_json`'s reported
/// `(line, column)`, the way the original parser's `formatError` slices raw
/// input around the failure point rather than describing the position in
/// words.
fn excerpt_at(text: &str, line: usize, column: usize) -> String {
    let mut offset = 0;
    for (i, l) in text.lines().enumerate() {
        if i + 1 == line {
            offset += l.char_indices().nth(column.saturating_sub(1)).map(|(b, _)| b).unwrap_or(l.len());
            break;
        }
        offset += l.len() + 1;
    }
    text.get(offset..).unwrap_or("").chars().take(20).collect()
}

/// Read every transaction from `reader`, building one [`Partitions`] set.
/// The whole input is buffered and deserialized at once via `serde_json`;
/// this crate does not stream element-by-element, since the partition
/// builder needs every transaction anyway before the attribute count is
/// known, and buffering first lets a parse failure excerpt the offending
/// input text.
pub fn load_transactions<R: BufRead>(mut reader: R) -> Result<Partitions> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| MinerError::parse(e.to_string(), ""))?;

    let raw: Vec<RawTransaction> = serde_json::from_str(&text)
        .map_err(|e| MinerError::parse(e.to_string(), &excerpt_at(&text, e.line(), e.column())))?;

    let mut builder = PartitionBuilder::new();
    for RawTransaction(pairs) in &raw {
        builder.add(pairs);
    }
    log::info!("loaded {} transactions over {} attributes", builder.n_tuples(), builder.n_attributes());
    Ok(builder.finish())
}

#[derive(Serialize)]
struct OutputEntry(Vec<u16>, f64);

/// Write the mined `(subset, score)` entries as a JSON array, worst-first as
/// drained from the top-K queue (callers should not assume descending order).
pub fn write_results<W: Write>(writer: W, entries: &[Entry]) -> Result<()> {
    let out: Vec<OutputEntry> = entries.iter().map(|e| OutputEntry(e.subset.clone(), e.score)).collect();
    serde_json::to_writer(writer, &out).map_err(|e| MinerError::parse(e.to_string(), "while writing output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_two_attribute_transactions() {
        let input = b"[[[0,1],[1,0]],[[0,0],[1,1]]]" as &[u8];
        let parts = load_transactions(input).unwrap();
        assert_eq!(parts.n_attributes(), 2);
        assert_eq!(parts.top().size(), 2);
    }

    #[test]
    fn malformed_input_yields_parse_error_with_bounded_locator() {
        let input = b"not json" as &[u8];
        let err = load_transactions(input).unwrap_err();
        match err {
            MinerError::ParseError { locator, .. } => assert!(locator.len() <= 20),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn writes_entries_as_subset_score_pairs() {
        let mut buf = Vec::new();
        let entries = vec![Entry::new(vec![2, 0], 0.5), Entry::new(vec![1], 0.25)];
        write_results(&mut buf, &entries).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("[[2,0],0.5]") || text.contains("[[2,0],0.5"));
    }
}
