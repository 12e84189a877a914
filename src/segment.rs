//! Interval extraction
//!
//! This module segments a normalized run into marker spans:
//! - Block spans: rows whose code contains "block" (case-insensitive),
//!   paired consecutively in file order
//! - Cue spans: rows whose code contains "cue", each paired with the
//!   immediately following row regardless of that row's code
//!
//! Spans address rows by index, not by timestamp. Rows can share timestamps,
//! so "the next row" is only well defined positionally; this is a deliberate
//! design choice, not a shortcut.

use crate::error::ExtractError;
use crate::types::{MarkerSpan, NormalizedRow};

/// Find all block spans of a run, in file order.
///
/// The returned list is seeded with the synthetic placeholder span `(0, 0)`
/// ahead of the real pairings; it resolves to a degenerate zero-duration
/// interval that the assembler strips.
///
/// An odd number of block markers is rejected with
/// [`ExtractError::UnpairedBoundary`] rather than silently dropping the
/// trailing marker: the batch layer already skips bad files loudly, and a
/// half-paired table would be worse than no table.
pub fn find_block_spans(rows: &[NormalizedRow]) -> Result<Vec<MarkerSpan>, ExtractError> {
    let marks: Vec<usize> = code_matches(rows, "block").collect();

    if marks.len() % 2 != 0 {
        return Err(ExtractError::UnpairedBoundary {
            markers: marks.len(),
        });
    }

    let mut spans = Vec::with_capacity(marks.len() / 2 + 1);
    spans.push(MarkerSpan::placeholder());
    spans.extend(
        marks
            .chunks_exact(2)
            .map(|pair| MarkerSpan::new(pair[0], pair[1])),
    );

    Ok(spans)
}

/// Find all cue spans of a run: each cue row paired with its successor row.
///
/// A cue on the final row has no closing row and fails with
/// [`ExtractError::OutOfRangeCue`].
pub fn find_cue_spans(rows: &[NormalizedRow]) -> Result<Vec<MarkerSpan>, ExtractError> {
    code_matches(rows, "cue")
        .map(|i| {
            if i + 1 >= rows.len() {
                Err(ExtractError::OutOfRangeCue { index: i })
            } else {
                Ok(MarkerSpan::new(i, i + 1))
            }
        })
        .collect()
}

/// Indices of rows whose code contains `needle`, case-insensitively
fn code_matches<'a>(
    rows: &'a [NormalizedRow],
    needle: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    rows.iter()
        .enumerate()
        .filter(move |(_, r)| r.code.to_lowercase().contains(needle))
        .map(|(i, _)| i)
}
