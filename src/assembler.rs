//! Result assembly and CSV encoding
//!
//! This module merges the block-derived and cue-derived interval lists into
//! one ordered result table:
//! - Placeholder intervals are stripped (degenerate zero-duration row at
//!   file start)
//! - Block rows first, then cue rows; concatenation only, never merging
//! - Missing target values default to `false`
//! - Rows are renumbered to a dense zero-based index

use crate::types::{Interval, ResultRow, ResultTable};
use std::io::Write;
use std::path::Path;

/// Assemble the per-run result table from resolved intervals
pub fn assemble(block_intervals: Vec<Interval>, cue_intervals: Vec<Interval>) -> ResultTable {
    let rows = block_intervals
        .into_iter()
        .chain(cue_intervals)
        .filter(|i| !i.placeholder)
        .enumerate()
        .map(|(index, interval)| ResultRow {
            index,
            code: interval.code,
            start_ms: interval.start_ms,
            duration_ms: interval.duration_ms,
            target: interval.has_target.unwrap_or(false),
        })
        .collect();

    ResultTable { rows }
}

impl ResultTable {
    /// Encode the table as CSV: a leading unnamed index column, then
    /// `Code,StartTime,EndTime,target`. Target cells are `1`/`0`; cue rows
    /// always carry `0`. Codes are free text and are quoted when they would
    /// break the cell layout.
    pub fn to_csv(&self) -> String {
        let mut out = String::from(",Code,StartTime,EndTime,target\n");
        for row in &self.rows {
            out.push_str(&format!(
                "{},{},{},{},{}\n",
                row.index,
                csv_field(&row.code),
                row.start_ms,
                row.duration_ms,
                u8::from(row.target),
            ));
        }
        out
    }

    /// Write the CSV encoding to a file
    pub fn write_csv(&self, path: &Path) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.to_csv().as_bytes())
    }
}

/// Escape one CSV cell: cells containing a comma, quote or newline are
/// wrapped in double quotes with inner quotes doubled
fn csv_field(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains(['"', ',', '\n', '\r']) {
        std::borrow::Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        std::borrow::Cow::Borrowed(value)
    }
}
