//! Timebase normalization
//!
//! This module rebases the raw timestamp column so the first event of the
//! file is time zero and units are milliseconds:
//! - Epoch is the first row of the whole file, never of an interval
//! - Presentation ticks are converted at 10,000 ticks per millisecond
//!
//! Normalization consumes a [`RunLog`] and produces a [`NormalizedRun`], so a
//! run can only be rebased once.

use crate::types::{NormalizedRow, NormalizedRun, RunLog};

/// Presentation clock resolution: raw ticks per millisecond
pub const TICKS_PER_MS: f64 = 10_000.0;

/// Rebase every timestamp to milliseconds elapsed since the first row.
///
/// A single-row file yields an all-zero timebase. Infallible: an empty row
/// list simply stays empty.
pub fn normalize_timebase(run: RunLog) -> NormalizedRun {
    let epoch = run.rows.first().map_or(0, |r| r.time_ticks);

    let rows = run
        .rows
        .into_iter()
        .map(|r| NormalizedRow {
            code: r.code,
            time_ms: (r.time_ticks - epoch) as f64 / TICKS_PER_MS,
            stim_type: r.stim_type,
        })
        .collect();

    NormalizedRun {
        subject_id: run.subject_id,
        rows,
    }
}
