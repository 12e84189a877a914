//! Interval feature resolution
//!
//! This module turns a marker span into a resolved [`Interval`]:
//! - Code and start instant from the opening row
//! - Duration as elapsed time between opening and closing row
//! - Target presence scanned over the inclusive row-index range
//!
//! The start is an absolute normalized instant while the duration is
//! relative; the two columns deliberately carry different semantics in the
//! output table.

use crate::types::{Interval, MarkerSpan, NormalizedRow};

/// Resolve a block span into an interval, including the target scan.
///
/// The placeholder span resolves to a degenerate interval at file start:
/// zero duration, target forced to `false` without scanning row zero.
///
/// `rows` must be non-empty and the span indices in range; spans from
/// [`crate::segment::find_block_spans`] over the same rows always are
/// (the loader rejects files without data rows). Panics otherwise.
pub fn resolve_block(rows: &[NormalizedRow], span: MarkerSpan) -> Interval {
    if span.is_placeholder() {
        return Interval {
            code: rows[0].code.clone(),
            start_ms: 0.0,
            duration_ms: 0.0,
            has_target: Some(false),
            placeholder: true,
        };
    }

    let mut interval = resolve_bounds(rows, span);
    interval.has_target = Some(span_contains_target(rows, span.open, span.close));
    interval
}

/// Resolve a cue span into an interval. Target presence is not computed for
/// cues; their result rows carry only code, start and duration. Same index
/// preconditions as [`resolve_block`].
pub fn resolve_cue(rows: &[NormalizedRow], span: MarkerSpan) -> Interval {
    resolve_bounds(rows, span)
}

/// Whether any row in the inclusive index range `[open, close]` carries a
/// "target" code, case-insensitively. Holds for length-1 ranges
/// (`open == close` checks a single row). Panics when `close` is out of
/// range or `open > close`.
pub fn span_contains_target(rows: &[NormalizedRow], open: usize, close: usize) -> bool {
    rows[open..=close]
        .iter()
        .any(|r| r.code.to_lowercase().contains("target"))
}

fn resolve_bounds(rows: &[NormalizedRow], span: MarkerSpan) -> Interval {
    let start_ms = rows[span.open].time_ms;
    Interval {
        code: rows[span.open].code.clone(),
        start_ms,
        duration_ms: rows[span.close].time_ms - start_ms,
        has_target: None,
        placeholder: false,
    }
}
