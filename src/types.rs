//! Core types for the preslog pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw event rows, timebase-normalized rows, marker spans, resolved
//! intervals, and the assembled result table.

use serde::{Deserialize, Serialize};

/// One record of the raw log, as loaded from the file.
///
/// Row index is the only safe ordering: timestamps are monotonically
/// non-decreasing but ties are possible, so "the next row" and "rows between
/// two markers" are always expressed by index, never by timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    /// Event code/tag (free text; "block", "cue" and "target" substrings are
    /// semantically meaningful, case-insensitive)
    pub code: String,
    /// Raw clock value in Presentation ticks (10,000 ticks = 1 ms)
    pub time_ticks: i64,
    /// Behavioral-response category, when the log carries a Stim Type column
    pub stim_type: Option<String>,
}

/// A loaded run: all event rows of one file plus the constant subject id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLog {
    /// Subject identifier, constant across all rows of the file
    pub subject_id: String,
    pub rows: Vec<EventRow>,
}

/// One event row after timebase normalization (milliseconds from file start)
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub code: String,
    /// Milliseconds elapsed since the first row of the file
    pub time_ms: f64,
    pub stim_type: Option<String>,
}

/// A run whose timestamp column has been rebased to milliseconds-from-start.
///
/// Normalization is a type change (ticks in, milliseconds out), so applying
/// it twice is a compile error rather than a silently double-shifted epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRun {
    pub subject_id: String,
    pub rows: Vec<NormalizedRow>,
}

/// A pair of row indices delimiting an interval: the opening marker row and
/// the closing row.
///
/// `(0, 0)` is reserved for the synthetic placeholder seeded at the front of
/// the block list; real pairings always satisfy `close > open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpan {
    pub open: usize,
    pub close: usize,
}

impl MarkerSpan {
    pub fn new(open: usize, close: usize) -> Self {
        Self { open, close }
    }

    /// The synthetic seed span prepended to every block list
    pub fn placeholder() -> Self {
        Self { open: 0, close: 0 }
    }

    pub fn is_placeholder(&self) -> bool {
        self.open == 0 && self.close == 0
    }
}

/// A resolved interval with its derived features.
///
/// `start_ms` is an absolute normalized instant while `duration_ms` is the
/// elapsed time between the opening and closing row. The asymmetry is
/// intentional and matches the summary tables downstream tooling expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    /// Code of the row that opened the interval
    pub code: String,
    /// Normalized timestamp of the opening row (ms from file start)
    pub start_ms: f64,
    /// Elapsed milliseconds between opening and closing row
    pub duration_ms: f64,
    /// Whether any row in the inclusive index range carries a "target" code.
    /// `Some` for block intervals, `None` for cue intervals (not computed).
    pub has_target: Option<bool>,
    /// Marks the degenerate seed interval at file start
    pub placeholder: bool,
}

/// One row of the assembled result table
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Dense zero-based index
    pub index: usize,
    pub code: String,
    pub start_ms: f64,
    pub duration_ms: f64,
    /// Target presence, defaulted to `false` for cue rows
    pub target: bool,
}

/// The per-run result table: block rows followed by cue rows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
}

/// One accumulator record: occurrences of a response category in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub subject: String,
    pub run: String,
    /// Response-category label (the Stim Type cell)
    pub lvl: String,
    pub results: u64,
}
