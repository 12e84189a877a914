//! Response tallying
//!
//! Counts occurrences of each distinct behavioral-response category (the
//! Stim Type column) observed in one run, keyed by (subject, run, category).

use crate::types::{NormalizedRun, TallyEntry};
use std::collections::BTreeMap;

/// Count response categories for one run.
///
/// Rows without a response category are excluded. Entries are ordered by
/// count descending, then category ascending, so output is deterministic.
/// A run with zero response rows yields an empty tally.
pub fn tally_responses(run: &NormalizedRun, run_id: &str) -> Vec<TallyEntry> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for row in &run.rows {
        if let Some(stim_type) = row.stim_type.as_deref() {
            *counts.entry(stim_type).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<TallyEntry> = counts
        .into_iter()
        .map(|(lvl, results)| TallyEntry {
            subject: run.subject_id.clone(),
            run: run_id.to_string(),
            lvl: lvl.to_string(),
            results,
        })
        .collect();

    entries.sort_by(|a, b| b.results.cmp(&a.results).then_with(|| a.lvl.cmp(&b.lvl)));
    entries
}
