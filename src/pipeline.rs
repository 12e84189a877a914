//! Pipeline orchestration
//!
//! This module provides the public API for preslog. It orchestrates the full
//! per-run pipeline and the batch loop over a directory of log files.
//!
//! Pipeline stages:
//! 1. Loader - parse the tab-separated log into a run table
//! 2. Normalizer - rebase timestamps to milliseconds from file start
//! 3. Extractor - segment block and cue marker spans
//! 4. Resolver - derive duration and target presence per span
//! 5. Assembler - merge into the final result table
//!
//! The loader output also feeds the response tally independently.

use crate::accumulator::BehaviorAccumulator;
use crate::assembler::assemble;
use crate::error::ExtractError;
use crate::features::{resolve_block, resolve_cue};
use crate::loader::load_run_log;
use crate::normalizer::normalize_timebase;
use crate::segment::{find_block_spans, find_cue_spans};
use crate::tally::tally_responses;
use crate::types::{ResultTable, TallyEntry};
use std::path::{Path, PathBuf};

/// Everything extracted from one run's log file
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub subject_id: String,
    pub run_id: String,
    pub table: ResultTable,
    pub tally: Vec<TallyEntry>,
}

/// Run identifier derived from a file name: the last `_`-delimited segment,
/// truncated to 4 characters (the whole name when there is no `_`).
pub fn run_id_from_filename(file_name: &str) -> String {
    file_name
        .rsplit('_')
        .next()
        .unwrap_or(file_name)
        .chars()
        .take(4)
        .collect()
}

/// Process one run's log text through the full pipeline.
///
/// `file_name` supplies the run identifier; it is never read from disk here.
pub fn process_run(text: &str, file_name: &str) -> Result<RunResult, ExtractError> {
    let run = load_run_log(text)?;
    let run = normalize_timebase(run);
    let run_id = run_id_from_filename(file_name);

    let block_intervals = find_block_spans(&run.rows)?
        .into_iter()
        .map(|span| resolve_block(&run.rows, span))
        .collect();
    let cue_intervals = find_cue_spans(&run.rows)?
        .into_iter()
        .map(|span| resolve_cue(&run.rows, span))
        .collect();

    let table = assemble(block_intervals, cue_intervals);
    let tally = tally_responses(&run, &run_id);

    Ok(RunResult {
        subject_id: run.subject_id,
        run_id,
        table,
        tally,
    })
}

/// What the batch loop recorded for one input file
#[derive(Debug)]
pub struct FileOutcome {
    pub file: String,
    pub outcome: Result<RunSummary, ExtractError>,
}

/// Summary of a successfully processed file
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub subject_id: String,
    pub run_id: String,
    pub interval_rows: usize,
    pub tally_entries: usize,
    pub csv_path: PathBuf,
}

/// Process every regular file in `dir`, writing result CSVs and per-subject
/// accumulator files into `out_dir`.
///
/// Files are processed in name order, one at a time. A failure inside one
/// file is logged and recorded in its [`FileOutcome`]; the batch always
/// continues with the next file, and a failed file writes no outputs.
/// Only the directory listing itself can fail.
pub fn process_directory(dir: &Path, out_dir: &Path) -> Result<Vec<FileOutcome>, ExtractError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let outcomes = files
        .iter()
        .map(|path| {
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let outcome = process_file(path, &file, out_dir);
            if let Err(e) = &outcome {
                tracing::warn!(file = %file, error = %e, "skipping file");
            }
            FileOutcome { file, outcome }
        })
        .collect();

    Ok(outcomes)
}

/// Process a single file and write its outputs.
///
/// The results CSV is staged under a temporary name and only renamed into
/// place after the accumulator save succeeds, so a failed file leaves no
/// output files behind.
fn process_file(
    path: &Path,
    file_name: &str,
    out_dir: &Path,
) -> Result<RunSummary, ExtractError> {
    let text = std::fs::read_to_string(path)?;
    let result = process_run(&text, file_name)?;

    let csv_path = out_dir.join(format!(
        "results_{}_{}.csv",
        result.subject_id, result.run_id
    ));
    let csv_tmp = csv_path.with_extension("csv.tmp");
    if let Err(e) = result.table.write_csv(&csv_tmp) {
        let _ = std::fs::remove_file(&csv_tmp);
        return Err(e.into());
    }

    let acc_path = BehaviorAccumulator::path_for(out_dir, &result.subject_id);
    let mut accumulator = BehaviorAccumulator::load_or_default(&acc_path);
    accumulator.append(result.tally.clone());
    if let Err(e) = accumulator.save(&acc_path) {
        let _ = std::fs::remove_file(&csv_tmp);
        return Err(e.into());
    }

    std::fs::rename(&csv_tmp, &csv_path)?;

    Ok(RunSummary {
        subject_id: result.subject_id,
        run_id: result.run_id,
        interval_rows: result.table.rows.len(),
        tally_entries: result.tally.len(),
        csv_path,
    })
}
