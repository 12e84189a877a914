//! Log table loading
//!
//! This module turns a raw Presentation log file into a [`RunLog`]:
//! - Skips the leading metadata lines (2, retried with 3)
//! - Locates the required columns in the tab-separated header
//! - Extracts the constant subject identifier
//!
//! Loading is a pure read; nothing is written or cached.

use crate::error::ExtractError;
use crate::types::{EventRow, RunLog};

/// Metadata lines skipped on the first parse attempt
pub const PRIMARY_SKIP: usize = 2;
/// Metadata lines skipped on the retry attempt
pub const RETRY_SKIP: usize = 3;

/// Load a run log from raw file text.
///
/// The file is parsed skipping [`PRIMARY_SKIP`] metadata lines first; if the
/// resulting header has no subject column, the parse is retried with
/// [`RETRY_SKIP`] skipped lines and rows lacking a subject value are dropped
/// (retry path only, matching the tool's looser trailing sections).
pub fn load_run_log(text: &str) -> Result<RunLog, ExtractError> {
    // Header detection decides the skip count; row parsing happens once.
    // Row-level failures (a bad Time cell) never trigger the retry.
    let (skip, drop_missing_subject) = match header_at(text, PRIMARY_SKIP) {
        Ok(_) => (PRIMARY_SKIP, false),
        Err(primary) => match header_at(text, RETRY_SKIP) {
            Ok(_) => {
                tracing::debug!(skip = RETRY_SKIP, "no subject column, retrying parse");
                (RETRY_SKIP, true)
            }
            Err(retry) => {
                // A header with a subject column but no Code/Time is the
                // real header; report its missing columns, not the subject.
                let issue = match (primary, retry) {
                    (HeaderIssue::MissingColumns, _) | (_, HeaderIssue::MissingColumns) => {
                        HeaderIssue::MissingColumns
                    }
                    _ => HeaderIssue::NoSubject,
                };
                return Err(issue.into_error());
            }
        },
    };

    parse_with_skip(text, skip, drop_missing_subject)
}

/// Columns of the header found after skipping `skip` lines
fn header_at(text: &str, skip: usize) -> Result<Columns, HeaderIssue> {
    let header_line = text
        .lines()
        .skip(skip)
        .find(|l| !l.trim().is_empty())
        .ok_or(HeaderIssue::NoSubject)?;
    Columns::from_header(header_line)
}

/// Read and load a run log from a file path
pub fn read_run_log(path: &std::path::Path) -> Result<RunLog, ExtractError> {
    let text = std::fs::read_to_string(path)?;
    load_run_log(&text)
}

fn parse_with_skip(
    text: &str,
    skip: usize,
    drop_missing_subject: bool,
) -> Result<RunLog, ExtractError> {
    // Header is the first non-blank line after the skipped metadata lines
    let mut lines = text.lines().skip(skip).filter(|l| !l.trim().is_empty());
    let header_line = lines
        .next()
        .ok_or_else(|| ExtractError::MalformedLog("file has no header line".to_string()))?;
    let columns = Columns::from_header(header_line).map_err(HeaderIssue::into_error)?;

    let mut rows = Vec::new();
    let mut subject_id: Option<String> = None;

    for (line_no, line) in lines.enumerate() {
        let cells: Vec<&str> = line.split('\t').collect();
        let subject = columns.cell(&cells, columns.subject);

        if subject.is_empty() {
            if drop_missing_subject {
                continue;
            }
        } else if subject_id.is_none() {
            subject_id = Some(subject.to_string());
        }

        let time_cell = columns.cell(&cells, columns.time);
        let time_ticks = time_cell.trim().parse::<i64>().map_err(|_| {
            ExtractError::MalformedLog(format!(
                "data row {line_no}: cannot parse Time value {time_cell:?} as an integer"
            ))
        })?;

        rows.push(EventRow {
            code: columns.cell(&cells, columns.code).to_string(),
            time_ticks,
            stim_type: columns.stim_type.and_then(|i| {
                let cell = columns.cell(&cells, Some(i));
                (!cell.is_empty()).then(|| cell.to_string())
            }),
        });
    }

    let subject_id = subject_id
        .ok_or_else(|| ExtractError::MalformedLog("file has no data rows".to_string()))?;

    Ok(RunLog { subject_id, rows })
}

/// What made a candidate header line unusable
enum HeaderIssue {
    NoSubject,
    MissingColumns,
}

impl HeaderIssue {
    fn into_error(self) -> ExtractError {
        match self {
            Self::NoSubject => ExtractError::MalformedLog(
                "no subject column found under either metadata offset".to_string(),
            ),
            Self::MissingColumns => ExtractError::MalformedLog(
                "header has a subject column but no Code or Time column".to_string(),
            ),
        }
    }
}

/// Resolved column positions in the tab-separated header
struct Columns {
    subject: Option<usize>,
    code: Option<usize>,
    time: Option<usize>,
    stim_type: Option<usize>,
}

impl Columns {
    fn from_header(header_line: &str) -> Result<Self, HeaderIssue> {
        let names: Vec<&str> = header_line.split('\t').map(str::trim).collect();

        let subject = names.iter().position(|n| n.contains("Subject"));
        if subject.is_none() {
            return Err(HeaderIssue::NoSubject);
        }

        let code = names.iter().position(|n| *n == "Code");
        let time = names.iter().position(|n| *n == "Time");
        if code.is_none() || time.is_none() {
            return Err(HeaderIssue::MissingColumns);
        }

        Ok(Self {
            subject,
            code,
            time,
            stim_type: names.iter().position(|n| *n == "Stim Type"),
        })
    }

    fn cell<'a>(&self, cells: &[&'a str], index: Option<usize>) -> &'a str {
        index.and_then(|i| cells.get(i).copied()).unwrap_or("").trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROPER_LOG: &str = "\
Scenario - localizer
Logfile written - 06/12/2024

Subject\tTrial\tEvent Type\tCode\tTime\tStim Type
S01\t1\tPicture\tblock_faces\t120000\t
S01\t2\tPicture\ttarget_flash\t150000\thit
S01\t3\tPicture\tend_block\t480000\t
";

    // One extra metadata line before the header; trailing rows without a
    // subject value must be dropped on the retry path.
    const OFFSET_LOG: &str = "\
Scenario - localizer
Logfile written - 06/12/2024
Build - 23.1

Subject\tTrial\tEvent Type\tCode\tTime\tStim Type
S02\t1\tPicture\tblock_houses\t0\t
S02\t2\tPicture\tend_block\t90000\tmiss
\t\tPicture\tquit\tsummary\t
";

    #[test]
    fn test_load_with_primary_skip() {
        let run = load_run_log(PROPER_LOG).unwrap();

        assert_eq!(run.subject_id, "S01");
        assert_eq!(run.rows.len(), 3);
        assert_eq!(run.rows[0].code, "block_faces");
        assert_eq!(run.rows[0].time_ticks, 120_000);
        assert_eq!(run.rows[0].stim_type, None);
        assert_eq!(run.rows[1].stim_type.as_deref(), Some("hit"));
    }

    #[test]
    fn test_load_retries_with_extra_skip() {
        let run = load_run_log(OFFSET_LOG).unwrap();

        assert_eq!(run.subject_id, "S02");
        // The subject-less trailing row is dropped on the retry path
        assert_eq!(run.rows.len(), 2);
        assert_eq!(run.rows[1].code, "end_block");
    }

    #[test]
    fn test_missing_subject_column_fails_both_attempts() {
        let text = "\
meta
meta
Trial\tCode\tTime
1\tblock1\t0
";
        let err = load_run_log(text).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedLog(_)));
    }

    #[test]
    fn test_subject_without_code_or_time_names_the_gap() {
        let text = "\
meta
meta
Subject\tTrial\tDuration
S01\t1\t500
";
        let err = load_run_log(text).unwrap_err();
        assert!(err.to_string().contains("no Code or Time column"), "{err}");
    }

    #[test]
    fn test_unparseable_time_is_malformed() {
        let text = "\
meta
meta
Subject\tCode\tTime
S01\tblock1\tnot-a-number
";
        let err = load_run_log(text).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedLog(_)));
    }

    #[test]
    fn test_empty_file_is_malformed() {
        assert!(matches!(
            load_run_log(""),
            Err(ExtractError::MalformedLog(_))
        ));
    }

    #[test]
    fn test_missing_stim_type_column() {
        let text = "\
meta
meta
Subject\tCode\tTime
S03\tblock1\t0
S03\tend_block\t50000
";
        let run = load_run_log(text).unwrap();
        assert!(run.rows.iter().all(|r| r.stim_type.is_none()));
    }
}
