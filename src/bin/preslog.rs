//! Preslog CLI - Command-line interface for preslog
//!
//! Commands:
//! - process: Batch-process every log file in a directory
//! - extract: Extract one file's result table to CSV
//! - validate: Parse and segment a file without writing outputs

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use preslog::pipeline::{process_directory, process_run};
use preslog::{ExtractError, PRESLOG_VERSION, PRODUCER_NAME};

/// Preslog - block/cue interval extraction from Presentation experiment logs
#[derive(Parser)]
#[command(name = "preslog")]
#[command(version = PRESLOG_VERSION)]
#[command(about = "Extract interval tables and response tallies from Presentation logs", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Batch-process every log file in a directory
    Process {
        /// Directory of log files (prompted for when omitted)
        dir: Option<PathBuf>,

        /// Where result CSVs and accumulators are written (default: the
        /// input directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Extract one file's result table to CSV
    Extract {
        /// Input log file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Parse and segment a file without writing outputs
    Validate {
        /// Input log file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ExtractError> {
    match cli.command {
        Commands::Process { dir, out_dir } => cmd_process(dir, out_dir),
        Commands::Extract { input, output } => cmd_extract(&input, &output),
        Commands::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn cmd_process(dir: Option<PathBuf>, out_dir: Option<PathBuf>) -> Result<(), ExtractError> {
    let dir = match dir {
        Some(dir) => dir,
        None => prompt_for_directory()?,
    };
    let out_dir = out_dir.unwrap_or_else(|| dir.clone());

    let outcomes = process_directory(&dir, &out_dir)?;

    let mut processed = 0;
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.outcome {
            Ok(summary) => {
                processed += 1;
                println!(
                    "{}: subject {} run {} -> {} interval rows, {} tally entries",
                    outcome.file,
                    summary.subject_id,
                    summary.run_id,
                    summary.interval_rows,
                    summary.tally_entries,
                );
            }
            Err(e) => {
                failed += 1;
                println!("{}: FAILED ({e})", outcome.file);
            }
        }
    }
    println!("{processed} processed, {failed} failed");

    Ok(())
}

fn cmd_extract(input: &Path, output: &Path) -> Result<(), ExtractError> {
    let (text, file_name) = read_input(input)?;
    let result = process_run(&text, &file_name)?;
    let csv = result.table.to_csv();

    if output.to_string_lossy() == "-" {
        print!("{csv}");
    } else {
        std::fs::write(output, csv)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), ExtractError> {
    let (text, file_name) = read_input(input)?;

    let run = preslog::loader::load_run_log(&text)?;
    let run = preslog::normalizer::normalize_timebase(run);

    let block_markers = run
        .rows
        .iter()
        .filter(|r| r.code.to_lowercase().contains("block"))
        .count();
    let cue_markers = run
        .rows
        .iter()
        .filter(|r| r.code.to_lowercase().contains("cue"))
        .count();

    let report = ValidationReport {
        file: file_name,
        subject: run.subject_id.clone(),
        rows: run.rows.len(),
        block_markers,
        block_intervals: preslog::segment::find_block_spans(&run.rows)
            .map(|spans| spans.len() - 1),
        cue_markers,
        cue_intervals: preslog::segment::find_cue_spans(&run.rows).map(|spans| spans.len()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("File:            {}", report.file);
        println!("Subject:         {}", report.subject);
        println!("Rows:            {}", report.rows);
        println!("Block markers:   {}", report.block_markers);
        match &report.block_intervals {
            Ok(n) => println!("Block intervals: {n}"),
            Err(e) => println!("Block intervals: INVALID ({e})"),
        }
        println!("Cue markers:     {}", report.cue_markers);
        match &report.cue_intervals {
            Ok(n) => println!("Cue intervals:   {n}"),
            Err(e) => println!("Cue intervals:   INVALID ({e})"),
        }
    }

    Ok(())
}

/// Read a log file, or stdin when the path is `-`
fn read_input(input: &Path) -> Result<(String, String), ExtractError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok((buffer, "stdin".to_string()))
    } else {
        let text = std::fs::read_to_string(input)?;
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok((text, file_name))
    }
}

/// Interactive fallback when no directory argument is given
fn prompt_for_directory() -> Result<PathBuf, ExtractError> {
    print!("Pass path to folder: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    file: String,
    subject: String,
    rows: usize,
    block_markers: usize,
    #[serde(serialize_with = "serialize_verdict")]
    block_intervals: Result<usize, ExtractError>,
    cue_markers: usize,
    #[serde(serialize_with = "serialize_verdict")]
    cue_intervals: Result<usize, ExtractError>,
}

fn serialize_verdict<S: serde::Serializer>(
    verdict: &Result<usize, ExtractError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match verdict {
        Ok(n) => serializer.serialize_u64(*n as u64),
        Err(e) => serializer.serialize_str(&e.to_string()),
    }
}

// Error types

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ExtractError> for CliError {
    fn from(e: ExtractError) -> Self {
        let (code, hint) = match &e {
            ExtractError::MalformedLog(_) => (
                "MALFORMED_LOG",
                "Check that the file is a tab-separated Presentation log with a Subject column",
            ),
            ExtractError::UnpairedBoundary { .. } => (
                "UNPAIRED_BOUNDARY",
                "The log has an odd number of block markers; the run is incomplete",
            ),
            ExtractError::OutOfRangeCue { .. } => (
                "OUT_OF_RANGE_CUE",
                "A cue marker is the last row of the file and has no closing row",
            ),
            ExtractError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
            ExtractError::Json(_) => ("JSON_ERROR", "Check the accumulator file contents"),
        };

        CliError {
            code: code.to_string(),
            message: format!("{PRODUCER_NAME}: {e}"),
            hint: Some(hint.to_string()),
        }
    }
}
