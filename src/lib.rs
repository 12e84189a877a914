//! Preslog - block/cue interval extraction from Presentation experiment logs
//!
//! Preslog turns the timestamped event stream of a Presentation log file into
//! per-run result tables through a deterministic pipeline: loading →
//! timebase normalization → interval extraction → feature resolution →
//! result assembly.
//!
//! ## Modules
//!
//! - **Loader**: Parse tab-separated logs with variable metadata offsets
//! - **Normalizer**: Rebase the clock to milliseconds from file start
//! - **Segment/Features**: Pair block and cue markers, derive durations and
//!   target presence
//! - **Assembler**: Merge intervals into the per-run CSV result table
//! - **Tally/Accumulator**: Count response categories and accumulate them
//!   per subject across runs

pub mod accumulator;
pub mod assembler;
pub mod error;
pub mod features;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod segment;
pub mod tally;
pub mod types;

pub use accumulator::BehaviorAccumulator;
pub use error::ExtractError;
pub use pipeline::{process_directory, process_run, run_id_from_filename, FileOutcome, RunResult};

/// Preslog version embedded in CLI reports
pub const PRESLOG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI reports
pub const PRODUCER_NAME: &str = "preslog";
