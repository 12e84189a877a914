//! Per-subject behavior accumulation
//!
//! This module manages the accumulator file that collects response tallies
//! for one subject across all of their runs. The file is an explicit
//! collaborator with a load → append → atomic-write lifecycle; a missing or
//! unreadable prior file means "no prior data", never an error.
//!
//! Entries are appended, never merged: the same (subject, run, lvl) key may
//! appear once per processed file.

use crate::types::TallyEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Accumulated response tallies for one subject
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorAccumulator {
    /// When the accumulator was last written
    pub updated_at: Option<DateTime<Utc>>,
    pub entries: Vec<TallyEntry>,
}

impl BehaviorAccumulator {
    /// Accumulator file path for a subject inside `dir`
    pub fn path_for(dir: &Path, subject: &str) -> PathBuf {
        dir.join(format!("beh_results_{subject}.json"))
    }

    /// Load an accumulator from disk, or start fresh if the file is missing
    /// or unreadable
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!(path = ?path, error = %e, "unreadable accumulator, starting fresh");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Append tally entries for one run
    pub fn append(&mut self, entries: Vec<TallyEntry>) {
        self.entries.extend(entries);
    }

    /// Write the accumulator to disk atomically (temp file + rename),
    /// stamping `updated_at`
    pub fn save(&mut self, path: &Path) -> std::io::Result<()> {
        self.updated_at = Some(Utc::now());
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(())
    }

    /// Load an accumulator from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the accumulator to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
