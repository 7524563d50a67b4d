//! Append-only CSV log of alert events.
//!
//! Format: header row `Timestamp,Event`, one row per alert,
//! timestamps rendered in local time as `YYYY-MM-DD HH:MM:SS`. The file is
//! created with its header on first use and never truncated afterwards.

use crate::core::monitor::AlertKind;
use chrono::{DateTime, Local, Utc};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Header row written when the log file is created.
pub const LOG_HEADER: &str = "Timestamp,Event";

/// Default log file name.
pub const DEFAULT_LOG_FILENAME: &str = "drowsiness_log.csv";

/// Append-only alert record sink.
#[derive(Debug, Clone)]
pub struct AlertLog {
    path: PathBuf,
}

impl AlertLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one alert record, creating the file with its header first if
    /// it does not exist yet.
    pub fn append(&self, timestamp: DateTime<Utc>, kind: AlertKind) -> io::Result<()> {
        self.ensure_header()?;

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        // Labels are fixed strings without delimiters, so rows need no quoting.
        writeln!(
            file,
            "{},{}",
            timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            kind.label()
        )
    }

    /// Read the most recent `count` record rows (header excluded).
    pub fn read_recent(&self, count: usize) -> io::Result<Vec<String>> {
        let file = File::open(&self.path)?;
        let rows: Vec<String> = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .skip(1) // header
            .collect();

        let start = rows.len().saturating_sub(count);
        Ok(rows[start..].to_vec())
    }

    fn ensure_header(&self) -> io::Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&self.path)?;
        writeln!(file, "{LOG_HEADER}")
    }
}
