//! Screenshot capture requests behind the [`SnapshotSink`] boundary.
//!
//! The monitor core never sees frame pixels; when an alert calls for a
//! screenshot it asks the sink to capture whatever frame the display layer
//! is currently holding. The crate ships only a null implementation;
//! actual image capture belongs to the capture collaborator.

use chrono::{DateTime, Local, Utc};
use std::io;
use std::path::PathBuf;

/// File name for a screenshot captured at the given instant, rendered in
/// local time: `screenshot_HH-MM-SS.jpg`.
pub fn snapshot_filename(timestamp: DateTime<Utc>) -> String {
    format!(
        "screenshot_{}.jpg",
        timestamp.with_timezone(&Local).format("%H-%M-%S")
    )
}

/// Captures the current frame to disk on request.
pub trait SnapshotSink: Send {
    /// Capture a snapshot for an alert raised at `timestamp`; returns the
    /// path the image was (or would be) written to.
    fn capture(&mut self, timestamp: DateTime<Utc>) -> io::Result<PathBuf>;
}

/// A sink that records snapshot requests without touching the filesystem.
/// Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullSnapshotSink {
    requests: u64,
}

impl NullSnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots that have been requested.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl SnapshotSink for NullSnapshotSink {
    fn capture(&mut self, timestamp: DateTime<Utc>) -> io::Result<PathBuf> {
        self.requests += 1;
        Ok(PathBuf::from(snapshot_filename(timestamp)))
    }
}
