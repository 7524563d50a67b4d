//! Side-effect boundary for the drowsiness monitor.
//!
//! The monitor core requests tones, screenshots, and log records; the
//! implementations behind these traits decide what actually happens, with
//! platform-specific choices made here rather than in the core.

pub mod log;
pub mod snapshot;
pub mod tone;

// Re-export commonly used types
pub use log::{AlertLog, DEFAULT_LOG_FILENAME, LOG_HEADER};
pub use snapshot::{snapshot_filename, NullSnapshotSink, SnapshotSink};
pub use tone::{DefaultToneSink, NullToneSink, TerminalBellTone, ToneSink};

#[cfg(target_os = "windows")]
pub use tone::WinBeepTone;
