//! Session statistics for the drowsiness monitor.
//!
//! Tracks how many frames were processed and what the monitor did with
//! them. Counters are cumulative across sessions when persistence is
//! enabled; the session id is fresh per run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Counters describing a monitoring session.
#[derive(Debug)]
pub struct SessionStats {
    /// Frames fed through the monitor
    frames_processed: AtomicU64,
    /// Frames with no face detected
    no_face_frames: AtomicU64,
    /// Frames skipped for gating because of degenerate landmarks
    degenerate_frames: AtomicU64,
    /// Eyes-closed-too-long alerts fired
    eye_alerts: AtomicU64,
    /// Yawn alerts fired
    yawn_alerts: AtomicU64,
    /// Side-effect dispatches that failed (tone, snapshot, log)
    sink_failures: AtomicU64,
    /// Identifier for this run
    session_id: Uuid,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl SessionStats {
    /// Create new session statistics.
    pub fn new() -> Self {
        Self {
            frames_processed: AtomicU64::new(0),
            no_face_frames: AtomicU64::new(0),
            degenerate_frames: AtomicU64::new(0),
            eye_alerts: AtomicU64::new(0),
            yawn_alerts: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            session_id: Uuid::new_v4(),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create session statistics with persistence, resuming cumulative
    /// counters from a previous run when present.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            eprintln!("Note: Could not load previous session stats: {e}");
        }

        stats
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn record_frame(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_face_frame(&self) {
        self.no_face_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_degenerate_frame(&self) {
        self.degenerate_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eye_alert(&self) {
        self.eye_alerts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_yawn_alert(&self) {
        self.yawn_alerts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            no_face_frames: self.no_face_frames.load(Ordering::Relaxed),
            degenerate_frames: self.degenerate_frames.load(Ordering::Relaxed),
            eye_alerts: self.eye_alerts.load(Ordering::Relaxed),
            yawn_alerts: self.yawn_alerts.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            session_id: self.session_id,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let s = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Session id: {}\n\
             - Frames processed: {}\n\
             - Frames without a face: {}\n\
             - Frames with degenerate landmarks: {}\n\
             - Drowsiness alerts: {}\n\
             - Yawn alerts: {}\n\
             - Side-effect failures: {}\n\
             - Session duration: {} seconds",
            s.session_id,
            s.frames_processed,
            s.no_face_frames,
            s.degenerate_frames,
            s.eye_alerts,
            s.yawn_alerts,
            s.sink_failures,
            s.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let s = self.snapshot();
            let persisted = PersistedStats {
                frames_processed: s.frames_processed,
                no_face_frames: s.no_face_frames,
                degenerate_frames: s.degenerate_frames,
                eye_alerts: s.eye_alerts,
                yawn_alerts: s.yawn_alerts,
                sink_failures: s.sink_failures,
                last_session_id: s.session_id,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.frames_processed
                    .store(persisted.frames_processed, Ordering::Relaxed);
                self.no_face_frames
                    .store(persisted.no_face_frames, Ordering::Relaxed);
                self.degenerate_frames
                    .store(persisted.degenerate_frames, Ordering::Relaxed);
                self.eye_alerts.store(persisted.eye_alerts, Ordering::Relaxed);
                self.yawn_alerts
                    .store(persisted.yawn_alerts, Ordering::Relaxed);
                self.sink_failures
                    .store(persisted.sink_failures, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.frames_processed.store(0, Ordering::Relaxed);
        self.no_face_frames.store(0, Ordering::Relaxed);
        self.degenerate_frames.store(0, Ordering::Relaxed);
        self.eye_alerts.store(0, Ordering::Relaxed);
        self.yawn_alerts.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames_processed: u64,
    pub no_face_frames: u64,
    pub degenerate_frames: u64,
    pub eye_alerts: u64,
    pub yawn_alerts: u64,
    pub sink_failures: u64,
    pub session_id: Uuid,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    frames_processed: u64,
    no_face_frames: u64,
    degenerate_frames: u64,
    eye_alerts: u64,
    yawn_alerts: u64,
    sink_failures: u64,
    last_session_id: Uuid,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared session stats.
pub type SharedSessionStats = Arc<SessionStats>;

/// Create new shared session stats.
pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}

/// Create shared session stats with persistence.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedSessionStats {
    Arc::new(SessionStats::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting() {
        let stats = SessionStats::new();

        stats.record_frame();
        stats.record_frame();
        stats.record_no_face_frame();
        stats.record_eye_alert();

        let s = stats.snapshot();
        assert_eq!(s.frames_processed, 2);
        assert_eq!(s.no_face_frames, 1);
        assert_eq!(s.eye_alerts, 1);
        assert_eq!(s.yawn_alerts, 0);
    }

    #[test]
    fn test_reset() {
        let stats = SessionStats::new();
        stats.record_frame();
        stats.record_yawn_alert();
        stats.record_sink_failure();
        stats.reset();

        let s = stats.snapshot();
        assert_eq!(s.frames_processed, 0);
        assert_eq!(s.yawn_alerts, 0);
        assert_eq!(s.sink_failures, 0);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session_stats.json");

        let stats = SessionStats::with_persistence(path.clone());
        stats.record_frame();
        stats.record_frame();
        stats.record_eye_alert();
        stats.save().unwrap();

        let resumed = SessionStats::with_persistence(path);
        let s = resumed.snapshot();
        assert_eq!(s.frames_processed, 2);
        assert_eq!(s.eye_alerts, 1);
        // Session id is fresh per run
        assert_ne!(resumed.session_id(), stats.session_id());
    }

    #[test]
    fn test_summary_format() {
        let stats = SessionStats::new();
        let summary = stats.summary();

        assert!(summary.contains("Frames processed"));
        assert!(summary.contains("Drowsiness alerts"));
        assert!(summary.contains("Yawn alerts"));
    }
}
