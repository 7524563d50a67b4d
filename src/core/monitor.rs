//! Per-frame orchestration: metrics → gates → alerts and side effects.
//!
//! [`DrowsinessMonitor`] owns the two duration gates and the injected
//! side-effect sinks. Each frame it derives the openness ratios, steps both
//! gates, and on a fired gate emits an alert event plus its side-effect
//! requests. Sink failures are reported and counted but never interrupt
//! frame processing; gate state for the next frame is unaffected.

use crate::alert::log::AlertLog;
use crate::alert::snapshot::SnapshotSink;
use crate::alert::tone::ToneSink;
use crate::core::gate::{DurationGate, FireMode, GateStatus};
use crate::core::geometry::{self, FrameMetrics};
use crate::landmarks::types::FaceLandmarks;
use crate::stats::SharedSessionStats;
use chrono::{DateTime, Duration, Utc};

/// Default eye-aspect-ratio threshold; below it the eyes count as closed.
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.25;

/// Default sustained-closure duration before a drowsiness alert.
pub const DEFAULT_EYE_CLOSED_SECS: i64 = 2;

/// Default mouth-aspect-ratio threshold; above it the mouth counts as wide open.
pub const DEFAULT_MAR_THRESHOLD: f64 = 0.7;

/// Default sustained-opening duration before a yawn alert.
pub const DEFAULT_YAWN_SECS: i64 = 2;

/// Tone for a drowsiness alert: 1000 Hz for 1000 ms.
const EYE_ALERT_TONE: (u32, u32) = (1000, 1000);

/// Tone for a yawn alert: 800 Hz for 800 ms.
const YAWN_ALERT_TONE: (u32, u32) = (800, 800);

/// The kind of behavioral alert raised by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    EyesClosedTooLong,
    YawnDetected,
}

impl AlertKind {
    /// Label written to the alert log.
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::EyesClosedTooLong => "Eyes Closed Too Long",
            AlertKind::YawnDetected => "Yawn Detected",
        }
    }

    /// Text shown by the display overlay while the alert is active.
    pub fn overlay_text(&self) -> &'static str {
        match self {
            AlertKind::EyesClosedTooLong => "DROWSINESS ALERT!",
            AlertKind::YawnDetected => "YAWNING DETECTED!",
        }
    }
}

/// One alert raised during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub timestamp: DateTime<Utc>,
}

/// Thresholds and gating behavior. Construction-time configuration; the
/// monitor bakes no hidden defaults into its logic.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// EAR below this counts as eyes closed
    pub ear_threshold: f64,
    /// How long the eyes must stay closed before alerting
    pub eye_closed_duration: Duration,
    /// MAR above this counts as mouth wide open
    pub mar_threshold: f64,
    /// How long the mouth must stay open before alerting
    pub yawn_duration: Duration,
    /// Repeat alerts every frame while sustained, or once per episode
    pub fire_mode: FireMode,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            eye_closed_duration: Duration::seconds(DEFAULT_EYE_CLOSED_SECS),
            mar_threshold: DEFAULT_MAR_THRESHOLD,
            yawn_duration: Duration::seconds(DEFAULT_YAWN_SECS),
            fire_mode: FireMode::Repeating,
        }
    }
}

/// Per-frame output handed to the display collaborator.
#[derive(Debug, Clone)]
pub struct FrameUpdate {
    /// Whether a face was present this frame
    pub face_detected: bool,
    /// Raw openness ratios (undetermined entries are `None`)
    pub metrics: FrameMetrics,
    /// Eye gate status after this frame
    pub eye_gate: GateStatus,
    /// Mouth gate status after this frame
    pub mouth_gate: GateStatus,
    /// Alerts raised this frame
    pub alerts: Vec<AlertEvent>,
}

impl FrameUpdate {
    /// Overlay text lines for rendering on the video frame.
    pub fn overlay_lines(&self) -> Vec<String> {
        let fmt = |value: Option<f64>| match value {
            Some(v) => format!("{v:.2}"),
            None => "--".to_string(),
        };

        let mut lines = vec![
            format!("EAR: {}", fmt(self.metrics.ear)),
            format!("MAR: {}", fmt(self.metrics.mar)),
        ];
        if self.eye_gate == GateStatus::Fired {
            lines.push(AlertKind::EyesClosedTooLong.overlay_text().to_string());
        }
        if self.mouth_gate == GateStatus::Fired {
            lines.push(AlertKind::YawnDetected.overlay_text().to_string());
        }
        lines
    }
}

/// Frame-driven drowsiness and yawn detector.
pub struct DrowsinessMonitor {
    config: MonitorConfig,
    eye_gate: DurationGate,
    mouth_gate: DurationGate,
    tone: Box<dyn ToneSink>,
    snapshots: Box<dyn SnapshotSink>,
    log: AlertLog,
    stats: SharedSessionStats,
}

impl DrowsinessMonitor {
    /// Create a monitor with the given configuration and sinks.
    pub fn new(
        config: MonitorConfig,
        tone: Box<dyn ToneSink>,
        snapshots: Box<dyn SnapshotSink>,
        log: AlertLog,
        stats: SharedSessionStats,
    ) -> Self {
        let eye_gate = DurationGate::with_mode(config.eye_closed_duration, config.fire_mode);
        let mouth_gate = DurationGate::with_mode(config.yawn_duration, config.fire_mode);
        Self {
            config,
            eye_gate,
            mouth_gate,
            tone,
            snapshots,
            log,
            stats,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Process one frame.
    ///
    /// `landmarks` is `None` when no face was detected; that observes both
    /// gates as condition-false so a dropout can neither extend nor falsely
    /// arm an alert. An undetermined ratio does the same for its own signal
    /// only. The clock is caller-supplied.
    pub fn process_frame(
        &mut self,
        landmarks: Option<&FaceLandmarks>,
        now: DateTime<Utc>,
    ) -> FrameUpdate {
        self.stats.record_frame();

        let metrics = match landmarks {
            Some(face) => {
                let metrics = geometry::compute_metrics(face);
                if metrics.ear.is_none() || metrics.mar.is_none() {
                    self.stats.record_degenerate_frame();
                }
                metrics
            }
            None => {
                self.stats.record_no_face_frame();
                FrameMetrics::default()
            }
        };

        let eyes_closed = metrics
            .ear
            .map(|ear| ear < self.config.ear_threshold)
            .unwrap_or(false);
        let mouth_open = metrics
            .mar
            .map(|mar| mar > self.config.mar_threshold)
            .unwrap_or(false);

        let eye_gate = self.eye_gate.observe(eyes_closed, now);
        let mouth_gate = self.mouth_gate.observe(mouth_open, now);

        let mut alerts = Vec::new();

        if eye_gate == GateStatus::Fired {
            alerts.push(AlertEvent {
                kind: AlertKind::EyesClosedTooLong,
                timestamp: now,
            });
            self.stats.record_eye_alert();
            self.dispatch_tone(EYE_ALERT_TONE);
            self.dispatch_snapshot(now);
            self.dispatch_log(now, AlertKind::EyesClosedTooLong);
        }

        if mouth_gate == GateStatus::Fired {
            alerts.push(AlertEvent {
                kind: AlertKind::YawnDetected,
                timestamp: now,
            });
            self.stats.record_yawn_alert();
            self.dispatch_tone(YAWN_ALERT_TONE);
            // No screenshot for yawns
            self.dispatch_log(now, AlertKind::YawnDetected);
        }

        FrameUpdate {
            face_detected: landmarks.is_some(),
            metrics,
            eye_gate,
            mouth_gate,
            alerts,
        }
    }

    fn dispatch_tone(&mut self, (frequency_hz, duration_ms): (u32, u32)) {
        if let Err(e) = self.tone.play(frequency_hz, duration_ms) {
            self.stats.record_sink_failure();
            eprintln!("Warning: tone playback failed: {e}");
        }
    }

    fn dispatch_snapshot(&mut self, now: DateTime<Utc>) {
        if let Err(e) = self.snapshots.capture(now) {
            self.stats.record_sink_failure();
            eprintln!("Warning: screenshot capture failed: {e}");
        }
    }

    fn dispatch_log(&mut self, now: DateTime<Utc>, kind: AlertKind) {
        if let Err(e) = self.log.append(now, kind) {
            self.stats.record_sink_failure();
            eprintln!("Warning: alert log append failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::snapshot::NullSnapshotSink;
    use crate::alert::tone::NullToneSink;
    use crate::landmarks::types::{EyeLandmarks, MouthLandmarks, Point2D};
    use crate::stats::create_shared_stats;
    use chrono::TimeZone;
    use std::io;

    fn eye_with_ear(ear: f64) -> EyeLandmarks {
        let h = 3.0 * ear;
        EyeLandmarks {
            points: [
                Point2D::new(0.0, 0.0),
                Point2D::new(2.0, -h),
                Point2D::new(4.0, -h),
                Point2D::new(6.0, 0.0),
                Point2D::new(4.0, h),
                Point2D::new(2.0, h),
            ],
        }
    }

    fn mouth_with_mar(mar: f64) -> MouthLandmarks {
        let g = 2.0 * mar;
        MouthLandmarks {
            points: [
                Point2D::new(2.0, -g),
                Point2D::new(2.0, g),
                Point2D::new(0.0, 0.0),
                Point2D::new(4.0, 0.0),
            ],
        }
    }

    fn face(ear: f64, mar: f64) -> FaceLandmarks {
        FaceLandmarks {
            left_eye: eye_with_ear(ear),
            right_eye: eye_with_ear(ear),
            mouth: mouth_with_mar(mar),
        }
    }

    fn t(offset_ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
            + chrono::Duration::milliseconds(offset_ms)
    }

    fn test_monitor(dir: &tempfile::TempDir) -> DrowsinessMonitor {
        DrowsinessMonitor::new(
            MonitorConfig::default(),
            Box::new(NullToneSink),
            Box::new(NullSnapshotSink::new()),
            AlertLog::new(dir.path().join("drowsiness_log.csv")),
            create_shared_stats(),
        )
    }

    /// A tone sink that always fails, for the non-fatal-failure path.
    struct FailingTone;

    impl ToneSink for FailingTone {
        fn play(&mut self, _f: u32, _d: u32) -> io::Result<()> {
            Err(io::Error::other("no audio device"))
        }
    }

    #[test]
    fn test_open_eyes_stay_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = test_monitor(&dir);

        for i in 0..5 {
            let update = monitor.process_frame(Some(&face(0.30, 0.3)), t(i * 1000));
            assert_eq!(update.eye_gate, GateStatus::Idle);
            assert!(update.alerts.is_empty());
        }
    }

    #[test]
    fn test_sustained_closure_fires_and_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = test_monitor(&dir);

        assert_eq!(
            monitor.process_frame(Some(&face(0.10, 0.3)), t(0)).eye_gate,
            GateStatus::Pending
        );
        assert_eq!(
            monitor
                .process_frame(Some(&face(0.10, 0.3)), t(1000))
                .eye_gate,
            GateStatus::Pending
        );

        let update = monitor.process_frame(Some(&face(0.10, 0.3)), t(2100));
        assert_eq!(update.eye_gate, GateStatus::Fired);
        assert_eq!(update.alerts.len(), 1);
        assert_eq!(update.alerts[0].kind, AlertKind::EyesClosedTooLong);

        // Still closed: repeating mode fires again
        let update = monitor.process_frame(Some(&face(0.10, 0.3)), t(2200));
        assert_eq!(update.eye_gate, GateStatus::Fired);
    }

    #[test]
    fn test_single_frame_yawn_spike_stays_pending() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = test_monitor(&dir);

        monitor.process_frame(Some(&face(0.30, 0.3)), t(0));
        let update = monitor.process_frame(Some(&face(0.30, 0.9)), t(1000));
        assert_eq!(update.mouth_gate, GateStatus::Pending);

        let update = monitor.process_frame(Some(&face(0.30, 0.3)), t(2000));
        assert_eq!(update.mouth_gate, GateStatus::Idle);
        assert!(update.alerts.is_empty());
    }

    #[test]
    fn test_no_face_resets_pending_gate() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = test_monitor(&dir);

        monitor.process_frame(Some(&face(0.10, 0.3)), t(0));
        for i in 1..=10 {
            let update = monitor.process_frame(None, t(i * 1000));
            assert!(!update.face_detected);
            assert_eq!(update.eye_gate, GateStatus::Idle);
        }

        // Closing again starts a fresh episode
        let update = monitor.process_frame(Some(&face(0.10, 0.3)), t(20_000));
        assert_eq!(update.eye_gate, GateStatus::Pending);
    }

    #[test]
    fn test_degenerate_landmarks_count_as_condition_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = test_monitor(&dir);

        monitor.process_frame(Some(&face(0.10, 0.3)), t(0));

        let degenerate = FaceLandmarks {
            left_eye: EyeLandmarks {
                points: [Point2D::new(1.0, 1.0); 6],
            },
            right_eye: eye_with_ear(0.10),
            mouth: mouth_with_mar(0.3),
        };
        let update = monitor.process_frame(Some(&degenerate), t(1000));
        assert_eq!(update.metrics.ear, None);
        assert_eq!(update.eye_gate, GateStatus::Idle);
    }

    #[test]
    fn test_alerts_append_log_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = test_monitor(&dir);

        monitor.process_frame(Some(&face(0.10, 0.3)), t(0));
        monitor.process_frame(Some(&face(0.10, 0.3)), t(1000));
        monitor.process_frame(Some(&face(0.10, 0.3)), t(2100));
        monitor.process_frame(Some(&face(0.10, 0.3)), t(3100));

        let log = AlertLog::new(dir.path().join("drowsiness_log.csv"));
        let rows = log.read_recent(100).unwrap();
        // Fired at 2.1s and 3.1s: one row per firing frame
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.contains("Eyes Closed Too Long")));
    }

    #[test]
    fn test_sink_failure_does_not_block_gating() {
        let dir = tempfile::tempdir().unwrap();
        let stats = create_shared_stats();
        let mut monitor = DrowsinessMonitor::new(
            MonitorConfig::default(),
            Box::new(FailingTone),
            Box::new(NullSnapshotSink::new()),
            AlertLog::new(dir.path().join("drowsiness_log.csv")),
            stats.clone(),
        );

        monitor.process_frame(Some(&face(0.10, 0.3)), t(0));
        let update = monitor.process_frame(Some(&face(0.10, 0.3)), t(2100));
        assert_eq!(update.eye_gate, GateStatus::Fired);

        // Next frame still fires despite the failed tone
        let update = monitor.process_frame(Some(&face(0.10, 0.3)), t(2200));
        assert_eq!(update.eye_gate, GateStatus::Fired);
        assert!(stats.snapshot().sink_failures >= 1);
    }

    #[test]
    fn test_one_shot_mode_alerts_once_per_episode() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig {
            fire_mode: FireMode::OneShot,
            ..MonitorConfig::default()
        };
        let mut monitor = DrowsinessMonitor::new(
            config,
            Box::new(NullToneSink),
            Box::new(NullSnapshotSink::new()),
            AlertLog::new(dir.path().join("drowsiness_log.csv")),
            create_shared_stats(),
        );

        monitor.process_frame(Some(&face(0.10, 0.3)), t(0));
        let update = monitor.process_frame(Some(&face(0.10, 0.3)), t(2100));
        assert_eq!(update.alerts.len(), 1);

        let update = monitor.process_frame(Some(&face(0.10, 0.3)), t(2200));
        assert!(update.alerts.is_empty());
        assert_eq!(update.eye_gate, GateStatus::Pending);
    }

    #[test]
    fn test_snapshot_only_for_eye_alerts() {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();

        struct CountingSnapshots(Arc<AtomicU64>);
        impl SnapshotSink for CountingSnapshots {
            fn capture(&mut self, ts: DateTime<Utc>) -> io::Result<std::path::PathBuf> {
                self.0.fetch_add(1, Ordering::Relaxed);
                Ok(std::path::PathBuf::from(
                    crate::alert::snapshot::snapshot_filename(ts),
                ))
            }
        }

        let captures = Arc::new(AtomicU64::new(0));
        let mut monitor = DrowsinessMonitor::new(
            MonitorConfig::default(),
            Box::new(NullToneSink),
            Box::new(CountingSnapshots(captures.clone())),
            AlertLog::new(dir.path().join("drowsiness_log.csv")),
            create_shared_stats(),
        );

        // Yawn sustained past threshold: alert fires, no snapshot requested
        monitor.process_frame(Some(&face(0.30, 0.9)), t(0));
        let update = monitor.process_frame(Some(&face(0.30, 0.9)), t(2100));
        assert_eq!(update.mouth_gate, GateStatus::Fired);
        assert_eq!(update.alerts[0].kind, AlertKind::YawnDetected);
        assert_eq!(captures.load(Ordering::Relaxed), 0);

        // A fired eye alert does request one
        monitor.process_frame(Some(&face(0.10, 0.3)), t(3000));
        monitor.process_frame(Some(&face(0.10, 0.3)), t(5200));
        assert_eq!(captures.load(Ordering::Relaxed), 1);

        let log = AlertLog::new(dir.path().join("drowsiness_log.csv"));
        let rows = log.read_recent(10).unwrap();
        assert!(rows[0].contains("Yawn Detected"));
    }

    #[test]
    fn test_overlay_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut monitor = test_monitor(&dir);

        let update = monitor.process_frame(Some(&face(0.30, 0.40)), t(0));
        let lines = update.overlay_lines();
        assert_eq!(lines[0], "EAR: 0.30");
        assert_eq!(lines[1], "MAR: 0.40");
        assert_eq!(lines.len(), 2);

        let update = monitor.process_frame(None, t(1000));
        let lines = update.overlay_lines();
        assert_eq!(lines[0], "EAR: --");
    }
}
