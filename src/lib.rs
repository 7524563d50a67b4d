//! Drowsiness Monitor Agent - frame-driven fatigue alerting from facial geometry.
//!
//! This library converts noisy per-frame facial landmark geometry into
//! debounced, duration-gated alert events: prolonged eye closure raises a
//! drowsiness alert, prolonged wide mouth opening raises a yawn alert.
//! Landmark extraction, frame capture, and alert playback are external
//! collaborators behind narrow boundaries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Drowsiness Monitor Agent                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Landmarks  │──▶│  Geometry   │──▶│  Duration   │       │
//! │  │  (frames)   │   │ (EAR / MAR) │   │   Gates     │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                                             │               │
//! │                        ┌────────────────────┤               │
//! │                        ▼                    ▼               │
//! │                 ┌─────────────┐      ┌─────────────┐       │
//! │                 │   Overlay   │      │ Alert Sinks │       │
//! │                 │  (EAR/MAR)  │      │(tone,shot,log)│     │
//! │                 └─────────────┘      └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use drowsiness_monitor_agent::{
//!     alert::{AlertLog, NullSnapshotSink, NullToneSink},
//!     core::{DrowsinessMonitor, MonitorConfig},
//!     stats::create_shared_stats,
//! };
//!
//! let mut monitor = DrowsinessMonitor::new(
//!     MonitorConfig::default(),
//!     Box::new(NullToneSink),
//!     Box::new(NullSnapshotSink::new()),
//!     AlertLog::new("drowsiness_log.csv".into()),
//!     create_shared_stats(),
//! );
//!
//! // Per frame: hand the monitor the landmarks (or None) and a timestamp.
//! let update = monitor.process_frame(None, chrono::Utc::now());
//! assert!(update.alerts.is_empty());
//! ```

pub mod alert;
pub mod config;
pub mod core;
pub mod landmarks;
pub mod stats;

// Re-export key types at crate root for convenience
pub use alert::{AlertLog, DefaultToneSink, NullSnapshotSink, NullToneSink, SnapshotSink, ToneSink};
pub use config::Config;
pub use core::{
    AlertEvent, AlertKind, DrowsinessMonitor, DurationGate, FireMode, FrameMetrics, FrameUpdate,
    GateStatus, MonitorConfig,
};
pub use landmarks::{FaceLandmarks, FrameObservation, Point2D, ReplayConfig, ReplaySource};
pub use stats::{create_shared_stats, SessionStats, SharedSessionStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
