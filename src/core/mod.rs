//! Core signal-to-event pipeline.
//!
//! This module contains:
//! - Aspect-ratio computation from landmark geometry
//! - The duration gate debounce primitive
//! - The per-frame drowsiness monitor tying the two together

pub mod gate;
pub mod geometry;
pub mod monitor;

// Re-export commonly used types
pub use gate::{DurationGate, FireMode, GateStatus};
pub use geometry::{compute_metrics, distance, eye_aspect_ratio, mouth_aspect_ratio, FrameMetrics};
pub use monitor::{AlertEvent, AlertKind, DrowsinessMonitor, FrameUpdate, MonitorConfig};
