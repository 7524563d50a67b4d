//! Demonstration of the drowsiness monitor pipeline.
//!
//! This example shows how to:
//! 1. Build a monitor with null side-effect sinks
//! 2. Feed it synthetic landmark frames
//! 3. Read per-frame overlay data and alert events
//! 4. Inspect session statistics
//!
//! Run with: cargo run --example replay_demo

use chrono::{Duration, Utc};
use drowsiness_monitor_agent::{
    alert::{AlertLog, NullSnapshotSink, NullToneSink},
    core::{DrowsinessMonitor, GateStatus, MonitorConfig},
    landmarks::{EyeLandmarks, FaceLandmarks, MouthLandmarks, Point2D},
    stats::create_shared_stats,
};

/// Synthetic eye landmarks producing exactly the given EAR.
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

/// Synthetic mouth landmarks producing exactly the given MAR.
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

fn main() {
    println!("Drowsiness Monitor Agent - Replay Demo");
    println!("======================================");
    println!();

    let stats = create_shared_stats();
    let log_path = std::env::temp_dir().join("drowsiness_demo_log.csv");
    let mut monitor = DrowsinessMonitor::new(
        MonitorConfig::default(),
        Box::new(NullToneSink),
        Box::new(NullSnapshotSink::new()),
        AlertLog::new(log_path.clone()),
        stats.clone(),
    );

    println!("Session ID: {}", stats.session_id());
    println!();

    // A one-minute story at 2 fps: alert eyes, a long blink-turned-doze,
    // recovery, then a sustained yawn.
    let start = Utc::now();
    let mut scenario: Vec<(i64, Option<FaceLandmarks>)> = Vec::new();
    for i in 0..10 {
        scenario.push((i * 500, Some(face(0.32, 0.30)))); // awake
    }
    for i in 10..20 {
        scenario.push((i * 500, Some(face(0.10, 0.30)))); // eyes closed 5s
    }
    for i in 20..24 {
        scenario.push((i * 500, None)); // face lost
    }
    for i in 24..30 {
        scenario.push((i * 500, Some(face(0.31, 0.85)))); // yawning 3s
    }

    for (offset_ms, landmarks) in scenario {
        let now = start + Duration::milliseconds(offset_ms);
        let update = monitor.process_frame(landmarks.as_ref(), now);

        let marker = match (update.eye_gate, update.mouth_gate) {
            (GateStatus::Fired, _) | (_, GateStatus::Fired) => " <<<",
            (GateStatus::Pending, _) | (_, GateStatus::Pending) => " ...",
            _ => "",
        };
        println!(
            "  [{:>5}ms] {}{}",
            offset_ms,
            update.overlay_lines().join(" | "),
            marker
        );

        for alert in &update.alerts {
            println!("           ALERT: {}", alert.kind.label());
        }
    }

    println!();
    println!("{}", stats.summary());
    println!();
    println!("Alert log written to {log_path:?}");
    println!("Demo complete!");
}
