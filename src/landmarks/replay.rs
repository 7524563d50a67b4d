//! Replay frame source reading recorded landmark observations from a file.
//!
//! Live landmark extraction is an external capability; this source stands in
//! for it by streaming a recording (one serde-encoded [`FrameObservation`]
//! per line, JSONL) through a bounded channel, the same shape a camera
//! front-end would use. Frames can be paced to their recorded timestamps or
//! delivered as fast as the consumer drains them.

use crate::landmarks::types::FrameObservation;
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Configuration for a replay source.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Path to the JSONL recording
    pub path: PathBuf,
    /// Sleep between frames to match recorded timestamp gaps
    pub pace: bool,
}

impl ReplayConfig {
    pub fn new(path: PathBuf) -> Self {
        Self { path, pace: true }
    }
}

/// Errors that can occur while running a frame source.
#[derive(Debug)]
pub enum SourceError {
    AlreadyRunning,
    Exhausted,
    IoError(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::AlreadyRunning => write!(f, "Source is already running"),
            SourceError::Exhausted => write!(f, "Source has already been consumed"),
            SourceError::IoError(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A frame source that replays a recorded landmark stream.
///
/// Single-shot: once the recording is exhausted the producer thread exits
/// and the channel disconnects, which consumers treat as end-of-capture.
pub struct ReplaySource {
    config: ReplayConfig,
    sender: Option<Sender<FrameObservation>>,
    receiver: Receiver<FrameObservation>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Create a new replay source for the given recording.
    pub fn new(config: ReplayConfig) -> Self {
        // Bounded so a slow consumer applies backpressure instead of
        // buffering the whole recording.
        let (sender, receiver) = bounded(1_000);
        Self {
            config,
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start streaming frames in a background thread.
    ///
    /// Returns an error if the source is already running, has already been
    /// consumed, or the recording cannot be opened.
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        // Open before taking the sender so a bad path leaves the source usable
        let file =
            File::open(&self.config.path).map_err(|e| SourceError::IoError(e.to_string()))?;
        let sender = self.sender.take().ok_or(SourceError::Exhausted)?;

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let pace = self.config.pace;

        let handle = thread::spawn(move || {
            run_replay_loop(file, sender, running.clone(), pace);
            running.store(false, Ordering::SeqCst);
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop streaming and join the producer thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the source is currently streaming.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for frame observations.
    pub fn receiver(&self) -> &Receiver<FrameObservation> {
        &self.receiver
    }
}

/// Read the recording line by line and feed the channel until the file ends,
/// the consumer hangs up, or the run flag clears.
fn run_replay_loop(
    file: File,
    sender: Sender<FrameObservation>,
    running: Arc<AtomicBool>,
    pace: bool,
) {
    let reader = BufReader::new(file);
    let mut previous: Option<chrono::DateTime<chrono::Utc>> = None;

    for (line_no, line) in reader.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Warning: replay read error at line {}: {e}", line_no + 1);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let observation: FrameObservation = match serde_json::from_str(&line) {
            Ok(obs) => obs,
            Err(e) => {
                // Malformed frame: skip, keep streaming the rest.
                eprintln!("Warning: skipping malformed frame at line {}: {e}", line_no + 1);
                continue;
            }
        };

        if pace {
            if let Some(prev) = previous {
                let gap = observation.timestamp - prev;
                if let Ok(gap) = gap.to_std() {
                    thread::sleep(gap);
                }
            }
        }
        previous = Some(observation.timestamp);

        // Bounded send with a timeout so stop() can interrupt a full channel
        let mut pending = observation;
        loop {
            match sender.send_timeout(pending, std::time::Duration::from_millis(100)) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(returned)) => {
                    if !running.load(Ordering::SeqCst) {
                        return;
                    }
                    pending = returned;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    // Consumer hung up
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::types::FrameObservation;
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    fn write_recording(frames: &[FrameObservation]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for frame in frames {
            writeln!(file, "{}", serde_json::to_string(frame).unwrap()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_replay_streams_and_disconnects() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let frames: Vec<FrameObservation> = (0..5)
            .map(|i| FrameObservation::no_face(ts + chrono::Duration::milliseconds(i * 33)))
            .collect();
        let file = write_recording(&frames);

        let mut config = ReplayConfig::new(file.path().to_path_buf());
        config.pace = false;
        let mut source = ReplaySource::new(config);
        source.start().unwrap();

        let mut received = 0;
        while let Ok(obs) = source
            .receiver()
            .recv_timeout(std::time::Duration::from_secs(2))
        {
            assert!(obs.landmarks.is_none());
            received += 1;
        }
        assert_eq!(received, 5);

        source.stop();
        assert!(!source.is_running());
    }

    #[test]
    fn test_replay_skips_malformed_lines() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "{}",
            serde_json::to_string(&FrameObservation::no_face(ts)).unwrap()
        )
        .unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(
            file,
            "{}",
            serde_json::to_string(&FrameObservation::no_face(ts)).unwrap()
        )
        .unwrap();
        file.flush().unwrap();

        let mut config = ReplayConfig::new(file.path().to_path_buf());
        config.pace = false;
        let mut source = ReplaySource::new(config);
        source.start().unwrap();

        let mut received = 0;
        while source
            .receiver()
            .recv_timeout(std::time::Duration::from_secs(2))
            .is_ok()
        {
            received += 1;
        }
        assert_eq!(received, 2);
    }

    #[test]
    fn test_replay_is_single_shot() {
        let file = write_recording(&[]);
        let mut config = ReplayConfig::new(file.path().to_path_buf());
        config.pace = false;
        let mut source = ReplaySource::new(config);
        source.start().unwrap();
        source.stop();

        match source.start() {
            Err(SourceError::Exhausted) => {}
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let config = ReplayConfig::new(PathBuf::from("/nonexistent/frames.jsonl"));
        let mut source = ReplaySource::new(config);
        match source.start() {
            Err(SourceError::IoError(_)) => {}
            other => panic!("expected IoError, got {other:?}"),
        }
    }
}
