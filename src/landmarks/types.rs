//! Landmark geometry types for the drowsiness monitor.
//!
//! Landmarks arrive from an external face-geometry extractor as normalized
//! coordinates and are scaled into pixel space here. Region point order is
//! fixed and semantically meaningful; reordering silently corrupts the
//! aspect-ratio computation downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Number of points in the full face mesh produced by the landmark extractor.
pub const MESH_POINT_COUNT: usize = 468;

/// Mesh indices for the left eye, ordered
/// [outer corner, top-outer, top-inner, inner corner, bottom-inner, bottom-outer].
pub const LEFT_EYE_INDICES: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Mesh indices for the right eye, same ordering as [`LEFT_EYE_INDICES`].
pub const RIGHT_EYE_INDICES: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Mesh indices for the mouth, ordered [upper lip, lower lip, left corner, right corner].
pub const MOUTH_INDICES: [usize; 4] = [13, 14, 78, 308];

/// Six eye landmarks, ordered
/// [corner, top-outer, top-inner, opposite corner, bottom-inner, bottom-outer].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks {
    pub points: [Point2D; 6],
}

/// Four mouth landmarks, ordered [upper lip, lower lip, left corner, right corner].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouthLandmarks {
    pub points: [Point2D; 4],
}

/// One face worth of region landmarks for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub left_eye: EyeLandmarks,
    pub right_eye: EyeLandmarks,
    pub mouth: MouthLandmarks,
}

impl FaceLandmarks {
    /// Extract region landmarks from a full normalized face mesh.
    ///
    /// `mesh` holds normalized (0..1) coordinates; each selected point is
    /// scaled by the frame dimensions into pixel space. Returns `None` if the
    /// mesh has fewer than [`MESH_POINT_COUNT`] points.
    pub fn from_mesh(mesh: &[Point2D], frame_width: f64, frame_height: f64) -> Option<Self> {
        if mesh.len() < MESH_POINT_COUNT {
            return None;
        }

        let scale =
            |i: usize| Point2D::new(mesh[i].x * frame_width, mesh[i].y * frame_height);

        Some(Self {
            left_eye: EyeLandmarks {
                points: LEFT_EYE_INDICES.map(scale),
            },
            right_eye: EyeLandmarks {
                points: RIGHT_EYE_INDICES.map(scale),
            },
            mouth: MouthLandmarks {
                points: MOUTH_INDICES.map(scale),
            },
        })
    }
}

/// One frame as seen by the monitor: a timestamp and, if a face was found,
/// its region landmarks. A frame without a face is data, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Timestamp when the frame was captured
    pub timestamp: DateTime<Utc>,
    /// Region landmarks, or `None` when no face was detected
    pub landmarks: Option<FaceLandmarks>,
}

impl FrameObservation {
    /// Create an observation for a frame with a detected face.
    pub fn face(timestamp: DateTime<Utc>, landmarks: FaceLandmarks) -> Self {
        Self {
            timestamp,
            landmarks: Some(landmarks),
        }
    }

    /// Create an observation for a frame where no face was detected.
    pub fn no_face(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            landmarks: None,
        }
    }
}
