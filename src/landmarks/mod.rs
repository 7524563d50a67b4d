//! Landmark input layer for the drowsiness monitor.
//!
//! Facial landmark extraction itself is an external capability; this module
//! defines the frame-level types it produces and a replay source that streams
//! a recorded landmark file the way a live capture front-end would.

pub mod replay;
pub mod types;

// Re-export commonly used types
pub use replay::{ReplayConfig, ReplaySource, SourceError};
pub use types::{
    EyeLandmarks, FaceLandmarks, FrameObservation, MouthLandmarks, Point2D, LEFT_EYE_INDICES,
    MESH_POINT_COUNT, MOUTH_INDICES, RIGHT_EYE_INDICES,
};
