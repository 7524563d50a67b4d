//! Aspect-ratio computation from landmark coordinates.
//!
//! EAR (eye-aspect-ratio) falls as the eye closes; MAR (mouth-aspect-ratio)
//! rises as the mouth opens. Both are dimensionless and scale-invariant.

use crate::landmarks::types::{EyeLandmarks, FaceLandmarks, MouthLandmarks, Point2D};

/// Minimum corner-to-corner span below which a ratio is undetermined.
/// Degenerate (collinear or collapsed) landmarks would otherwise divide by
/// a vanishing denominator.
const MIN_CORNER_SPAN: f64 = 1e-6;

/// Per-frame openness ratios. `None` marks a ratio that could not be
/// determined from this frame's landmarks; the frame is skipped for gating
/// on that signal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameMetrics {
    /// Eye-aspect-ratio, mean of both eyes; lower = more closed
    pub ear: Option<f64>,
    /// Mouth-aspect-ratio; higher = more open
    pub mar: Option<f64>,
}

/// Euclidean distance between two points.
pub fn distance(a: Point2D, b: Point2D) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Eye-aspect-ratio over six landmarks ordered
/// [corner, top-outer, top-inner, opposite corner, bottom-inner, bottom-outer]:
/// `(d(p1,p5) + d(p2,p4)) / (2 · d(p0,p3))`.
///
/// Returns `None` when the corner span is degenerate.
pub fn eye_aspect_ratio(eye: &EyeLandmarks) -> Option<f64> {
    let p = &eye.points;
    let span = distance(p[0], p[3]);
    if span < MIN_CORNER_SPAN {
        return None;
    }
    Some((distance(p[1], p[5]) + distance(p[2], p[4])) / (2.0 * span))
}

/// Mouth-aspect-ratio over four landmarks ordered
/// [upper lip, lower lip, left corner, right corner]:
/// `d(top,bottom) / d(left,right)`.
///
/// Returns `None` when the corner span is degenerate.
pub fn mouth_aspect_ratio(mouth: &MouthLandmarks) -> Option<f64> {
    let p = &mouth.points;
    let span = distance(p[2], p[3]);
    if span < MIN_CORNER_SPAN {
        return None;
    }
    Some(distance(p[0], p[1]) / span)
}

/// Compute per-frame metrics for a detected face.
///
/// The overall EAR is the mean of the left and right eye ratios; if either
/// eye is degenerate the EAR is undetermined for the frame.
pub fn compute_metrics(face: &FaceLandmarks) -> FrameMetrics {
    let ear = match (
        eye_aspect_ratio(&face.left_eye),
        eye_aspect_ratio(&face.right_eye),
    ) {
        (Some(left), Some(right)) => Some((left + right) / 2.0),
        _ => None,
    };

    FrameMetrics {
        ear,
        mar: mouth_aspect_ratio(&face.mouth),
    }
}
