//! # Gesture Console
//!
//! Client-side controller for an interactive gesture-capture service.
//!
//! The remote service tracks hand motion and reports each gesture as a trace of
//! relative polar steps. This library keeps a local session state machine in
//! sync with that service, polls it for live trace data while recording or
//! visualizing, projects the traces into plane coordinates, renders them onto a
//! raster surface, and drives the trim-and-save workflow that persists a
//! captured trace range as a named template.
//!
//! ## Components
//!
//! - [`geometry`] - pure transform from relative polar segments to absolute
//!   plane coordinates
//! - [`render`] - raster rendering of one or more traces with per-trace colors
//! - [`poll`] - cancellable periodic fetch of live visualizer frames
//! - [`controller`] - the session state machine driving everything above
//! - [`trim`] - trim range handling and save-time validation
//! - [`service`] - the request/response boundary to the remote service

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{ClientError, Result};

// Polar-to-plane trace projection
pub mod geometry;
pub use geometry::trace_to_coordinates;

// Trace rendering onto a raster surface
pub mod render;
pub use render::{Canvas, RenderConfig, PALETTE};

// Trim range handling for the save workflow
pub mod trim;
pub use trim::{validate_save, TrimRange, MIN_TEMPLATE_POINTS};

// Request/response boundary to the recognition service
pub mod service;
pub use service::{GestureService, HttpGestureService};

// Cancellable polling loop
pub mod poll;
pub use poll::{Poller, DEFAULT_POLL_PERIOD};

// Session state machine and template sync
pub mod controller;
pub use controller::{ControllerEvent, SessionController};

// ============================================================================
// Core Types
// ============================================================================

/// One relative polar step in a captured trace: a turn followed by a travel.
///
/// Segments are produced by the remote service and never modified locally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Relative turn in radians, applied before the step.
    pub angle: f64,
    /// Non-negative travel distance for the step.
    pub distance: f64,
}

impl Segment {
    /// Create a new segment.
    pub fn new(angle: f64, distance: f64) -> Self {
        Self { angle, distance }
    }
}

/// A time-ordered sequence of segments representing one gesture's path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub points: Vec<Segment>,
}

impl Trace {
    /// Create a trace from a list of segments.
    pub fn new(points: Vec<Segment>) -> Self {
        Self { points }
    }

    /// Create an empty trace.
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Number of segments in the trace.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the trace has no segments.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Copy out the sub-trace `points[start..end]`.
    ///
    /// Bounds are clamped to the trace length, so an oversized range yields
    /// the longest valid slice rather than panicking.
    pub fn slice(&self, start: usize, end: usize) -> Trace {
        let end = end.min(self.points.len());
        let start = start.min(end);
        Trace {
            points: self.points[start..end].to_vec(),
        }
    }
}

/// An absolute position in the drawing plane.
///
/// Coordinates are always derived from a [`Trace`] via [`trace_to_coordinates`],
/// never received from the network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One tracked gesture source for a single polling cycle.
///
/// Wraps exactly one trace; the service reports one model per hand it is
/// currently tracking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub trace: Trace,
    /// Name of the recognized gesture, when the service matched one.
    #[serde(default)]
    pub recognized: Option<String>,
}

impl Model {
    /// Create a model wrapping the given trace.
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            recognized: None,
        }
    }
}

/// A gesture the service matched against a stored template during a poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedGesture {
    pub name: String,
}

/// One poll response from the visualizer endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualizerFrame {
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(default)]
    pub detected: Vec<DetectedGesture>,
}

/// The recording session state, owned by the remote service.
///
/// The local copy held by [`SessionController`] is a cache: it is refreshed
/// from every confirmed transition response and on initial load, and is never
/// mutated optimistically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Normal,
    Recording,
    Saving,
}

impl SessionState {
    /// Lowercase wire name, used in URL paths and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Normal => "normal",
            SessionState::Recording => "recording",
            SessionState::Saving => "saving",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, persisted trace range stored by the remote service.
///
/// The client only lists templates, creates them from a save candidate, and
/// deletes them by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: u32,
    pub name: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_slice_clamps_bounds() {
        let trace = Trace::new(vec![
            Segment::new(0.0, 1.0),
            Segment::new(0.1, 2.0),
            Segment::new(0.2, 3.0),
        ]);

        assert_eq!(trace.slice(1, 3).len(), 2);
        assert_eq!(trace.slice(0, 10).len(), 3);
        assert_eq!(trace.slice(5, 10).len(), 0);
        assert_eq!(trace.slice(2, 1).len(), 0);
    }

    #[test]
    fn test_session_state_wire_names() {
        assert_eq!(SessionState::Normal.as_str(), "normal");
        assert_eq!(
            serde_json::to_string(&SessionState::Saving).unwrap(),
            "\"saving\""
        );
        let state: SessionState = serde_json::from_str("\"recording\"").unwrap();
        assert_eq!(state, SessionState::Recording);
    }

    #[test]
    fn test_visualizer_frame_detected_defaults_empty() {
        let json = r#"{"models":[{"trace":{"points":[{"angle":0.0,"distance":10.0}]}}]}"#;
        let frame: VisualizerFrame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.models.len(), 1);
        assert_eq!(frame.models[0].trace.len(), 1);
        assert!(frame.detected.is_empty());
        assert!(frame.models[0].recognized.is_none());
    }

    #[test]
    fn test_visualizer_frame_with_detection() {
        let json = r#"{
            "models": [{"trace": {"points": [{"angle": 0.0, "distance": 10.0}]}}],
            "detected": [{"name": "swipe-right"}]
        }"#;
        let frame: VisualizerFrame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.detected.len(), 1);
        assert_eq!(frame.detected[0].name, "swipe-right");
    }
}
