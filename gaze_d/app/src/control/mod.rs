//! HTTP surface for recording calibration while the pipeline runs.
//!
//! Handlers never touch the [`common::Conditioner`]; they queue a
//! [`ControlRequest`] which the consumer thread applies between frames, and
//! read the snapshots the consumer publishes after every frame.

pub mod host;
pub mod routes;

use common::{CalibrationData, CalibrationPoint, FaceAngle, TrackingResult};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Corner(CalibrationPoint),
    Angle(FaceAngle),
    EyesHeight,
    Reset,
}

impl fmt::Display for ControlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corner(point) => write!(f, "corner {}", point),
            Self::Angle(angle) => write!(f, "angle {}", angle),
            Self::EyesHeight => f.write_str("eyesHeight"),
            Self::Reset => f.write_str("reset"),
        }
    }
}

/// Outcome of the most recently applied request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestOutcome {
    pub request: String,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PipelineStatus {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub has_sample: bool,
    pub last_result: Option<TrackingResult>,
    pub last_request: Option<RequestOutcome>,
}

/// State shared between the producer, the consumer and the HTTP handlers.
#[derive(Clone, Default)]
pub struct ControlState {
    pub calibration: Arc<RwLock<CalibrationData>>,
    pub status: Arc<RwLock<PipelineStatus>>,
    pub requests: Arc<RwLock<Vec<ControlRequest>>>,
    /// Frames turned away by the frame gate.
    pub frames_dropped: Arc<AtomicU64>,
}

impl ControlState {
    pub fn new(calibration: CalibrationData) -> Self {
        Self {
            calibration: Arc::new(RwLock::new(calibration)),
            ..Default::default()
        }
    }

    /// Returns false if the queue lock is poisoned.
    pub fn push_request(&self, request: ControlRequest) -> bool {
        match self.requests.write() {
            Ok(mut queue) => {
                queue.push(request);
                true
            }
            Err(_) => false,
        }
    }

    pub fn take_requests(&self) -> Vec<ControlRequest> {
        self.requests
            .write()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    pub fn record_dropped(&self) -> u64 {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed) + 1
    }
}
