pub use api::{
    EyePosition, ExpressionScores, FaceFrame, FaceTrackingSource, HeadAngles, HeadPose,
    Landmark, TrackingResult,
};

mod calibration;
pub mod calibration_manager;
mod conditioner;
mod config;
pub mod features;
pub mod filters;
mod frame_gate;
pub mod math;
pub mod scores;

pub use calibration::{CalibrationData, CalibrationPoint, EyeData, FaceAngle, DEFAULT_EYES_HEIGHT};
pub use conditioner::Conditioner;
pub use config::{
    load_config, CalibrationConfig, Config, ControlConfig, OutputConfig, OutputMode, SourceConfig,
    TrackingConfig,
};
pub use filters::{FilterConfig, Smoother};
pub use frame_gate::{FrameGate, InFlight};

/// Delivers conditioned results to a renderer.
pub trait IntegrationAdapter: Send + Sync {
    fn initialize(&mut self) -> anyhow::Result<()>;
    fn send(&self, result: &TrackingResult) -> anyhow::Result<()>;
}
