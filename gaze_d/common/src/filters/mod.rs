mod euro;
mod kalman;
mod smooth_damp;

pub use euro::{EuroFilter, EuroParams};
pub use kalman::{KalmanFilter, KalmanParams};
pub use smooth_damp::{smooth_damp, SmoothDamp, SmoothDampParams};

use serde::{Deserialize, Serialize};

/// One scalar smoothing channel. Every tracked scalar owns its own instance.
pub trait Smoother: Send {
    /// Feeds one measurement taken `dt_ms` after the previous one and returns
    /// the new estimate.
    fn update(&mut self, measurement: f32, dt_ms: f32) -> f32;

    /// Current estimate without advancing the filter.
    fn value(&self) -> f32;

    fn name(&self) -> &str;
}

/// Returns the measurement unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough {
    last: f32,
}

impl Smoother for Passthrough {
    fn update(&mut self, measurement: f32, _dt_ms: f32) -> f32 {
        self.last = measurement;
        measurement
    }

    fn value(&self) -> f32 {
        self.last
    }

    fn name(&self) -> &str {
        "Passthrough"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterConfig {
    Kalman(KalmanParams),
    SmoothDamp(SmoothDampParams),
    OneEuro(EuroParams),
    None,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::Kalman(KalmanParams::default())
    }
}

impl FilterConfig {
    pub fn build(&self) -> Box<dyn Smoother> {
        match self {
            Self::Kalman(p) => Box::new(KalmanFilter::new(p.clone())),
            Self::SmoothDamp(p) => Box::new(SmoothDamp::new(p.clone())),
            Self::OneEuro(p) => Box::new(EuroFilter::new(p.clone())),
            Self::None => Box::new(Passthrough::default()),
        }
    }

    pub fn sanitized(&self) -> Self {
        match self {
            Self::Kalman(p) => Self::Kalman(p.sanitized()),
            Self::SmoothDamp(p) => Self::SmoothDamp(p.sanitized()),
            Self::OneEuro(p) => Self::OneEuro(p.sanitized()),
            Self::None => Self::None,
        }
    }
}
