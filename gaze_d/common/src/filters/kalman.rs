use super::Smoother;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanParams {
    /// Expected drift of the true value between updates. Higher is more
    /// responsive.
    pub process_noise: f32,
    /// Expected measurement noise. Higher trusts measurements less.
    pub measurement_noise: f32,
    pub initial_estimate: f32,
    /// Uncertainty of `initial_estimate`; higher adapts faster at first.
    pub initial_error_covariance: f32,
}

impl Default for KalmanParams {
    fn default() -> Self {
        Self {
            process_noise: 1.0,
            measurement_noise: 1.0,
            initial_estimate: 0.0,
            initial_error_covariance: 1.0,
        }
    }
}

impl KalmanParams {
    pub fn new(process_noise: f32, measurement_noise: f32) -> Self {
        Self {
            process_noise,
            measurement_noise,
            ..Default::default()
        }
    }

    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let positive = |v: f32, d: f32| if v.is_finite() && v > 0.0 { v } else { d };
        Self {
            process_noise: positive(self.process_noise, defaults.process_noise),
            measurement_noise: positive(self.measurement_noise, defaults.measurement_noise),
            initial_estimate: if self.initial_estimate.is_finite() {
                self.initial_estimate
            } else {
                defaults.initial_estimate
            },
            initial_error_covariance: if self.initial_error_covariance.is_finite()
                && self.initial_error_covariance >= 0.0
            {
                self.initial_error_covariance
            } else {
                defaults.initial_error_covariance
            },
        }
    }
}

/// One-dimensional recursive estimator with a constant-value model.
///
/// Assumes a roughly uniform call cadence; the time step is ignored.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    process_noise: f32,
    measurement_noise: f32,
    estimate: f32,
    error_covariance: f32,
}

impl KalmanFilter {
    pub fn new(params: KalmanParams) -> Self {
        Self {
            process_noise: params.process_noise,
            measurement_noise: params.measurement_noise,
            estimate: params.initial_estimate,
            error_covariance: params.initial_error_covariance,
        }
    }

    pub fn filter(&mut self, measurement: f32) -> f32 {
        let predicted = self.error_covariance + self.process_noise;
        let gain = predicted / (predicted + self.measurement_noise);
        self.estimate += gain * (measurement - self.estimate);
        self.error_covariance = (1.0 - gain) * predicted;
        self.estimate
    }

    pub fn error_covariance(&self) -> f32 {
        self.error_covariance
    }
}

impl Smoother for KalmanFilter {
    fn update(&mut self, measurement: f32, _dt_ms: f32) -> f32 {
        self.filter(measurement)
    }

    fn value(&self) -> f32 {
        self.estimate
    }

    fn name(&self) -> &str {
        "Kalman"
    }
}
