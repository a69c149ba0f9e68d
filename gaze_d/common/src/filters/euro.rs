use super::Smoother;
use serde::{Deserialize, Serialize};

const FALLBACK_HZ: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EuroParams {
    pub min_cutoff: f32,
    pub beta: f32,
    pub d_cutoff: f32,
}

impl Default for EuroParams {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.5,
            d_cutoff: 0.1,
        }
    }
}

impl EuroParams {
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let positive = |v: f32, d: f32| if v.is_finite() && v > 0.0 { v } else { d };
        Self {
            min_cutoff: positive(self.min_cutoff, defaults.min_cutoff),
            beta: if self.beta.is_finite() && self.beta >= 0.0 {
                self.beta
            } else {
                defaults.beta
            },
            d_cutoff: positive(self.d_cutoff, defaults.d_cutoff),
        }
    }
}

/// Speed-adaptive low-pass: heavy smoothing when still, little lag when the
/// signal moves fast.
#[derive(Debug, Clone, Copy)]
pub struct EuroFilter {
    min_cutoff: f32,
    beta: f32,
    d_cutoff: f32,
    x_prev: f32,
    dx_prev: f32,
    raw_x_prev: f32,
    initialized: bool,
}

impl Default for EuroFilter {
    fn default() -> Self {
        Self::new(EuroParams::default())
    }
}

impl EuroFilter {
    pub fn new(params: EuroParams) -> Self {
        Self {
            min_cutoff: params.min_cutoff,
            beta: params.beta,
            d_cutoff: params.d_cutoff,
            x_prev: 0.0,
            dx_prev: 0.0,
            raw_x_prev: 0.0,
            initialized: false,
        }
    }

    fn alpha(hz: f32, cutoff: f32) -> f32 {
        let tau = 1.0 / (2.0 * std::f32::consts::PI * cutoff);
        let te = 1.0 / hz;
        1.0 / (1.0 + tau / te)
    }

    fn low_pass(hat_x_prev: &mut f32, x: f32, alpha: f32) -> f32 {
        let hat_x = alpha * x + (1.0 - alpha) * *hat_x_prev;
        *hat_x_prev = hat_x;
        hat_x
    }

    pub fn filter(&mut self, x: f32, dt_ms: f32) -> f32 {
        if !x.is_finite() {
            return self.x_prev;
        }

        if !self.initialized {
            self.initialized = true;
            self.raw_x_prev = x;
            self.x_prev = x;
            self.dx_prev = 0.0;
            return x;
        }

        let hz = if dt_ms > 0.0 { 1000.0 / dt_ms } else { FALLBACK_HZ };

        let dx = (x - self.raw_x_prev) * hz;
        self.raw_x_prev = x;

        let edx = Self::low_pass(&mut self.dx_prev, dx, Self::alpha(hz, self.d_cutoff));
        let cutoff = self.min_cutoff + self.beta * edx.abs();

        Self::low_pass(&mut self.x_prev, x, Self::alpha(hz, cutoff))
    }
}

impl Smoother for EuroFilter {
    fn update(&mut self, measurement: f32, dt_ms: f32) -> f32 {
        self.filter(measurement, dt_ms)
    }

    fn value(&self) -> f32 {
        self.x_prev
    }

    fn name(&self) -> &str {
        "OneEuro"
    }
}
