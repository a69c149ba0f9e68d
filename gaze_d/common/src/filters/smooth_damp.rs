use super::Smoother;
use crate::math::clamp;
use serde::{Deserialize, Serialize};

const MIN_SMOOTH_TIME_MS: f32 = 0.0001;

/// Advances `current` toward `target` along a critically damped spring.
///
/// `smooth_time` and `delta_time` share one time unit (milliseconds in this
/// crate) and `max_speed` is in value units per that time unit. The distance
/// taken into account is clamped to `max_speed * smooth_time` before
/// integrating. If the step would carry the output past `target`, the output
/// snaps to `target` and the residual velocity is cleared.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    delta_time: f32,
    max_speed: f32,
) -> f32 {
    if delta_time <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME_MS);
    let omega = 2.0 / smooth_time;
    let x = omega * delta_time;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let original_target = target;
    let max_change = max_speed * smooth_time;
    let change = clamp(current - target, -max_change, max_change);
    let target = current - change;

    let temp = (*velocity + omega * change) * delta_time;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (original_target - current > 0.0) == (output > original_target) {
        output = original_target;
        *velocity = (output - original_target) / delta_time;
    }

    output
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothDampParams {
    pub smooth_time_ms: f32,
    /// Value units per millisecond.
    pub max_speed: f32,
    pub initial: f32,
}

impl Default for SmoothDampParams {
    fn default() -> Self {
        Self {
            smooth_time_ms: 30.0,
            max_speed: 0.1,
            initial: 0.0,
        }
    }
}

impl SmoothDampParams {
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            smooth_time_ms: if self.smooth_time_ms.is_finite() {
                self.smooth_time_ms.max(MIN_SMOOTH_TIME_MS)
            } else {
                defaults.smooth_time_ms
            },
            max_speed: if self.max_speed > 0.0 {
                self.max_speed
            } else {
                defaults.max_speed
            },
            initial: if self.initial.is_finite() {
                self.initial
            } else {
                defaults.initial
            },
        }
    }
}

/// Stateful wrapper around [`smooth_damp`] owning its position and velocity.
#[derive(Debug, Clone)]
pub struct SmoothDamp {
    params: SmoothDampParams,
    position: f32,
    velocity: f32,
}

impl SmoothDamp {
    pub fn new(params: SmoothDampParams) -> Self {
        Self {
            position: params.initial,
            velocity: 0.0,
            params,
        }
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }
}

impl Smoother for SmoothDamp {
    fn update(&mut self, measurement: f32, dt_ms: f32) -> f32 {
        self.position = smooth_damp(
            self.position,
            measurement,
            &mut self.velocity,
            self.params.smooth_time_ms,
            dt_ms,
            self.params.max_speed,
        );
        self.position
    }

    fn value(&self) -> f32 {
        self.position
    }

    fn name(&self) -> &str {
        "SmoothDamp"
    }
}
