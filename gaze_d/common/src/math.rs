//! Scalar helpers shared by every mapping step.
//!
//! All of these saturate instead of panicking: bounds may be given in either
//! order and a NaN input lands on the lower bound.

/// Clamps `value` into the closed interval spanned by `a` and `b`.
pub fn clamp(value: f32, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    value.max(lo).min(hi)
}

pub fn clamp01(value: f32) -> f32 {
    clamp(value, 0.0, 1.0)
}

/// Linear rescale of `value` from `from` to `to`, saturating at the `to`
/// bounds. A degenerate `from` range saturates toward the side `value` lies on.
pub fn remap(value: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
    let (from_min, from_max) = from;
    let (to_min, to_max) = to;
    let t = (value - from_min) / (from_max - from_min);
    clamp(to_min + (to_max - to_min) * t, to_min, to_max)
}

/// Position of `x` between `a` and `b`, clamped to [0,1].
pub fn inverse_lerp(x: f32, a: f32, b: f32) -> f32 {
    clamp01((x - a) / (b - a))
}

pub fn mid_point(a: f32, b: f32) -> f32 {
    (a + b) / 2.0
}

/// Steps `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}
