//! Per-frame reduction of the landmark mesh to a handful of eye scalars.
//!
//! Every function here indexes the mesh directly; callers pass landmarks of a
//! frame that already passed [`api::FaceFrame::validate`].

use crate::math::{inverse_lerp, mid_point, remap};
use api::schema::{EyeLandmarks, LEFT_EYE, RIGHT_EYE};
use api::Landmark;
use glam::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EyeFeatures {
    /// Horizontal iris position, 0 = left corner, 1 = right corner.
    pub eye_x: f32,
    /// Vertical iris position, 0.5 = on the corner line.
    pub eye_y: f32,
    /// Mean lid opening of both eyes in normalized image units.
    pub eyes_height: f32,
}

pub fn eye_height(landmarks: &[Landmark], eye: &EyeLandmarks) -> f32 {
    (landmarks[eye.top].y - landmarks[eye.bottom].y).abs()
}

pub fn horizontal_position(landmarks: &[Landmark], eye: &EyeLandmarks) -> f32 {
    inverse_lerp(
        landmarks[eye.iris_center].x,
        landmarks[eye.left_corner].x,
        landmarks[eye.right_corner].x,
    )
}

/// Iris offset from the corner-to-corner line, scaled by `gain / eyes_height`
/// and mapped from the ±0.5 band onto [0,1].
pub fn vertical_position(
    landmarks: &[Landmark],
    eye: &EyeLandmarks,
    horizontal: f32,
    eyes_height: f32,
    gain: f32,
) -> f32 {
    let left: Vec2 = landmarks[eye.left_corner].xy();
    let right: Vec2 = landmarks[eye.right_corner].xy();
    let on_line = left.lerp(right, horizontal);
    let offset = landmarks[eye.iris_center].y - on_line.y;
    remap(gain * offset / eyes_height, (-0.5, 0.5), (0.0, 1.0))
}

/// Extracts both eyes and averages them. `eyes_height` is the calibrated
/// open-eye reference used to normalize the vertical offset.
pub fn extract(landmarks: &[Landmark], eyes_height: f32, vertical_gain: f32) -> EyeFeatures {
    let left_x = horizontal_position(landmarks, &LEFT_EYE);
    let right_x = horizontal_position(landmarks, &RIGHT_EYE);

    let left_y = vertical_position(landmarks, &LEFT_EYE, left_x, eyes_height, vertical_gain);
    let right_y = vertical_position(landmarks, &RIGHT_EYE, right_x, eyes_height, vertical_gain);

    EyeFeatures {
        eye_x: mid_point(left_x, right_x),
        eye_y: mid_point(left_y, right_y),
        eyes_height: mid_point(
            eye_height(landmarks, &LEFT_EYE),
            eye_height(landmarks, &RIGHT_EYE),
        ),
    }
}

/// 0 when `current` is at or above `open_ratio * reference`, 1 at or below
/// `closed_ratio * reference`, linear in between.
pub fn blink_level(current: f32, reference: f32, closed_ratio: f32, open_ratio: f32) -> f32 {
    1.0 - remap(
        current,
        (closed_ratio * reference, open_ratio * reference),
        (0.0, 1.0),
    )
}
