#![allow(dead_code)]

use api::schema::{EyeLandmarks, FULL_LANDMARKS, LEFT_EYE, RIGHT_EYE};
use api::{Blendshape, FaceFrame, HeadPose, Landmark};
use glam::Mat4;
use std::fs;
use std::path::PathBuf;

pub const OPEN_LID: f32 = 0.03;

/// Synthetic eye geometry: `iris_t` is the iris position between the corners,
/// `iris_dy` its vertical offset from the corner line, `lid` the lid opening.
#[derive(Debug, Clone, Copy)]
pub struct EyeShape {
    pub iris_t: f32,
    pub iris_dy: f32,
    pub lid: f32,
}

impl Default for EyeShape {
    fn default() -> Self {
        Self {
            iris_t: 0.5,
            iris_dy: 0.0,
            lid: OPEN_LID,
        }
    }
}

fn place_eye(landmarks: &mut [Landmark], eye: &EyeLandmarks, left_x: f32, shape: EyeShape) {
    let width = 0.06;
    let center_y = 0.5;
    let mid_x = left_x + width / 2.0;
    landmarks[eye.left_corner] = Landmark::new(left_x, center_y, 0.0);
    landmarks[eye.right_corner] = Landmark::new(left_x + width, center_y, 0.0);
    landmarks[eye.top] = Landmark::new(mid_x, center_y - shape.lid / 2.0, 0.0);
    landmarks[eye.bottom] = Landmark::new(mid_x, center_y + shape.lid / 2.0, 0.0);
    landmarks[eye.iris_center] =
        Landmark::new(left_x + width * shape.iris_t, center_y + shape.iris_dy, 0.0);
}

pub fn landmarks(left: EyeShape, right: EyeShape) -> Vec<Landmark> {
    let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0); FULL_LANDMARKS];
    place_eye(&mut landmarks, &LEFT_EYE, 0.40, left);
    place_eye(&mut landmarks, &RIGHT_EYE, 0.54, right);
    landmarks
}

pub fn frame_with(shape: EyeShape, pose: Mat4, timestamp_ms: f64) -> FaceFrame {
    FaceFrame {
        timestamp_ms,
        landmarks: landmarks(shape, shape),
        head_pose: Some(HeadPose::from_matrix(pose)),
        blendshapes: Vec::new(),
    }
}

pub fn centered_frame(timestamp_ms: f64) -> FaceFrame {
    frame_with(EyeShape::default(), Mat4::IDENTITY, timestamp_ms)
}

pub fn blendshape(name: &str, score: f32) -> Blendshape {
    Blendshape {
        category_name: name.to_string(),
        score,
    }
}

pub fn test_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("gaze_d_test_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&path);
    let _ = fs::create_dir_all(&path);
    path
}

pub fn cleanup_test_dir(path: &PathBuf) {
    let _ = fs::remove_dir_all(path);
}

pub fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() < eps
}
