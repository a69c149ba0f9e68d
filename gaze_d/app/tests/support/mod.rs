#![allow(dead_code)]

use api::schema::{EyeLandmarks, FULL_LANDMARKS, LEFT_EYE, RIGHT_EYE};
use api::{Blendshape, FaceFrame, HeadPose, Landmark};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn place_eye(landmarks: &mut [Landmark], eye: &EyeLandmarks, left_x: f32, iris_t: f32) {
    let width = 0.06;
    landmarks[eye.left_corner] = Landmark::new(left_x, 0.5, 0.0);
    landmarks[eye.right_corner] = Landmark::new(left_x + width, 0.5, 0.0);
    landmarks[eye.top] = Landmark::new(left_x + width / 2.0, 0.485, 0.0);
    landmarks[eye.bottom] = Landmark::new(left_x + width / 2.0, 0.515, 0.0);
    landmarks[eye.iris_center] = Landmark::new(left_x + width * iris_t, 0.5, 0.0);
}

/// Open eyes looking `iris_t` of the way from the left to the right corner,
/// head facing the camera.
pub fn frame(timestamp_ms: f64, iris_t: f32) -> FaceFrame {
    let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0); FULL_LANDMARKS];
    place_eye(&mut landmarks, &LEFT_EYE, 0.40, iris_t);
    place_eye(&mut landmarks, &RIGHT_EYE, 0.54, iris_t);
    FaceFrame {
        timestamp_ms,
        landmarks,
        head_pose: Some(HeadPose::default()),
        blendshapes: vec![Blendshape {
            category_name: "browInnerUp".to_string(),
            score: 0.25,
        }],
    }
}

pub fn test_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("gaze_d_app_test_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&path);
    let _ = fs::create_dir_all(&path);
    path
}

pub fn cleanup_test_dir(path: &PathBuf) {
    let _ = fs::remove_dir_all(path);
}

pub fn write_jsonl(path: &PathBuf, frames: &[FaceFrame]) {
    let lines: Vec<String> = frames
        .iter()
        .map(|f| serde_json::to_string(f).unwrap())
        .collect();
    fs::write(path, lines.join("\n")).unwrap();
}

/// Polls `cond` every few milliseconds until it holds or `timeout` passes.
pub fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

pub fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() < eps
}
