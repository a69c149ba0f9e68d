mod support;

use common::calibration_manager::{CalibrationManager, DEFAULT_STORAGE_KEY};
use common::{CalibrationData, CalibrationPoint, EyeData, FaceAngle, DEFAULT_EYES_HEIGHT};
use std::fs;
use support::{cleanup_test_dir, test_dir};

#[test]
fn storage_path_uses_key() {
    let dir = test_dir("cm_path");
    let manager = CalibrationManager::new(dir.clone(), DEFAULT_STORAGE_KEY);
    assert_eq!(manager.storage_path(), dir.join("gaze-calibration.json"));
    cleanup_test_dir(&dir);
}

#[test]
fn save_then_load_round_trips() {
    let dir = test_dir("cm_roundtrip");

    let mut manager = CalibrationManager::new(dir.clone(), "player1");
    *manager.data.corner_mut(CalibrationPoint::TopLeft) = EyeData::new(0.25, 0.75);
    *manager.data.angle_mut(FaceAngle::PanToLeft) = -0.4;
    manager.data.eyes_height = 0.021;
    manager.save().expect("save");

    let mut reloaded = CalibrationManager::new(dir.clone(), "player1");
    reloaded.load().expect("load");
    assert_eq!(reloaded.data, manager.data);

    cleanup_test_dir(&dir);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = test_dir("cm_missing");

    let mut manager = CalibrationManager::new(dir.clone(), "nobody");
    manager.data.eyes_height = 0.5;
    manager.load().expect("load");

    assert_eq!(manager.data, CalibrationData::default());
    assert!(!manager.storage_path().exists());

    cleanup_test_dir(&dir);
}

#[test]
fn partial_file_merges_with_defaults() {
    let dir = test_dir("cm_partial");
    fs::write(
        dir.join("partial.json"),
        r#"{ "BottomRight": { "eyeX": 0.6 }, "tiltToUp": 0.3 }"#,
    )
    .unwrap();

    let mut manager = CalibrationManager::new(dir.clone(), "partial");
    manager.load().expect("load");

    let defaults = CalibrationData::default();
    assert_eq!(manager.data.bottom_right, EyeData::new(0.6, 0.0));
    assert_eq!(manager.data.tilt_to_up, 0.3);
    assert_eq!(manager.data.top_left, defaults.top_left);
    assert_eq!(manager.data.eyes_height, DEFAULT_EYES_HEIGHT);

    cleanup_test_dir(&dir);
}

#[test]
fn loaded_values_are_sanitized() {
    let dir = test_dir("cm_sanitize_load");
    fs::write(
        dir.join("bad.json"),
        r#"{ "TopRight": { "eyeX": 3.0, "eyeY": -1.0 }, "panToRight": 9.0, "eyesHeight": -0.01 }"#,
    )
    .unwrap();

    let mut manager = CalibrationManager::new(dir.clone(), "bad");
    manager.load().expect("load");

    let defaults = CalibrationData::default();
    assert_eq!(manager.data.top_right, EyeData::new(1.0, 0.0));
    assert_eq!(manager.data.pan_to_right, defaults.pan_to_right);
    assert_eq!(manager.data.eyes_height, defaults.eyes_height);

    cleanup_test_dir(&dir);
}

#[test]
fn non_finite_values_never_reach_disk() {
    let dir = test_dir("cm_sanitize_save");

    let mut manager = CalibrationManager::new(dir.clone(), "nan");
    manager.data.tilt_to_down = f32::NAN;
    manager.data.bottom_left = EyeData::new(f32::INFINITY, 0.5);
    manager.save().expect("save");

    let raw = fs::read_to_string(manager.storage_path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let defaults = CalibrationData::default();
    assert_eq!(value["tiltToDown"].as_f64().unwrap() as f32, defaults.tilt_to_down);
    assert_eq!(value["BottomLeft"]["eyeX"].as_f64().unwrap() as f32, 0.0);

    cleanup_test_dir(&dir);
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = test_dir("cm_corrupt");
    fs::write(dir.join("broken.json"), "{ not json").unwrap();

    let mut manager = CalibrationManager::new(dir.clone(), "broken");
    assert!(manager.load().is_err());

    cleanup_test_dir(&dir);
}

#[test]
fn reset_persists_defaults() {
    let dir = test_dir("cm_reset");

    let mut manager = CalibrationManager::new(dir.clone(), "reset");
    manager.data.eyes_height = 0.05;
    manager.save().expect("save");

    manager.reset().expect("reset");
    assert_eq!(manager.data, CalibrationData::default());

    let mut reloaded = CalibrationManager::new(dir.clone(), "reset");
    reloaded.load().expect("load");
    assert_eq!(reloaded.data, CalibrationData::default());

    cleanup_test_dir(&dir);
}

#[test]
fn save_creates_missing_directory() {
    let dir = test_dir("cm_mkdir");
    let nested = dir.join("profiles").join("alice");

    let manager = CalibrationManager::new(nested.clone(), DEFAULT_STORAGE_KEY);
    manager.save().expect("save");
    assert!(nested.join("gaze-calibration.json").exists());

    cleanup_test_dir(&dir);
}
