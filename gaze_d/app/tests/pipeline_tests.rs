mod support;

use api::FaceTrackingSource;
use common::calibration_manager::CalibrationManager;
use common::{
    CalibrationData, CalibrationPoint, Conditioner, FaceAngle, FilterConfig, FrameGate,
    OutputConfig, OutputMode, TrackingConfig,
};
use gaze_d::control::{ControlRequest, ControlState};
use gaze_d::dispatcher::Dispatcher;
use gaze_d::pipeline::{run_producer, Consumer, FrameMessage};
use gaze_d::sources::ReplaySource;
use gaze_d::strategies::create_strategy;
use std::net::UdpSocket;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use support::{approx, cleanup_test_dir, frame, test_dir, wait_for, write_jsonl};

/// Consumer with passthrough filters whose output goes to a throwaway socket.
fn consumer(dir: &Path, control: &ControlState) -> (Consumer, UdpSocket) {
    let sink = UdpSocket::bind("127.0.0.1:0").unwrap();
    let mut dispatcher = Dispatcher::new(create_strategy(&OutputConfig {
        mode: OutputMode::Generic,
        send_address: "127.0.0.1".to_string(),
        send_port: sink.local_addr().unwrap().port(),
        ..Default::default()
    }));
    dispatcher.initialize().unwrap();

    let tracking = TrackingConfig {
        eye_filter: FilterConfig::None,
        angle_filter: FilterConfig::None,
        ..Default::default()
    };
    let conditioner = Conditioner::new(
        tracking,
        CalibrationManager::new(dir.to_path_buf(), "pipeline"),
    );
    (Consumer::new(conditioner, dispatcher, control.clone()), sink)
}

#[test]
fn requests_before_any_frame_are_reported_unapplied() {
    let dir = test_dir("pipe_no_sample");
    let control = ControlState::new(CalibrationData::default());
    let (mut consumer, _sink) = consumer(&dir, &control);

    assert!(control.push_request(ControlRequest::Corner(CalibrationPoint::TopLeft)));
    assert_eq!(consumer.apply_requests(), 1);

    let status = control.status.read().unwrap().clone();
    let outcome = status.last_request.expect("outcome recorded");
    assert_eq!(outcome.request, "corner TopLeft");
    assert!(!outcome.applied);
    assert!(outcome.error.is_none());

    cleanup_test_dir(&dir);
}

#[test]
fn requests_apply_to_latest_sample_and_publish_snapshot() {
    let dir = test_dir("pipe_requests");
    let control = ControlState::new(CalibrationData::default());
    let (mut consumer, _sink) = consumer(&dir, &control);

    let result = consumer.handle_frame(&frame(0.0, 0.3)).expect("processed");
    assert!(approx(result.eye_position.x, 0.3, 1e-3));
    assert_eq!(result.expressions.brow, Some(0.25));

    control.push_request(ControlRequest::Corner(CalibrationPoint::BottomLeft));
    control.push_request(ControlRequest::Angle(FaceAngle::TiltToDown));
    control.push_request(ControlRequest::EyesHeight);
    assert_eq!(consumer.apply_requests(), 3);
    assert!(control.take_requests().is_empty());

    let snapshot = control.calibration.read().unwrap().clone();
    assert!(approx(snapshot.bottom_left.eye_x, 0.3, 1e-3));
    assert!(approx(snapshot.tilt_to_down, 0.0, 1e-4));
    assert!(approx(snapshot.eyes_height, 0.03, 1e-4));
    assert_eq!(&snapshot, consumer.conditioner().calibration());

    control.push_request(ControlRequest::Reset);
    consumer.apply_requests();
    assert_eq!(*control.calibration.read().unwrap(), CalibrationData::default());

    cleanup_test_dir(&dir);
}

#[test]
fn status_tracks_processed_and_skipped_frames() {
    let dir = test_dir("pipe_status");
    let control = ControlState::new(CalibrationData::default());
    let (mut consumer, _sink) = consumer(&dir, &control);

    consumer.handle_frame(&frame(0.0, 0.5));
    let mut broken = frame(16.0, 0.5);
    broken.head_pose = None;
    assert!(consumer.handle_frame(&broken).is_none());

    let status = control.status.read().unwrap().clone();
    assert_eq!(status.frames_processed, 1);
    assert_eq!(status.frames_skipped, 1);
    assert!(status.has_sample);
    assert_eq!(status.last_result.map(|r| r.timestamp_ms), Some(0.0));

    cleanup_test_dir(&dir);
}

#[test]
fn gate_drops_frames_while_one_is_in_flight() {
    let gate = FrameGate::new();
    let control = ControlState::default();
    let (tx, rx) = sync_channel::<FrameMessage>(1);

    let token = gate.try_acquire().expect("free slot");
    tx.try_send((frame(0.0, 0.5), token)).unwrap();

    // Second frame arrives before the consumer picked up the first.
    assert!(gate.try_acquire().is_none());
    control.record_dropped();
    assert_eq!(control.frames_dropped(), 1);

    let (_frame, in_flight) = rx.recv().unwrap();
    drop(in_flight);
    assert!(gate.try_acquire().is_some());
}

#[test]
fn replay_flows_through_producer_and_consumer() {
    let dir = test_dir("pipe_replay");
    let path = dir.join("session.jsonl");
    let frames: Vec<_> = (0..5).map(|i| frame(i as f64 * 33.0, 0.5)).collect();
    write_jsonl(&path, &frames);

    let control = ControlState::new(CalibrationData::default());
    let (consumer, _sink) = consumer(&dir, &control);

    let running = Arc::new(AtomicBool::new(true));
    let (tx, rx) = sync_channel::<FrameMessage>(1);

    let running_consumer = running.clone();
    let consumer_handle = thread::spawn(move || consumer.run(rx, &running_consumer));

    let running_producer = running.clone();
    let control_producer = control.clone();
    let producer_handle = thread::spawn(move || {
        let mut source = ReplaySource::new(path, false, false);
        source.initialize().unwrap();
        run_producer(
            &mut source,
            tx,
            &FrameGate::new(),
            &control_producer,
            &running_producer,
            None,
        );
        source
    });

    let seen_all = wait_for(Duration::from_secs(5), || {
        let status = control.status.read().unwrap();
        status.frames_processed + control.frames_dropped() >= 5
    });
    running.store(false, Ordering::SeqCst);

    let source = producer_handle.join().unwrap();
    consumer_handle.join().unwrap();

    assert!(seen_all);
    assert!(source.is_empty(), "producer unloads the source on shutdown");
    assert!(control.status.read().unwrap().frames_processed >= 1);

    cleanup_test_dir(&dir);
}
