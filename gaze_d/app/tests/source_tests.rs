mod support;

use api::FaceTrackingSource;
use gaze_d::sources::{ReplaySource, UdpFaceSource};
use std::fs;
use std::net::UdpSocket;
use support::{cleanup_test_dir, frame, test_dir, write_jsonl};

mod replay {
    use super::*;

    #[test]
    fn plays_frames_in_order_then_stops() {
        let dir = test_dir("replay_once");
        let path = dir.join("session.jsonl");
        write_jsonl(&path, &[frame(0.0, 0.5), frame(33.0, 0.4), frame(66.0, 0.3)]);

        let mut source = ReplaySource::new(path, false, false);
        source.initialize().unwrap();
        assert_eq!(source.len(), 3);

        let stamps: Vec<f64> = (0..3)
            .map(|_| source.next_frame().unwrap().unwrap().timestamp_ms)
            .collect();
        assert_eq!(stamps, vec![0.0, 33.0, 66.0]);

        assert!(source.next_frame().unwrap().is_none());
        assert!(source.is_finished());
        assert!(source.next_frame().unwrap().is_none());

        cleanup_test_dir(&dir);
    }

    #[test]
    fn looping_keeps_timestamps_increasing() {
        let dir = test_dir("replay_loop");
        let path = dir.join("session.jsonl");
        write_jsonl(&path, &[frame(100.0, 0.5), frame(120.0, 0.5), frame(140.0, 0.5)]);

        let mut source = ReplaySource::new(path, true, false);
        source.initialize().unwrap();

        let stamps: Vec<f64> = (0..7)
            .map(|_| source.next_frame().unwrap().unwrap().timestamp_ms)
            .collect();
        assert_eq!(stamps, vec![100.0, 120.0, 140.0, 160.0, 180.0, 200.0, 220.0]);
        assert!(!source.is_finished());

        cleanup_test_dir(&dir);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = test_dir("replay_malformed");
        let path = dir.join("session.jsonl");
        let good = serde_json::to_string(&frame(5.0, 0.5)).unwrap();
        fs::write(&path, format!("{}\nnot a frame\n\n{}\n", good, good)).unwrap();

        let mut source = ReplaySource::new(path, false, false);
        source.initialize().unwrap();
        assert_eq!(source.len(), 2);

        cleanup_test_dir(&dir);
    }

    #[test]
    fn empty_or_missing_recording_fails_to_initialize() {
        let dir = test_dir("replay_empty");
        let empty = dir.join("empty.jsonl");
        fs::write(&empty, "\n\n").unwrap();

        assert!(ReplaySource::new(empty, false, false).initialize().is_err());
        assert!(ReplaySource::new(dir.join("absent.jsonl"), false, false)
            .initialize()
            .is_err());

        cleanup_test_dir(&dir);
    }

    #[test]
    fn realtime_releases_frames_too_far_out_to_schedule() {
        let dir = test_dir("replay_far_future");
        let path = dir.join("session.jsonl");
        write_jsonl(&path, &[frame(0.0, 0.5), frame(1.0e300, 0.5)]);

        let mut source = ReplaySource::new(path, false, true);
        source.initialize().unwrap();

        assert_eq!(source.next_frame().unwrap().map(|f| f.timestamp_ms), Some(0.0));
        assert_eq!(
            source.next_frame().unwrap().map(|f| f.timestamp_ms),
            Some(1.0e300)
        );
        assert!(source.next_frame().unwrap().is_none());
        assert!(source.is_finished());

        cleanup_test_dir(&dir);
    }

    #[test]
    fn unload_is_idempotent() {
        let dir = test_dir("replay_unload");
        let path = dir.join("session.jsonl");
        write_jsonl(&path, &[frame(0.0, 0.5)]);

        let mut source = ReplaySource::new(path, true, false);
        source.initialize().unwrap();
        source.unload();
        source.unload();
        assert!(source.is_empty());
        assert!(source.next_frame().unwrap().is_none());

        cleanup_test_dir(&dir);
    }
}

mod udp {
    use super::*;

    fn bound_source() -> (UdpFaceSource, UdpSocket) {
        let mut source = UdpFaceSource::new("127.0.0.1:0".to_string());
        source.initialize().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.connect(source.local_addr().unwrap()).unwrap();
        (source, sender)
    }

    #[test]
    fn receives_json_frames() {
        let (mut source, sender) = bound_source();
        let sent = frame(42.0, 0.3);
        sender.send(&serde_json::to_vec(&sent).unwrap()).unwrap();

        let received = source.next_frame().unwrap().expect("frame");
        assert_eq!(received, sent);
    }

    #[test]
    fn idle_socket_times_out_with_no_frame() {
        let (mut source, _sender) = bound_source();
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn malformed_packets_are_ignored() {
        let (mut source, sender) = bound_source();
        sender.send(b"{ definitely not a frame").unwrap();
        assert!(source.next_frame().unwrap().is_none());

        let sent = frame(7.0, 0.5);
        sender.send(&serde_json::to_vec(&sent).unwrap()).unwrap();
        assert_eq!(source.next_frame().unwrap(), Some(sent));
    }

    #[test]
    fn missing_timestamp_is_stamped_on_arrival() {
        let (mut source, sender) = bound_source();
        let mut sent = frame(0.0, 0.5);
        sent.timestamp_ms = 0.0;
        sender.send(&serde_json::to_vec(&sent).unwrap()).unwrap();

        let received = source.next_frame().unwrap().expect("frame");
        assert!(received.timestamp_ms > 0.0);
    }

    #[test]
    fn unload_is_idempotent() {
        let (mut source, _sender) = bound_source();
        source.unload();
        source.unload();
        assert!(source.local_addr().is_none());
        assert!(source.next_frame().unwrap().is_none());
    }
}
