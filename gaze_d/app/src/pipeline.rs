//! Producer and consumer halves of the frame pipeline.
//!
//! The producer polls the source and hands each frame, together with the
//! frame gate's [`InFlight`] token, to the consumer over a one-slot channel.
//! The consumer owns the [`Conditioner`]; it is the only writer of
//! calibration state.

use crate::control::{ControlRequest, ControlState, RequestOutcome};
use crate::dispatcher::Dispatcher;
use api::{FaceFrame, FaceTrackingSource};
use common::{Conditioner, FrameGate, InFlight, TrackingResult};
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread;
use std::time::{Duration, Instant};

pub type FrameMessage = (FaceFrame, InFlight);

const POLL_TIMEOUT: Duration = Duration::from_millis(100);
const IDLE_SLEEP: Duration = Duration::from_millis(5);

pub struct Consumer {
    conditioner: Conditioner,
    dispatcher: Dispatcher,
    control: ControlState,
}

impl Consumer {
    pub fn new(conditioner: Conditioner, dispatcher: Dispatcher, control: ControlState) -> Self {
        Self {
            conditioner,
            dispatcher,
            control,
        }
    }

    pub fn conditioner(&self) -> &Conditioner {
        &self.conditioner
    }

    /// Applies every queued calibration request in arrival order.
    pub fn apply_requests(&mut self) -> usize {
        let requests = self.control.take_requests();
        let count = requests.len();

        for request in requests {
            let outcome = match self.apply(request) {
                Ok(applied) => {
                    if !applied {
                        info!("Calibration request {} ignored: no usable sample yet", request);
                    }
                    RequestOutcome {
                        request: request.to_string(),
                        applied,
                        error: None,
                    }
                }
                Err(e) => {
                    error!("Failed to apply calibration request {}: {:#}", request, e);
                    RequestOutcome {
                        request: request.to_string(),
                        applied: false,
                        error: Some(format!("{:#}", e)),
                    }
                }
            };

            if let Ok(mut status) = self.control.status.write() {
                status.last_request = Some(outcome);
            }
        }

        if count > 0 {
            if let Ok(mut data) = self.control.calibration.write() {
                *data = self.conditioner.calibration().clone();
            }
        }
        count
    }

    fn apply(&mut self, request: ControlRequest) -> anyhow::Result<bool> {
        match request {
            ControlRequest::Corner(point) => self.conditioner.set_corner(point),
            ControlRequest::Angle(angle) => self.conditioner.set_angle(angle),
            ControlRequest::EyesHeight => self.conditioner.set_eyes_height(),
            ControlRequest::Reset => self.conditioner.reset_calibration().map(|_| true),
        }
    }

    /// Conditions one frame, sends the result and publishes the status
    /// snapshot. Returns `None` for frames the conditioner skipped.
    pub fn handle_frame(&mut self, frame: &FaceFrame) -> Option<TrackingResult> {
        let result = self.conditioner.process(frame);

        if let Some(result) = &result {
            if let Err(e) = self.dispatcher.send(result) {
                error!("Failed to send tracking result: {}", e);
            }
        }

        if let Ok(mut status) = self.control.status.write() {
            status.frames_processed = self.conditioner.frames_processed();
            status.frames_skipped = self.conditioner.frames_skipped();
            status.has_sample = self.conditioner.has_sample();
            if result.is_some() {
                status.last_result = result;
            }
        }

        result
    }

    /// Runs until `running` clears or the producer hangs up.
    pub fn run(mut self, rx: Receiver<FrameMessage>, running: &AtomicBool) {
        info!("Consumer Thread Started");

        while running.load(Ordering::SeqCst) {
            self.apply_requests();

            match rx.recv_timeout(POLL_TIMEOUT) {
                Ok((frame, _in_flight)) => {
                    self.handle_frame(&frame);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!(
            "Consumer stopped after {} frames ({} skipped)",
            self.conditioner.frames_processed(),
            self.conditioner.frames_skipped()
        );
    }
}

/// Polls `source` and feeds the consumer until `running` clears, then unloads
/// the source.
pub fn run_producer(
    source: &mut dyn FaceTrackingSource,
    tx: SyncSender<FrameMessage>,
    gate: &FrameGate,
    control: &ControlState,
    running: &AtomicBool,
    max_fps: Option<f32>,
) {
    info!("Entering Main Loop (Producer)...");

    let mut frame_count: u64 = 0;
    let mut log_interval: u64 = 1000;
    let mut last_log = Instant::now();
    let mut last_frame_time = Instant::now();
    let target_frame_duration = max_fps.map(|fps| Duration::from_secs_f32(1.0 / fps));

    while running.load(Ordering::SeqCst) {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                thread::sleep(IDLE_SLEEP);
                continue;
            }
            Err(e) => {
                error!("Frame source error: {:#}", e);
                thread::sleep(POLL_TIMEOUT);
                continue;
            }
        };

        let Some(token) = gate.try_acquire() else {
            let dropped = control.record_dropped();
            debug!("Skip-frame at {}ms ({} dropped so far)", frame.timestamp_ms, dropped);
            continue;
        };

        match tx.try_send((frame, token)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                control.record_dropped();
            }
            Err(TrySendError::Disconnected(_)) => {
                info!("Consumer gone, stopping producer");
                break;
            }
        }

        frame_count += 1;
        if frame_count % log_interval == 0 {
            let elapsed = last_log.elapsed().as_secs_f32();
            let fps = log_interval as f32 / elapsed;
            info!(
                "Tracking Active: Received {} frames (approx {:.1} FPS)",
                frame_count, fps
            );
            last_log = Instant::now();

            if frame_count >= 1_000_000 {
                log_interval = 1_000_000;
            } else if frame_count >= 100_000 {
                log_interval = 100_000;
            } else if frame_count >= 10_000 {
                log_interval = 10_000;
            }
        }

        if let Some(target_duration) = target_frame_duration {
            let elapsed = last_frame_time.elapsed();
            if elapsed < target_duration {
                thread::sleep(target_duration - elapsed);
            }
        }
        last_frame_time = Instant::now();
    }

    source.unload();
}
