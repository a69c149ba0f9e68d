use anyhow::{bail, Context, Result};
use api::{FaceFrame, FaceTrackingSource};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

const MAX_WAIT: Duration = Duration::from_millis(100);
const FALLBACK_INTERVAL_MS: f64 = 1000.0 / 30.0;

/// Plays back a JSON-lines recording, one [`FaceFrame`] per line.
///
/// Looped playback shifts timestamps by one recording length per pass so they
/// keep increasing. In realtime mode frames are released no earlier than their
/// recorded offset from the first frame.
pub struct ReplaySource {
    path: PathBuf,
    looped: bool,
    realtime: bool,
    frames: Vec<FaceFrame>,
    cursor: usize,
    loop_offset_ms: f64,
    started: Option<Instant>,
    finished: bool,
}

impl ReplaySource {
    pub fn new(path: PathBuf, looped: bool, realtime: bool) -> Self {
        Self {
            path,
            looped,
            realtime,
            frames: Vec::new(),
            cursor: 0,
            loop_offset_ms: 0.0,
            started: None,
            finished: false,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// True once a non-looped recording has been played to the end.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn cycle_ms(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) if self.frames.len() > 1 => {
                let span = last.timestamp_ms - first.timestamp_ms;
                span + span / (self.frames.len() - 1) as f64
            }
            _ => FALLBACK_INTERVAL_MS,
        }
    }

    /// Sleeps toward the frame's due time. Returns false if it is still not due.
    fn wait_until_due(&mut self, timestamp_ms: f64) -> bool {
        let Some(first) = self.frames.first() else {
            return true;
        };
        let started = *self.started.get_or_insert_with(Instant::now);
        let offset_secs = ((timestamp_ms - first.timestamp_ms) / 1000.0).max(0.0);
        let due = match Duration::try_from_secs_f64(offset_secs) {
            Ok(due) => due,
            Err(e) => {
                warn!(
                    "Replay frame at {}ms cannot be scheduled ({}), releasing it now",
                    timestamp_ms, e
                );
                return true;
            }
        };
        let elapsed = started.elapsed();
        if elapsed >= due {
            return true;
        }
        let remaining = due - elapsed;
        thread::sleep(remaining.min(MAX_WAIT));
        remaining <= MAX_WAIT
    }
}

impl FaceTrackingSource for ReplaySource {
    fn initialize(&mut self) -> Result<()> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open replay file {:?}", self.path))?;

        let mut frames = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read {:?}", self.path))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<FaceFrame>(&line) {
                Ok(frame) => frames.push(frame),
                Err(e) => warn!("Skipping replay line {}: {}", index + 1, e),
            }
        }

        if frames.is_empty() {
            bail!("Replay file {:?} contains no frames", self.path);
        }

        info!(
            "Loaded {} frames from {:?} (looped: {}, realtime: {})",
            frames.len(),
            self.path,
            self.looped,
            self.realtime
        );
        self.frames = frames;
        self.cursor = 0;
        self.loop_offset_ms = 0.0;
        self.started = None;
        self.finished = false;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<FaceFrame>> {
        if self.frames.is_empty() || self.finished {
            return Ok(None);
        }

        if self.cursor >= self.frames.len() {
            if !self.looped {
                info!("Replay of {:?} finished", self.path);
                self.finished = true;
                return Ok(None);
            }
            self.cursor = 0;
            self.loop_offset_ms += self.cycle_ms();
        }

        let timestamp_ms = self.frames[self.cursor].timestamp_ms + self.loop_offset_ms;
        if self.realtime && !self.wait_until_due(timestamp_ms) {
            return Ok(None);
        }

        let mut frame = self.frames[self.cursor].clone();
        frame.timestamp_ms = timestamp_ms;
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn unload(&mut self) {
        if !self.frames.is_empty() {
            info!("Unloaded replay {:?}", self.path);
            self.frames.clear();
        }
    }
}
