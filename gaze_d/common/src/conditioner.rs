use anyhow::Result;
use log::{info, trace, warn};

use crate::calibration::{is_valid_angle, is_valid_eyes_height};
use crate::calibration_manager::CalibrationManager;
use crate::filters::Smoother;
use crate::math::clamp01;
use crate::{features, scores};
use crate::{CalibrationData, CalibrationPoint, Config, EyeData, FaceAngle, TrackingConfig};
use api::{EyePosition, ExpressionScores, FaceFrame, HeadAngles, TrackingResult};

struct ChannelFilters {
    eye_x: Box<dyn Smoother>,
    eye_y: Box<dyn Smoother>,
    pan: Box<dyn Smoother>,
    tilt: Box<dyn Smoother>,
    roll: Box<dyn Smoother>,
    output: Option<(Box<dyn Smoother>, Box<dyn Smoother>)>,
}

impl ChannelFilters {
    fn new(config: &TrackingConfig) -> Self {
        Self {
            eye_x: config.eye_filter.build(),
            eye_y: config.eye_filter.build(),
            pan: config.angle_filter.build(),
            tilt: config.angle_filter.build(),
            roll: config.angle_filter.build(),
            output: config
                .output_filter
                .as_ref()
                .map(|f| (f.build(), f.build())),
        }
    }
}

/// Turns raw face frames into smoothed, calibrated gaze control values.
///
/// Owns the calibration record and one filter per tracked scalar. Filters are
/// created once and never reset.
pub struct Conditioner {
    pub config: TrackingConfig,
    pub calibration_manager: CalibrationManager,

    filters: ChannelFilters,

    latest_eye: Option<EyeData>,
    latest_eyes_height: Option<f32>,
    latest_angles: Option<HeadAngles>,
    last_timestamp_ms: Option<f64>,
    expressions: ExpressionScores,

    frames_processed: u64,
    frames_skipped: u64,
}

impl Conditioner {
    pub fn new(config: TrackingConfig, calibration_manager: CalibrationManager) -> Self {
        Self {
            filters: ChannelFilters::new(&config),
            config,
            calibration_manager,
            latest_eye: None,
            latest_eyes_height: None,
            latest_angles: None,
            last_timestamp_ms: None,
            expressions: ExpressionScores::default(),
            frames_processed: 0,
            frames_skipped: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let manager = CalibrationManager::new(
            config.calibration.storage_dir.clone(),
            &config.calibration.storage_key,
        );
        Self::new(config.tracking.clone(), manager)
    }

    pub fn load_calibration(&mut self) -> Result<()> {
        self.calibration_manager.load()
    }

    pub fn calibration(&self) -> &CalibrationData {
        &self.calibration_manager.data
    }

    pub fn has_sample(&self) -> bool {
        self.latest_eye.is_some()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    /// Runs one frame through extraction, smoothing and calibration mapping.
    ///
    /// Returns `None` when the frame lacks landmarks or a head pose; the
    /// previous result stays in effect downstream.
    pub fn process(&mut self, frame: &FaceFrame) -> Option<TrackingResult> {
        let pose = match frame.validate() {
            Ok(pose) => pose,
            Err(e) => {
                trace!("Skipping frame at {}ms: {}", frame.timestamp_ms, e);
                self.frames_skipped += 1;
                return None;
            }
        };

        let dt_ms = match self.last_timestamp_ms {
            Some(last) => (frame.timestamp_ms - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_timestamp_ms = Some(frame.timestamp_ms);

        let calibration = &self.calibration_manager.data;

        let raw = features::extract(
            &frame.landmarks,
            calibration.eyes_height,
            self.config.iris_vertical_gain,
        );
        self.latest_eye = Some(EyeData::new(raw.eye_x, raw.eye_y));
        self.latest_eyes_height = Some(raw.eyes_height);

        let eye_x = clamp01(self.filters.eye_x.update(raw.eye_x, dt_ms));
        let eye_y = clamp01(self.filters.eye_y.update(raw.eye_y, dt_ms));

        let raw_angles = pose.angles();
        let angles = HeadAngles {
            pan: self.filters.pan.update(raw_angles.pan, dt_ms),
            tilt: self.filters.tilt.update(raw_angles.tilt, dt_ms),
            roll: self.filters.roll.update(raw_angles.roll, dt_ms),
        };
        self.latest_angles = Some(angles);

        let blink_level = features::blink_level(
            raw.eyes_height,
            calibration.eyes_height,
            self.config.blink_closed_ratio,
            self.config.blink_open_ratio,
        );

        let mut position = calibration.map_gaze(eye_x, eye_y, angles.pan, angles.tilt, blink_level);

        if let Some((fx, fy)) = &mut self.filters.output {
            position = EyePosition {
                x: clamp01(fx.update(position.x, dt_ms)),
                y: clamp01(fy.update(position.y, dt_ms)),
            };
        }

        #[cfg(feature = "xtralog")]
        trace!(
            "eye=({:.3},{:.3}) pan={:.3} tilt={:.3} blink={:.2} -> ({:.3},{:.3})",
            eye_x,
            eye_y,
            angles.pan,
            angles.tilt,
            blink_level,
            position.x,
            position.y
        );

        let mut expressions = scores::expression_scores(frame);
        if let Some(speed) = self.config.expression_max_speed {
            expressions = scores::rate_limited(&self.expressions, expressions, speed * dt_ms);
        }
        self.expressions = expressions;

        self.frames_processed += 1;

        Some(TrackingResult {
            timestamp_ms: frame.timestamp_ms,
            eye_position: position,
            blink_level,
            head: angles,
            expressions,
        })
    }

    /// Records the latest unsmoothed eye sample as `point` and persists.
    /// Returns `Ok(false)` when no sample has been seen yet.
    pub fn set_corner(&mut self, point: CalibrationPoint) -> Result<bool> {
        let Some(sample) = self.latest_eye else {
            return Ok(false);
        };

        *self.calibration_manager.data.corner_mut(point) = sample;
        self.calibration_manager.save()?;

        info!("Calibration point updated {} {:?}", point, sample);
        Ok(true)
    }

    /// Records the latest smoothed pan (for `panTo*`) or tilt (for `tiltTo*`)
    /// as `angle` and persists.
    pub fn set_angle(&mut self, angle: FaceAngle) -> Result<bool> {
        let Some(angles) = self.latest_angles else {
            return Ok(false);
        };

        let value = if angle.is_pan() { angles.pan } else { angles.tilt };
        if !is_valid_angle(value) {
            warn!("Ignoring out-of-range calibration angle {} = {}", angle, value);
            return Ok(false);
        }

        *self.calibration_manager.data.angle_mut(angle) = value;
        self.calibration_manager.save()?;

        info!("Calibration angle updated {} {}", angle, value);
        Ok(true)
    }

    /// Records the latest lid opening as the open-eye reference and persists.
    pub fn set_eyes_height(&mut self) -> Result<bool> {
        let Some(height) = self.latest_eyes_height else {
            return Ok(false);
        };

        if !is_valid_eyes_height(height) {
            warn!("Ignoring eyes height {}, eyes look closed", height);
            return Ok(false);
        }

        self.calibration_manager.data.eyes_height = height;
        self.calibration_manager.save()?;

        info!("Calibration eyesHeight updated {}", height);
        Ok(true)
    }

    pub fn reset_calibration(&mut self) -> Result<()> {
        self.calibration_manager.reset()?;
        info!("Calibration reset to defaults");
        Ok(())
    }
}
