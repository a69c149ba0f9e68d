use crate::calibration_manager::DEFAULT_STORAGE_KEY;
use crate::filters::{FilterConfig, KalmanParams};
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_FPS_RANGE: (f32, f32) = (1.0, 240.0);
pub const IRIS_GAIN_RANGE: (f32, f32) = (0.1, 20.0);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum OutputMode {
    #[serde(alias = "OSC", alias = "osc")]
    #[default]
    Osc,
    #[serde(alias = "generic", alias = "GenericUDP")]
    Generic,
}

/// Where face frames come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// One JSON frame per datagram from an external landmark detector.
    Udp {
        #[serde(default = "default_bind_address")]
        bind_address: String,
        #[serde(default = "default_source_port")]
        port: u16,
    },
    /// JSON-lines recording of frames.
    Replay {
        path: PathBuf,
        #[serde(default)]
        looped: bool,
        #[serde(default = "default_realtime")]
        realtime: bool,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Udp {
            bind_address: default_bind_address(),
            port: default_source_port(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_source_port() -> u16 {
    9100
}

fn default_realtime() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackingConfig {
    /// Filter kind for the eye x/y channels.
    pub eye_filter: FilterConfig,
    /// Filter kind for pan, tilt and roll.
    pub angle_filter: FilterConfig,
    /// Extra smoothing of the final screen position, off when `None`.
    pub output_filter: Option<FilterConfig>,
    pub iris_vertical_gain: f32,
    pub blink_closed_ratio: f32,
    pub blink_open_ratio: f32,
    /// Max change of brow/mouth scores per millisecond, unlimited when `None`.
    pub expression_max_speed: Option<f32>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            eye_filter: FilterConfig::Kalman(KalmanParams::new(100.0, 100.0)),
            angle_filter: FilterConfig::Kalman(KalmanParams::new(100.0, 100.0)),
            output_filter: None,
            iris_vertical_gain: 4.0,
            blink_closed_ratio: 0.4,
            blink_open_ratio: 0.7,
            expression_max_speed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalibrationConfig {
    pub storage_dir: PathBuf,
    pub storage_key: String,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("."),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub send_address: String,
    pub send_port: u16,
    /// OSC address prefix, e.g. `/gaze` gives `/gaze/x`.
    pub address_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            send_address: "127.0.0.1".to_string(),
            send_port: 9000,
            address_prefix: "/gaze".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9101,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub calibration: CalibrationConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub control: ControlConfig,
    #[serde(default = "default_max_fps")]
    pub max_fps: Option<f32>,
}

fn default_max_fps() -> Option<f32> {
    Some(60.0)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig::default(),
            calibration: CalibrationConfig::default(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            control: ControlConfig::default(),
            max_fps: default_max_fps(),
        }
    }
}

impl Config {
    /// Forces every numeric setting into its supported range.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();

        config.tracking.eye_filter = config.tracking.eye_filter.sanitized();
        config.tracking.angle_filter = config.tracking.angle_filter.sanitized();
        config.tracking.output_filter = config
            .tracking
            .output_filter
            .as_ref()
            .map(|f| f.sanitized());

        let gain = config.tracking.iris_vertical_gain;
        config.tracking.iris_vertical_gain = if gain.is_finite() {
            gain.clamp(IRIS_GAIN_RANGE.0, IRIS_GAIN_RANGE.1)
        } else {
            defaults.tracking.iris_vertical_gain
        };

        let closed = config.tracking.blink_closed_ratio;
        let open = config.tracking.blink_open_ratio;
        let ordered = closed.is_finite()
            && open.is_finite()
            && 0.0 <= closed
            && closed < open
            && open <= 1.0;
        if !ordered {
            warn!(
                "Invalid blink ratios ({}, {}), using defaults",
                closed, open
            );
            config.tracking.blink_closed_ratio = defaults.tracking.blink_closed_ratio;
            config.tracking.blink_open_ratio = defaults.tracking.blink_open_ratio;
        }

        if let Some(speed) = config.tracking.expression_max_speed {
            if !(speed.is_finite() && speed > 0.0) {
                warn!("Invalid expression_max_speed {}, disabling rate limit", speed);
                config.tracking.expression_max_speed = None;
            }
        }

        if config.calibration.storage_key.trim().is_empty() {
            config.calibration.storage_key = defaults.calibration.storage_key;
        }

        config.max_fps = config.max_fps.map(|fps| {
            if fps.is_finite() {
                fps.clamp(MAX_FPS_RANGE.0, MAX_FPS_RANGE.1)
            } else {
                MAX_FPS_RANGE.1
            }
        });

        config
    }
}

/// Reads `path`, or writes the default config there when it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        info!("Loading config from {:?}", path);
        let file = fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let reader = std::io::BufReader::new(file);
        let config: Config =
            serde_json::from_reader(reader).with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config.sanitized())
    } else {
        info!("Config not found. Creating default at {:?}", path);
        let config = Config::default();
        let file = fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &config)?;
        Ok(config)
    }
}
