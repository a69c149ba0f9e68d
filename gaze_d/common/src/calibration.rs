use crate::math::{clamp01, mid_point, remap};
use api::EyePosition;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_EYES_HEIGHT: f32 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalibrationPoint {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CalibrationPoint {
    pub const ALL: [CalibrationPoint; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "TopLeft",
            Self::TopRight => "TopRight",
            Self::BottomLeft => "BottomLeft",
            Self::BottomRight => "BottomRight",
        }
    }
}

impl FromStr for CalibrationPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown calibration point '{}'", s))
    }
}

impl fmt::Display for CalibrationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FaceAngle {
    PanToLeft,
    PanToRight,
    TiltToUp,
    TiltToDown,
}

impl FaceAngle {
    pub const ALL: [FaceAngle; 4] = [
        Self::PanToLeft,
        Self::PanToRight,
        Self::TiltToUp,
        Self::TiltToDown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PanToLeft => "panToLeft",
            Self::PanToRight => "panToRight",
            Self::TiltToUp => "tiltToUp",
            Self::TiltToDown => "tiltToDown",
        }
    }

    pub fn is_pan(&self) -> bool {
        matches!(self, Self::PanToLeft | Self::PanToRight)
    }
}

impl FromStr for FaceAngle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown face angle '{}'", s))
    }
}

impl fmt::Display for FaceAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eye position sample as recorded for a calibration corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EyeData {
    pub eye_x: f32,
    pub eye_y: f32,
}

impl EyeData {
    pub const fn new(eye_x: f32, eye_y: f32) -> Self {
        Self { eye_x, eye_y }
    }
}

/// Reference frame the user records by looking at the screen corners and
/// turning the head to its extremes.
///
/// Missing keys in stored data fall back to the defaults field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalibrationData {
    #[serde(rename = "TopLeft")]
    pub top_left: EyeData,
    #[serde(rename = "TopRight")]
    pub top_right: EyeData,
    #[serde(rename = "BottomLeft")]
    pub bottom_left: EyeData,
    #[serde(rename = "BottomRight")]
    pub bottom_right: EyeData,
    pub pan_to_left: f32,
    pub pan_to_right: f32,
    pub tilt_to_up: f32,
    pub tilt_to_down: f32,
    /// Open-eye lid distance; divisor for the vertical iris offset.
    pub eyes_height: f32,
}

impl Default for CalibrationData {
    fn default() -> Self {
        Self {
            top_left: EyeData::new(0.0, 1.0),
            top_right: EyeData::new(1.0, 1.0),
            bottom_left: EyeData::new(0.0, 0.0),
            bottom_right: EyeData::new(1.0, 0.0),
            pan_to_left: -FRAC_PI_2,
            pan_to_right: FRAC_PI_2,
            tilt_to_up: FRAC_PI_2,
            tilt_to_down: -FRAC_PI_2,
            eyes_height: DEFAULT_EYES_HEIGHT,
        }
    }
}

pub fn is_valid_angle(angle: f32) -> bool {
    angle.is_finite() && angle > -PI && angle <= PI
}

pub fn is_valid_eyes_height(height: f32) -> bool {
    height.is_finite() && height > 0.0
}

impl CalibrationData {
    pub fn corner(&self, point: CalibrationPoint) -> EyeData {
        match point {
            CalibrationPoint::TopLeft => self.top_left,
            CalibrationPoint::TopRight => self.top_right,
            CalibrationPoint::BottomLeft => self.bottom_left,
            CalibrationPoint::BottomRight => self.bottom_right,
        }
    }

    pub fn corner_mut(&mut self, point: CalibrationPoint) -> &mut EyeData {
        match point {
            CalibrationPoint::TopLeft => &mut self.top_left,
            CalibrationPoint::TopRight => &mut self.top_right,
            CalibrationPoint::BottomLeft => &mut self.bottom_left,
            CalibrationPoint::BottomRight => &mut self.bottom_right,
        }
    }

    pub fn angle(&self, angle: FaceAngle) -> f32 {
        match angle {
            FaceAngle::PanToLeft => self.pan_to_left,
            FaceAngle::PanToRight => self.pan_to_right,
            FaceAngle::TiltToUp => self.tilt_to_up,
            FaceAngle::TiltToDown => self.tilt_to_down,
        }
    }

    pub fn angle_mut(&mut self, angle: FaceAngle) -> &mut f32 {
        match angle {
            FaceAngle::PanToLeft => &mut self.pan_to_left,
            FaceAngle::PanToRight => &mut self.pan_to_right,
            FaceAngle::TiltToUp => &mut self.tilt_to_up,
            FaceAngle::TiltToDown => &mut self.tilt_to_down,
        }
    }

    /// Copy with every field forced back inside its invariant; offending
    /// fields take their default.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut data = self.clone();

        for point in CalibrationPoint::ALL {
            let corner = data.corner_mut(point);
            if corner.eye_x.is_finite() && corner.eye_y.is_finite() {
                corner.eye_x = clamp01(corner.eye_x);
                corner.eye_y = clamp01(corner.eye_y);
            } else {
                *corner = defaults.corner(point);
            }
        }

        for angle in FaceAngle::ALL {
            if !is_valid_angle(data.angle(angle)) {
                *data.angle_mut(angle) = defaults.angle(angle);
            }
        }

        if !is_valid_eyes_height(data.eyes_height) {
            data.eyes_height = defaults.eyes_height;
        }

        data
    }

    /// Maps smoothed eye and head scalars to a normalized screen position.
    ///
    /// The vertical eye contribution is attenuated by `1 - blink_level` so a
    /// closing lid does not drag the gaze down. Output y grows toward the
    /// bottom corners.
    pub fn map_gaze(
        &self,
        eye_x: f32,
        eye_y: f32,
        pan: f32,
        tilt: f32,
        blink_level: f32,
    ) -> EyePosition {
        let x = clamp01(
            0.5 + remap(
                eye_x,
                (
                    mid_point(self.top_left.eye_x, self.bottom_left.eye_x),
                    mid_point(self.top_right.eye_x, self.bottom_right.eye_x),
                ),
                (-0.5, 0.5),
            ) + remap(pan, (self.pan_to_left, self.pan_to_right), (-0.5, 0.5)),
        );

        let y = clamp01(
            0.5 + (1.0 - blink_level)
                * remap(
                    eye_y,
                    (
                        mid_point(self.top_left.eye_y, self.top_right.eye_y),
                        mid_point(self.bottom_left.eye_y, self.bottom_right.eye_y),
                    ),
                    (-0.5, 0.5),
                )
                + remap(tilt, (self.tilt_to_up, self.tilt_to_down), (-0.5, 0.5)),
        );

        EyePosition { x, y }
    }
}
