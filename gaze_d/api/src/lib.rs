mod error;
pub mod schema;

pub use error::FrameError;

use anyhow::Result;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Normalized face landmark in image space, origin top-left, each axis in [0,1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Head rotation in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadAngles {
    pub pan: f32,
    pub tilt: f32,
    pub roll: f32,
}

/// Facial transformation matrix as 16 column-major scalars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadPose {
    pub data: [f32; 16],
}

impl Default for HeadPose {
    fn default() -> Self {
        Self::from_matrix(Mat4::IDENTITY)
    }
}

impl HeadPose {
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            data: matrix.to_cols_array(),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&self.data)
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Pan (yaw), tilt (pitch) and roll extracted from the rotation part.
    ///
    /// Tilt is `asin(-m[9])` with the element clamped to [-1, 1] first, so it
    /// never goes NaN on slightly denormalized matrices.
    pub fn angles(&self) -> HeadAngles {
        let m = self.matrix();
        HeadAngles {
            pan: m.z_axis.x.atan2(m.z_axis.z),
            tilt: (-m.z_axis.y.clamp(-1.0, 1.0)).asin(),
            roll: m.x_axis.y.atan2(m.y_axis.y),
        }
    }

    pub fn translation(&self) -> Vec3 {
        self.matrix().w_axis.truncate()
    }

    pub fn scale(&self) -> Vec3 {
        let m = self.matrix();
        Vec3::new(
            m.x_axis.truncate().length(),
            m.y_axis.truncate().length(),
            m.z_axis.truncate().length(),
        )
    }
}

/// Activation of one named facial expression, score in [0,1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blendshape {
    pub category_name: String,
    pub score: f32,
}

/// Everything the face-tracking oracle reports for one video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceFrame {
    /// Capture time in milliseconds on a monotonic clock.
    pub timestamp_ms: f64,
    pub landmarks: Vec<Landmark>,
    pub head_pose: Option<HeadPose>,
    pub blendshapes: Vec<Blendshape>,
}

impl FaceFrame {
    pub fn blendshape(&self, name: &str) -> Option<f32> {
        self.blendshapes
            .iter()
            .find(|b| b.category_name == name)
            .map(|b| b.score)
    }

    /// Checks that the frame carries everything the eye pipeline reads and
    /// returns the head pose on success.
    pub fn validate(&self) -> Result<&HeadPose, FrameError> {
        if self.landmarks.is_empty() {
            return Err(FrameError::NoLandmarks);
        }
        if self.landmarks.len() < schema::REQUIRED_LANDMARKS {
            return Err(FrameError::TooFewLandmarks {
                expected: schema::REQUIRED_LANDMARKS,
                found: self.landmarks.len(),
            });
        }

        let pose = self.head_pose.as_ref().ok_or(FrameError::MissingHeadPose)?;
        if !pose.is_finite() {
            return Err(FrameError::NonFiniteInput("head pose"));
        }

        let eyes = schema::LEFT_EYE.indices().into_iter().chain(schema::RIGHT_EYE.indices());
        for i in eyes {
            if !self.landmarks[i].is_finite() {
                return Err(FrameError::NonFiniteInput("eye landmark"));
            }
        }

        Ok(pose)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EyePosition {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brow: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth: Option<f32>,
}

/// Conditioned control values handed to renderers once per processed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResult {
    pub timestamp_ms: f64,
    pub eye_position: EyePosition,
    /// 0 = fully open, 1 = fully closed.
    pub blink_level: f32,
    pub head: HeadAngles,
    #[serde(default)]
    pub expressions: ExpressionScores,
}

/// Producer of face frames (the tracking oracle, seen from this side).
pub trait FaceTrackingSource {
    fn initialize(&mut self) -> Result<()>;

    /// `Ok(None)` means no frame is ready yet; callers poll again.
    fn next_frame(&mut self) -> Result<Option<FaceFrame>>;

    /// Releases the underlying stream. Calling it again is a no-op.
    fn unload(&mut self);
}
