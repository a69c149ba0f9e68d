//! Landmark indices and blendshape names of the 478-point face mesh with iris
//! refinement.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeLandmarks {
    pub left_corner: usize,
    pub right_corner: usize,
    pub top: usize,
    pub bottom: usize,
    pub iris_center: usize,
}

impl EyeLandmarks {
    pub const fn indices(&self) -> [usize; 5] {
        [
            self.left_corner,
            self.right_corner,
            self.top,
            self.bottom,
            self.iris_center,
        ]
    }
}

pub const LEFT_EYE: EyeLandmarks = EyeLandmarks {
    left_corner: 33,
    right_corner: 133,
    top: 159,
    bottom: 145,
    iris_center: 468,
};

pub const RIGHT_EYE: EyeLandmarks = EyeLandmarks {
    left_corner: 362,
    right_corner: 263,
    top: 386,
    bottom: 374,
    iris_center: 473,
};

/// Mesh size including both iris centers.
pub const REQUIRED_LANDMARKS: usize = 474;
pub const FULL_LANDMARKS: usize = 478;

pub const BROW_INNER_UP: &str = "browInnerUp";
pub const BROW_OUTER_UP_LEFT: &str = "browOuterUpLeft";
pub const BROW_OUTER_UP_RIGHT: &str = "browOuterUpRight";
pub const JAW_OPEN: &str = "jawOpen";
pub const MOUTH_PUCKER: &str = "mouthPucker";
