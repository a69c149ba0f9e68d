use thiserror::Error;

/// Why a frame cannot feed the eye pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame has no face landmarks")]
    NoLandmarks,

    #[error("frame has {found} landmarks, eye tracking needs at least {expected}")]
    TooFewLandmarks { expected: usize, found: usize },

    #[error("frame has no head pose matrix")]
    MissingHeadPose,

    #[error("non-finite value in {0}")]
    NonFiniteInput(&'static str),
}
