use crate::math::{clamp01, move_towards};
use api::schema::{BROW_INNER_UP, BROW_OUTER_UP_LEFT, BROW_OUTER_UP_RIGHT, JAW_OPEN, MOUTH_PUCKER};
use api::{ExpressionScores, FaceFrame};

/// Strongest of the three brow raisers, `None` if the frame has none of them.
pub fn brow_score(frame: &FaceFrame) -> Option<f32> {
    [BROW_INNER_UP, BROW_OUTER_UP_LEFT, BROW_OUTER_UP_RIGHT]
        .iter()
        .filter_map(|name| frame.blendshape(name))
        .reduce(f32::max)
}

/// Open-mouth score: rewards jaw opening, slightly penalizes puckering.
pub fn mouth_score(jaw_open: f32, mouth_pucker: f32) -> f32 {
    clamp01((2.5 * jaw_open + (1.0 - mouth_pucker) * 0.2) / 1.5 - 0.2)
}

pub fn expression_scores(frame: &FaceFrame) -> ExpressionScores {
    let mouth = match (frame.blendshape(JAW_OPEN), frame.blendshape(MOUTH_PUCKER)) {
        (Some(jaw), Some(pucker)) => Some(mouth_score(jaw, pucker)),
        _ => None,
    };

    ExpressionScores {
        brow: brow_score(frame),
        mouth,
    }
}

/// Steps each score toward `target` by at most `max_delta`. A score with no
/// previous value is taken as is; a score that disappears is dropped.
pub fn rate_limited(
    previous: &ExpressionScores,
    target: ExpressionScores,
    max_delta: f32,
) -> ExpressionScores {
    let step = |prev: Option<f32>, next: Option<f32>| match (prev, next) {
        (Some(prev), Some(next)) => Some(move_towards(prev, next, max_delta)),
        (_, next) => next,
    };
    ExpressionScores {
        brow: step(previous.brow, target.brow),
        mouth: step(previous.mouth, target.mouth),
    }
}
