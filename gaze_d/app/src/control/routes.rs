use super::{ControlRequest, ControlState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use common::{CalibrationPoint, FaceAngle};
use log::info;
use serde_json::{json, Value};

type Reply = (StatusCode, Json<Value>);

pub fn get_router(state: ControlState) -> Router {
    Router::new()
        .route("/calibration", get(calibration_handler))
        .route("/calibration/corner/:point", post(corner_handler))
        .route("/calibration/angle/:angle", post(angle_handler))
        .route("/calibration/eyes-height", post(eyes_height_handler))
        .route("/calibration/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

fn poisoned() -> Reply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "message": "shared state unavailable" })),
    )
}

fn queue(state: &ControlState, request: ControlRequest) -> Reply {
    if !state.push_request(request) {
        return poisoned();
    }
    info!("Queued calibration request: {}", request);
    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "queued", "request": request.to_string() })),
    )
}

async fn calibration_handler(State(state): State<ControlState>) -> Reply {
    match state.calibration.read() {
        Ok(data) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "data": *data })),
        ),
        Err(_) => poisoned(),
    }
}

async fn status_handler(State(state): State<ControlState>) -> Reply {
    match state.status.read() {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "pipeline": *status,
                "frames_dropped": state.frames_dropped(),
            })),
        ),
        Err(_) => poisoned(),
    }
}

async fn corner_handler(State(state): State<ControlState>, Path(point): Path<String>) -> Reply {
    match point.parse::<CalibrationPoint>() {
        Ok(point) => queue(&state, ControlRequest::Corner(point)),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": e })),
        ),
    }
}

async fn angle_handler(State(state): State<ControlState>, Path(angle): Path<String>) -> Reply {
    match angle.parse::<FaceAngle>() {
        Ok(angle) => queue(&state, ControlRequest::Angle(angle)),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": e })),
        ),
    }
}

async fn eyes_height_handler(State(state): State<ControlState>) -> Reply {
    queue(&state, ControlRequest::EyesHeight)
}

async fn reset_handler(State(state): State<ControlState>) -> Reply {
    queue(&state, ControlRequest::Reset)
}
