use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use phone_control::{detect_objects, Detection};
use serde::{Deserialize, Serialize};

use super::parse_body;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DetectBody {
    /// `data:image/...;base64,...`
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub success: bool,
    /// Highest confidence first
    pub predictions: Vec<Detection>,
}

/// POST /detect — run the detection model over one frame.
///
/// Inference is CPU-bound and runs on the blocking pool.
pub async fn detect(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<DetectResponse>, AppError> {
    let body: DetectBody = parse_body(&body)?;
    let image = body.image.unwrap_or_default();
    let detector = app.detector.clone();

    let predictions =
        tokio::task::spawn_blocking(move || detect_objects(detector.as_deref(), &image)).await??;

    tracing::debug!(count = predictions.len(), "detection finished");
    Ok(Json(DetectResponse {
        success: true,
        predictions,
    }))
}
