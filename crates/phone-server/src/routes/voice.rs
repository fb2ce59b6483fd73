use axum::extract::State;
use axum::Json;
use phone_control::VoiceStatus;

use crate::state::AppState;

/// GET /api/voice/status — voice feature readiness.
pub async fn status(State(app): State<AppState>) -> Json<VoiceStatus> {
    Json(app.controller.voice_status().await)
}
