use axum::extract::State;
use axum::Json;
use phone_control::DeviceDiagnostics;

use crate::state::AppState;

/// GET /api/debug/adb-devices — raw bridge listing plus its parsed view.
pub async fn adb_devices(State(app): State<AppState>) -> Json<DeviceDiagnostics> {
    Json(app.controller.device_diagnostics().await)
}
