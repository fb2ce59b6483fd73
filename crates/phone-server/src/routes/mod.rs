pub mod debug;
pub mod detect;
pub mod phone;
pub mod voice;

use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// GET / — liveness banner.
pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Phone control server is running",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Parse an optional JSON body. An empty body yields `T::default()`.
pub(crate) fn parse_body<T>(body: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::bad_request(format!("Invalid JSON body: {e}")))
}
