use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use phone_control::{ControlError, DetectionError, ErrorKind};
use serde_json::json;

// ---------------------------------------------------------------------------
// Internal sentinel for malformed request bodies
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Device errors answer `{success:false, error, code}`; a failed connect
/// answers with `message` instead of `error`. Detection errors answer
/// `{error}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }
}

fn control_status(err: &ControlError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation | ErrorKind::DeviceUnavailable => StatusCode::BAD_REQUEST,
        ErrorKind::Channel => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(e) = self.0.downcast_ref::<BadRequestError>() {
            let body = json!({ "success": false, "error": e.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        if let Some(e) = self.0.downcast_ref::<ControlError>() {
            let body = match e {
                ControlError::ConnectionFailed(message) => json!({
                    "success": false,
                    "message": message,
                    "code": e.code(),
                }),
                _ => json!({
                    "success": false,
                    "error": e.to_string(),
                    "code": e.code(),
                }),
            };
            return (control_status(e), axum::Json(body)).into_response();
        }

        if let Some(e) = self.0.downcast_ref::<DetectionError>() {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let body = json!({ "error": e.to_string() });
            return (status, axum::Json(body)).into_response();
        }

        tracing::error!("unhandled error: {:#}", self.0);
        let body = json!({ "success": false, "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
