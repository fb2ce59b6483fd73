use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use phone_control::{ActionOutcome, ActionRequest, DeviceAddress, PhoneStatus};
use serde::Deserialize;

use super::parse_body;
use crate::error::AppError;
use crate::state::AppState;

/// Body shared by call, message and send-message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneActionBody {
    pub contact: Option<String>,
    pub phone_number: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectBody {
    pub ip: Option<String>,
    pub port: Option<PortValue>,
}

/// Clients send the port either as a number or as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u16),
    Text(String),
}

impl ConnectBody {
    fn address(self, default: &DeviceAddress) -> Result<DeviceAddress, AppError> {
        let ip = self
            .ip
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
            .unwrap_or_else(|| default.ip.clone());
        let port = match self.port {
            None => default.port,
            Some(PortValue::Number(port)) => port,
            Some(PortValue::Text(text)) if text.trim().is_empty() => default.port,
            Some(PortValue::Text(text)) => text
                .trim()
                .parse()
                .map_err(|_| AppError::bad_request(format!("Invalid port: {text}")))?,
        };
        Ok(DeviceAddress::new(ip, port))
    }
}

fn outcome_json(outcome: ActionOutcome) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "message": outcome.message,
        "contact": outcome.contact,
        "phoneNumber": outcome.phone_number,
        "device": outcome.device,
        "manualCompletion": outcome.requires_manual_completion(),
        "completion": outcome.completion.code(),
    })
}

/// GET /api/phone/status — connection state, re-derived from the bridge.
pub async fn status(State(app): State<AppState>) -> Json<PhoneStatus> {
    Json(app.controller.status().await)
}

/// POST /api/phone/connect — adb-over-TCP connect, confirmed by discovery.
pub async fn connect(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: ConnectBody = parse_body(&body)?;
    let address = body.address(&app.default_address)?;
    let outcome = app.controller.connect(&address).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": outcome.message,
        "device": outcome.device.id,
    })))
}

/// POST /api/phone/disconnect — idempotent.
pub async fn disconnect(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = app.controller.disconnect(None).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": outcome.message,
    })))
}

/// POST /api/phone/call
pub async fn call(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: PhoneActionBody = parse_body(&body)?;
    let request =
        ActionRequest::call(body.phone_number.unwrap_or_default()).with_contact(body.contact);
    let outcome = app.controller.perform(&request).await?;
    Ok(Json(outcome_json(outcome)))
}

/// POST /api/phone/message — open the compose view only.
pub async fn open_message(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: PhoneActionBody = parse_body(&body)?;
    let request = ActionRequest::open_message(body.phone_number.unwrap_or_default())
        .with_contact(body.contact);
    let outcome = app.controller.perform(&request).await?;
    Ok(Json(outcome_json(outcome)))
}

/// POST /api/phone/send-message — compose, type and send.
pub async fn send_message(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: PhoneActionBody = parse_body(&body)?;
    let request = ActionRequest::send_message(
        body.phone_number.unwrap_or_default(),
        body.message.unwrap_or_default(),
    )
    .with_contact(body.contact);
    let outcome = app.controller.perform(&request).await?;
    Ok(Json(outcome_json(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_address() -> DeviceAddress {
        DeviceAddress::new("10.0.0.2", 5555)
    }

    #[test]
    fn connect_body_falls_back_to_defaults() {
        let address = ConnectBody::default().address(&default_address()).unwrap();
        assert_eq!(address.serial(), "10.0.0.2:5555");
    }

    #[test]
    fn connect_body_accepts_string_port() {
        let body: ConnectBody = serde_json::from_str(r#"{"ip":"10.0.0.9","port":"5556"}"#).unwrap();
        let address = body.address(&default_address()).unwrap();
        assert_eq!(address.serial(), "10.0.0.9:5556");
    }

    #[test]
    fn connect_body_rejects_bad_port() {
        let body: ConnectBody = serde_json::from_str(r#"{"port":"abc"}"#).unwrap();
        assert!(body.address(&default_address()).is_err());
    }

    #[test]
    fn action_body_uses_camel_case() {
        let body: PhoneActionBody =
            serde_json::from_str(r#"{"contact":"Mom","phoneNumber":"123","message":"hi"}"#)
                .unwrap();
        assert_eq!(body.phone_number.as_deref(), Some("123"));
        assert_eq!(body.contact.as_deref(), Some("Mom"));
    }
}
